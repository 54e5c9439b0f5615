//! Static content subsystem.
//!
//! # Data Flow
//! ```text
//! GET /<path> (already percent-decoded by the router)
//!     → resolver.rs (lower-case → syntactic check → canonical containment)
//!     → Resolution::{Serve, Fallback, Deny, NotFound}
//!     → load() reads bytes and infers Content-Type from the extension
//! ```
//!
//! # Design Decisions
//! - The root is canonicalized once at startup; a missing root is a startup error
//! - Unresolvable paths are denied, never served
//! - The fallback page is only used after a definitive not-found, never on deny

pub mod resolver;

use std::io;
use std::path::Path;

pub use resolver::{Resolution, SafeFileResolver};

/// A file read from the static root.
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub async fn load(path: &Path) -> io::Result<StaticFile> {
    let bytes = tokio::fs::read(path).await?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(StaticFile {
        bytes,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_infers_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let css = dir.path().join("site.css");
        let blob = dir.path().join("data.unknownext");
        std::fs::write(&css, "body{}").unwrap();
        std::fs::write(&blob, [0u8, 1, 2]).unwrap();

        let file = load(&css).await.unwrap();
        assert_eq!(file.content_type, "text/css");
        assert_eq!(file.bytes, b"body{}");

        assert_eq!(load(&blob).await.unwrap().content_type, "application/octet-stream");
        assert!(load(&dir.path().join("missing.css")).await.is_err());
    }
}
