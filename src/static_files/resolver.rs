//! Path-traversal-safe mapping of request paths onto the static root.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::observability::metrics;

/// What to do with a static request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The requested file exists inside the root.
    Serve(PathBuf),
    /// The requested file does not exist; serve the fallback page instead.
    Fallback(PathBuf),
    /// The request tried to leave the root.
    Deny,
    /// Neither the file nor the fallback page exists.
    NotFound,
}

/// Confines every lookup to a single canonical root directory.
///
/// Two checks guard the root. A syntactic one rejects `..`, absolute paths
/// and NUL bytes without touching the filesystem. The authoritative one
/// canonicalizes the joined path (following symlinks) and requires the
/// result to stay under the canonical root. The second check holds even if
/// an encoding trick slips past the first.
///
/// With clean URLs on, an extensionless request that names no file is
/// retried as `<name>.html` before the fallback page is considered, so
/// `/sobre` serves `sobre.html` when it exists.
#[derive(Debug, Clone)]
pub struct SafeFileResolver {
    root: PathBuf,
    fallback: PathBuf,
    clean_urls: bool,
}

impl SafeFileResolver {
    /// Canonicalizes `root` once. Fails if the root does not exist.
    pub fn new(root: impl AsRef<Path>, fallback: &str) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        let fallback = root.join(fallback);
        Ok(Self {
            root,
            fallback,
            clean_urls: true,
        })
    }

    pub fn clean_urls(mut self, enabled: bool) -> Self {
        self.clean_urls = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn resolve(&self, requested: &str, request_id: &str) -> Resolution {
        let normalized = requested.to_lowercase();

        if is_traversal_attempt(&normalized) {
            tracing::warn!(
                request_id = %request_id,
                requested = %requested,
                "Path traversal attempt rejected"
            );
            metrics::record_access_denied();
            return Resolution::Deny;
        }

        let candidate = self.root.join(&normalized);
        let resolved = match canonicalize_lenient(&candidate).await {
            Some(path) if path.starts_with(&self.root) => path,
            Some(path) => {
                tracing::warn!(
                    request_id = %request_id,
                    requested = %requested,
                    resolved = %path.display(),
                    "Resolved path escapes static root"
                );
                metrics::record_access_denied();
                return Resolution::Deny;
            }
            None => {
                tracing::warn!(
                    request_id = %request_id,
                    requested = %requested,
                    "Unresolvable static path rejected"
                );
                metrics::record_access_denied();
                return Resolution::Deny;
            }
        };

        if is_file(&resolved).await {
            return Resolution::Serve(resolved);
        }

        if self.clean_urls && !normalized.is_empty() && Path::new(&normalized).extension().is_none() {
            let page = resolved.with_extension("html");
            if let Ok(page) = fs::canonicalize(&page).await {
                if !page.starts_with(&self.root) {
                    tracing::warn!(
                        request_id = %request_id,
                        requested = %requested,
                        resolved = %page.display(),
                        "Resolved page escapes static root"
                    );
                    metrics::record_access_denied();
                    return Resolution::Deny;
                }
                if is_file(&page).await {
                    return Resolution::Serve(page);
                }
            }
        }

        if is_file(&self.fallback).await {
            tracing::debug!(request_id = %request_id, requested = %requested, "Serving fallback page");
            Resolution::Fallback(self.fallback.clone())
        } else {
            tracing::debug!(request_id = %request_id, requested = %requested, "Static file not found");
            Resolution::NotFound
        }
    }
}

/// Cheap rejection that never touches the filesystem.
pub fn is_traversal_attempt(name: &str) -> bool {
    name.contains("..")
        || name.starts_with('/')
        || name.starts_with('\\')
        || name.contains('\0')
        || Path::new(name)
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Canonicalize a path that may not exist yet.
///
/// Walks up to the nearest existing ancestor, canonicalizes that, and
/// re-appends the unresolved tail. A `..` in the tail cannot be resolved
/// safely, so it yields `None`.
async fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path).await {
        return Some(canonical);
    }

    let mut tail = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        tail.push(current.file_name()?.to_os_string());
        current = parent;
        if let Ok(mut resolved) = fs::canonicalize(current).await {
            resolved.extend(tail.iter().rev());
            return Some(resolved);
        }
    }
    None
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(with_index: bool) -> (TempDir, SafeFileResolver) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("about.html"), "<p>about</p>").unwrap();
        if with_index {
            std::fs::write(dir.path().join("index.html"), "<p>home</p>").unwrap();
        }
        let resolver = SafeFileResolver::new(dir.path(), "index.html").unwrap();
        (dir, resolver)
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let (_dir, resolver) = site(true);
        let expected = resolver.root().join("css/site.css");
        assert_eq!(
            resolver.resolve("css/site.css", "t").await,
            Resolution::Serve(expected)
        );
    }

    #[tokio::test]
    async fn test_case_is_normalized() {
        let (_dir, resolver) = site(true);
        assert_eq!(
            resolver.resolve("INDEX.HTML", "t").await,
            resolver.resolve("index.html", "t").await
        );
        assert!(matches!(
            resolver.resolve("About.Html", "t").await,
            Resolution::Serve(_)
        ));
    }

    #[tokio::test]
    async fn test_traversal_is_denied() {
        let (_dir, resolver) = site(true);
        for name in [
            "../../etc/passwd",
            "css/../../secret",
            "/etc/passwd",
            "\\windows\\win.ini",
            "..",
            "a\0b",
        ] {
            assert_eq!(resolver.resolve(name, "t").await, Resolution::Deny, "{name:?}");
        }
    }

    #[tokio::test]
    async fn test_syntactic_denial_needs_no_filesystem() {
        let (dir, resolver) = site(true);
        drop(dir);
        assert!(!resolver.root().exists());
        assert_eq!(resolver.resolve("../../etc/passwd", "t").await, Resolution::Deny);
        assert_eq!(resolver.resolve("/etc/passwd", "t").await, Resolution::Deny);
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let (_dir, resolver) = site(true);
        let index = resolver.root().join("index.html");
        assert_eq!(
            resolver.resolve("dashboard/settings", "t").await,
            Resolution::Fallback(index.clone())
        );
        // directories are not files
        assert_eq!(resolver.resolve("css", "t").await, Resolution::Fallback(index));
    }

    #[tokio::test]
    async fn test_not_found_without_fallback_page() {
        let (_dir, resolver) = site(false);
        assert_eq!(resolver.resolve("missing.js", "t").await, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_clean_url_serves_html_page() {
        let (dir, resolver) = site(true);
        std::fs::write(dir.path().join("sobre.html"), "<p>sobre</p>").unwrap();

        let page = resolver.root().join("sobre.html");
        assert_eq!(resolver.resolve("sobre", "t").await, Resolution::Serve(page.clone()));
        assert_eq!(resolver.resolve("Sobre", "t").await, Resolution::Serve(page));

        // no page behind the clean URL: fallback as before
        let index = resolver.root().join("index.html");
        assert_eq!(resolver.resolve("contato", "t").await, Resolution::Fallback(index.clone()));
        // an explicit extension is never rewritten
        assert_eq!(resolver.resolve("sobre.htm", "t").await, Resolution::Fallback(index.clone()));

        let resolver = resolver.clean_urls(false);
        assert_eq!(resolver.resolve("sobre", "t").await, Resolution::Fallback(index));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clean_url_page_symlinked_out_of_root_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("page.html"), "<p>x</p>").unwrap();

        let (dir, resolver) = site(true);
        std::os::unix::fs::symlink(outside.path().join("page.html"), dir.path().join("sobre.html"))
            .unwrap();

        assert_eq!(resolver.resolve("sobre", "t").await, Resolution::Deny);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_root_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "s3cr3t").unwrap();

        let (dir, resolver) = site(true);
        std::os::unix::fs::symlink(outside.path(), dir.path().join("leak")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("secret.txt"),
        )
        .unwrap();

        assert_eq!(resolver.resolve("leak/secret.txt", "t").await, Resolution::Deny);
        assert_eq!(resolver.resolve("secret.txt", "t").await, Resolution::Deny);
        // nonexistent paths under an escaping symlink are caught by the ancestor walk
        assert_eq!(resolver.resolve("leak/nothing.txt", "t").await, Resolution::Deny);
    }

    #[test]
    fn test_is_traversal_attempt() {
        assert!(is_traversal_attempt("../x"));
        assert!(is_traversal_attempt("a/..b"));
        assert!(is_traversal_attempt("/x"));
        assert!(!is_traversal_attempt("css/site.css"));
        assert!(!is_traversal_attempt(""));
    }
}
