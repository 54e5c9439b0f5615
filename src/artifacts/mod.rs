//! Generated artifact storage.
//!
//! # Data Flow
//! ```text
//! POST /api/generate-cv
//!     → mint_id() (UUID v4)
//!     → ArtifactStore::put (created_at = clock now)
//!
//! GET /api/cv/{id}[/download]
//!     → ArtifactStore::get (no age check)
//!
//! lifecycle::maintenance (every sweep_interval)
//!     → ArtifactStore::sweep (drops records older than retention)
//! ```
//!
//! # Design Decisions
//! - Absent and expired ids are indistinguishable to callers
//! - Staleness is bounded by retention + sweep_interval
//! - Sweeps lock one shard at a time, so requests elsewhere keep flowing

pub mod store;

pub use store::ExpiringRecordStore;

use crate::cv::CvRecord;

/// Store for generated resumes.
pub type ArtifactStore = ExpiringRecordStore<CvRecord>;

/// Fresh opaque artifact id.
pub fn mint_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
