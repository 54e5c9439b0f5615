//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl+C / SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → HTTP server stops accepting and drains
//!               → admin server stops
//!               → maintenance tasks exit
//!
//! Maintenance (maintenance.rs):
//!     interval tick → limiter cleanup / artifact sweep
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every task holds its own receiver
//! - Background work never outlives the server that owns the state

pub mod maintenance;
pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
