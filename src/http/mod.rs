//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace span, limits)
//!     → /api/*
//!         → rate limiter (generate-cv, ats-analyze only)
//!         → handlers.rs (validate → sanitize → act)
//!     → /<anything else>
//!         → handlers.rs → static_files resolver
//!     → response.rs (ApiError → JSON error body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod state;

pub use request::{RequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::HttpServer;
pub use state::{AppState, StartupError};
