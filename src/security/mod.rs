//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (sliding window per client, artifact endpoints only)
//!     → [handler]
//!     → headers.rs (hardening headers on the way out)
//!     → cors.rs (origin policy; answers preflights before routing)
//! ```
//!
//! Path traversal defense lives with the static file resolver.
//!
//! # Design Decisions
//! - Fail closed: anything that cannot be checked is rejected
//! - Rejections are logged with the request id as security events

pub mod cors;
pub mod headers;
pub mod rate_limit;
