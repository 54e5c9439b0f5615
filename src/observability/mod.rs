//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, request id as a span field)
//!     → metrics.rs (counters and gauges through the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Security events (denied paths, rate-limit rejections) log at `warn`
//! - Metric labels are bounded sets, never raw paths or client addresses

pub mod logging;
pub mod metrics;
