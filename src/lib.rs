//! Resume gateway library: request admission and validation in front of a
//! resume builder.

pub mod admin;
pub mod artifacts;
pub mod clock;
pub mod config;
pub mod cv;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod static_files;
pub mod validation;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
