//! Resume Gateway
//!
//! Admission and validation front for the resume builder.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────────┐
//!                        │                  RESUME GATEWAY                   │
//!                        │                                                   │
//!   Client Request       │  ┌────────────┐   ┌────────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│ request id │──▶│  /api/*    │──▶│ rate limit │  │
//!                        │  │ trace/limit│   │  router    │   │ (sliding)  │  │
//!                        │  └────────────┘   └─────┬──────┘   └─────┬──────┘  │
//!                        │                         │                │         │
//!                        │                         ▼                ▼         │
//!                        │                  ┌────────────┐   ┌────────────┐   │
//!                        │                  │ static     │   │ validator  │   │
//!                        │                  │ resolver   │   │ + sanitize │   │
//!                        │                  └────────────┘   └─────┬──────┘   │
//!                        │                                         ▼          │
//!                        │                                  ┌────────────┐    │
//!                        │                                  │ artifact   │    │
//!                        │                                  │ store      │    │
//!                        │                                  └────────────┘    │
//!                        │                                                   │
//!                        │  config (hot reload) · observability · lifecycle  │
//!                        └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use resume_gateway::admin::setup_admin_router;
use resume_gateway::config::{load_or_default, watcher::ConfigWatcher};
use resume_gateway::lifecycle::{signals::wait_for_signal, Shutdown};
use resume_gateway::observability::{logging::init_logging, metrics::init_metrics};
use resume_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "resume-gateway", version, about = "Admission and validation gateway for the resume builder")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Reload the config file when it changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "resume-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = config.environment.as_str(),
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_max_requests = config.rate_limit.max_requests,
        artifact_retention_secs = config.artifacts.retention_secs,
        "Configuration loaded"
    );
    if config.rate_limit.enabled && config.rate_limit.trust_forwarded_for {
        tracing::warn!(
            "Rate limiting keys on X-Forwarded-For; direct clients can choose their own key \
             unless a proxy overwrites the header"
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config.clone())?;
    let shutdown = Shutdown::new();

    // Kept alive for the lifetime of the process; dropping it stops reloads.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        let admin_app = setup_admin_router(server.state().clone());
        let mut admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        tokio::spawn(async move {
            let served = axum::serve(admin_listener, admin_app)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
