//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the API, static and fallback routes
//! - Wire up middleware (request id, tracing, panics, body limits, timeouts, CORS)
//! - Guard artifact-producing endpoints with the rate limiter
//! - Start maintenance tasks and apply hot-reloaded config
//! - Serve until the shutdown broadcast fires

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::clock::{SharedClock, SystemClock};
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::http::response::ApiError;
use crate::http::state::{AppState, StartupError};
use crate::lifecycle::maintenance::{spawn_artifact_sweep, spawn_rate_limit_cleanup};
use crate::observability::metrics;
use crate::security::cors::apply_cors;
use crate::security::headers::apply_security_headers;
use crate::security::rate_limit::rate_limit_middleware;

/// HTTP server for the gateway.
pub struct HttpServer {
    state: AppState,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`HttpServer::new`], with an explicit time source.
    pub fn with_clock(config: GatewayConfig, clock: SharedClock) -> Result<Self, StartupError> {
        let state = AppState::new(config, clock)?;
        let router = Self::build_router(state.clone());
        Ok(Self { state, router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config();

        let limited = Router::new()
            .route("/generate-cv", post(handlers::generate_cv))
            .route("/ats-analyze", post(handlers::ats_analyze))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ));

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/templates", get(handlers::templates))
            .route("/cv/{id}", get(handlers::get_cv))
            .route("/cv/{id}/download", get(handlers::download_cv))
            .merge(limited)
            .method_not_allowed_fallback(method_not_allowed)
            .fallback(handlers::api_not_found);

        let router = Router::new()
            .nest("/api", api)
            .route("/", any(handlers::static_index))
            .route("/{*path}", any(handlers::static_file))
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests));

        let router = if config.security.enable_headers {
            apply_security_headers(router)
        } else {
            router
        };
        let router = apply_cors(router, &config.security.cors, config.environment);

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(DefaultBodyLimit::disable()),
        )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Reloaded configs arriving on `config_updates` are applied live. The
    /// server, its maintenance tasks and the reload loop all stop when
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = self.state.config();
        tracing::info!(
            address = %addr,
            environment = config.environment.as_str(),
            static_root = %self.state.resolver.root().display(),
            "HTTP server starting"
        );

        let cleanup = spawn_rate_limit_cleanup(
            self.state.rate_limiter.clone(),
            config.rate_limit.cleanup_interval(),
            shutdown.resubscribe(),
        );
        let sweep = spawn_artifact_sweep(
            self.state.artifacts.clone(),
            config.artifacts.sweep_interval(),
            shutdown.resubscribe(),
        );

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        let reloader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => {
                            if let Err(e) = state.apply_config(new_config) {
                                tracing::error!(error = %e, "Rejected reloaded configuration");
                            }
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await;

        for task in [cleanup, sweep, reloader] {
            task.abort();
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %message, "Handler panicked");
    ApiError::Internal { detail: None }.into_response()
}
