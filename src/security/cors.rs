//! Cross-origin policy.

use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::{CorsConfig, Environment};
use crate::http::X_REQUEST_ID;

/// Build the CORS layer for `environment`.
///
/// Origins are mirrored rather than answered with `*` so credentials can be
/// allowed. A rejected origin gets no `Access-Control-Allow-Origin` header;
/// the request itself still runs and the browser withholds the response.
pub fn cors_layer(config: &CorsConfig, environment: Environment) -> CorsLayer {
    let allow_origin = if environment.is_development() {
        AllowOrigin::mirror_request()
    } else {
        let suffixes = config.allowed_origin_suffixes.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin_allowed(origin, &suffixes)
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([HeaderName::from_static(X_REQUEST_ID), header::RETRY_AFTER])
        .allow_credentials(config.allow_credentials)
        .max_age(Duration::from_secs(config.max_age_secs))
}

pub fn apply_cors<S>(router: Router<S>, config: &CorsConfig, environment: Environment) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if !config.enabled {
        return router;
    }
    router.layer(cors_layer(config, environment))
}

fn origin_allowed(origin: &HeaderValue, suffixes: &[String]) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let allowed = suffixes.iter().any(|suffix| origin.ends_with(suffix.as_str()));
    if !allowed {
        tracing::warn!(origin = %origin, "CORS origin rejected");
    }
    allowed
}
