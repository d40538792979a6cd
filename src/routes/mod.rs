//! HTTP route handlers.
//!
//! The lookup endpoint is never cacheable since every call re-rolls the
//! simulated upstream. Request tracing is enabled via middleware that
//! generates a unique request ID for each incoming request, allowing
//! correlation of all logs within a request.

pub mod health;
pub mod lookup;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{CACHE_CONTROL_HEALTH, CACHE_CONTROL_LOOKUP};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Path of the external lookup endpoint
pub const LOOKUP_PATH: &str = "/external";

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    let lookup_routes = Router::new()
        .route(LOOKUP_PATH, get(lookup::external))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_LOOKUP),
        ));

    let health_routes = Router::new().route("/health", get(health::health)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ),
    );

    Router::new()
        .merge(lookup_routes)
        .merge(health_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
