//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`        - Redirect to the home page
//! - `GET  /{slug}`  - Short link redirect
//! - `GET  /health`  - Health check: link store, click queue, cache
//! - `/links*`       - Link management (see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on link creation
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, home_handler, redirect_handler};
use crate::api::middleware::rate_limit::RateLimitSettings;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limit` - creation limiter settings; `None` disables it. The peer-address limiter
///   needs the server to be started with `into_make_service_with_connect_info`.
pub fn app_router(state: AppState, rate_limit: Option<RateLimitSettings>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limit))
}

/// All routes with tracing, without path normalization.
pub fn router(state: AppState, rate_limit: Option<RateLimitSettings>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/{slug}", get(redirect_handler))
        .merge(api::routes::link_routes(rate_limit))
        .with_state(state)
        .layer(tracing::layer())
}
