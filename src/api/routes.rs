//! Link management routes.
//!
//! Owner identity comes from the `X-User-Id` header (see [`crate::api::middleware::identity`]).

use crate::api::handlers::{
    create_link_handler, delete_link_handler, list_links_handler, owner_stats_handler,
    slug_exists_handler, stats_handler,
};
use crate::api::middleware::rate_limit::{self, RateLimitSettings};
use crate::state::AppState;
use axum::{
    Router,
    routing::{MethodRouter, delete, get, post},
};

/// Link routes.
///
/// # Endpoints
///
/// - `POST   /links`                - Create a link (rate limited, owner optional)
/// - `GET    /links`                - The caller's links, newest first (owner required)
/// - `GET    /links/stats`          - Click statistics across the caller's links (owner required)
/// - `GET    /links/{slug}/exists`  - Slug availability
/// - `GET    /links/{slug}/stats`   - Click statistics for one link
/// - `DELETE /links/{slug}`         - Delete a link (owner required)
///
/// `rate_limit` of `None` disables the creation limiter.
pub fn link_routes(rate_limit: Option<RateLimitSettings>) -> Router<AppState> {
    Router::new()
        .route("/links", create_route(rate_limit).get(list_links_handler))
        .route("/links/stats", get(owner_stats_handler))
        .route("/links/{slug}", delete(delete_link_handler))
        .route("/links/{slug}/exists", get(slug_exists_handler))
        .route("/links/{slug}/stats", get(stats_handler))
}

fn create_route(settings: Option<RateLimitSettings>) -> MethodRouter<AppState> {
    let route = post(create_link_handler);

    match settings {
        Some(settings) if settings.behind_proxy => route.layer(rate_limit::proxied_layer(settings)),
        Some(settings) => route.layer(rate_limit::layer(settings)),
        None => route,
    }
}
