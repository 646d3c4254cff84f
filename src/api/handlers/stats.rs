//! Handlers for per-link statistics and the owner overview.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};

use crate::api::dto::pagination::DateFilterParams;
use crate::api::dto::stats::{LinkStatsResponse, OwnerOverviewResponse};
use crate::api::middleware::identity::RequireOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click statistics for a link.
///
/// # Endpoint
///
/// `GET /links/{slug}/stats?from=2026-01-01T00:00:00Z&to=2026-02-01T00:00:00Z`
///
/// # Response
///
/// ```json
/// {
///   "slug": "docs",
///   "destination": "https://example.com/docs",
///   "created_at": "2026-01-01T10:00:00Z",
///   "click_count": 3,
///   "recorded_clicks": 3,
///   "countries": [{ "country": "DE", "total": 2, "percent": 67 }],
///   "daily": [{ "date": "2026-01-02", "clicks": 3 }]
/// }
/// ```
///
/// # Errors
///
/// - `400` malformed or inverted date range
/// - `404` unknown slug
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    params: Result<Query<DateFilterParams>, QueryRejection>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let Query(params) = params?;

    let stats = state
        .stats_service
        .link_stats(&slug, params.from, params.to)
        .await?;

    Ok(Json(stats.into()))
}

/// Returns click statistics across all of the caller's links.
///
/// # Endpoint
///
/// `GET /links/stats?from=2026-01-01T00:00:00Z`
///
/// Requires `X-User-Id`. `top_links` holds at most five links, highest counter first.
///
/// # Errors
///
/// - `400` malformed or inverted date range
/// - `401` missing owner
pub async fn owner_stats_handler(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    params: Result<Query<DateFilterParams>, QueryRejection>,
) -> Result<Json<OwnerOverviewResponse>, AppError> {
    let Query(params) = params?;

    let overview = state
        .stats_service
        .owner_overview(&owner, params.from, params.to)
        .await?;

    Ok(Json(overview.into()))
}
