//! Handlers for link creation, probing, listing and deletion.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    AvailabilityResponse, CreateLinkRequest, CreateLinkResponse, LinkListItem, LinkListResponse,
};
use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::middleware::identity::{Owner, RequireOwner};
use crate::application::services::{Availability, DeleteAuthority};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// { "destination": "https://example.com/docs", "slug": "docs" }
/// ```
///
/// `slug` is optional; without it a random slug is generated. The optional `X-User-Id` header
/// records the owner.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "slug": "docs",
///   "shortUrl": "https://sho.rt/docs",
///   "destination": "https://example.com/docs",
///   "createdAt": "2026-03-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400` invalid destination, invalid slug format or malformed payload
/// - `409` the requested slug is taken
/// - `500` slug allocation exhausted or store failure
pub async fn create_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(payload) = payload?;

    let link = state
        .link_service
        .create_link(&payload.destination, payload.slug.as_deref(), owner)
        .await?;

    let response = CreateLinkResponse {
        short_url: state.link_service.short_url(&link.slug),
        slug: link.slug,
        destination: link.destination,
        created_at: link.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Reports whether a slug is free to claim.
///
/// # Endpoint
///
/// `GET /links/{slug}/exists`
///
/// Read-only and advisory: creation never relies on it. Malformed slugs are reported as
/// unavailable with the reason in `message`.
pub async fn slug_exists_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let availability = state.link_service.availability(&slug).await?;

    let (available, message) = match availability {
        Availability::Available => (true, "Slug is available".to_string()),
        Availability::Taken => (false, "Slug is already taken".to_string()),
        Availability::Invalid(reason) => (false, reason),
    };

    Ok(Json(AvailabilityResponse {
        slug: slug.trim().to_string(),
        available,
        message,
    }))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /links?page=1&page_size=25`
///
/// Requires `X-User-Id`.
pub async fn list_links_handler(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<LinkListResponse>, AppError> {
    let Query(params) = params?;
    params.validate()?;
    let (page, page_size, offset) = params.resolve();

    let (links, total) = state
        .link_service
        .list_links(&owner, offset, i64::from(page_size))
        .await?;

    let items = links
        .into_iter()
        .map(|link| LinkListItem {
            short_url: state.link_service.short_url(&link.slug),
            slug: link.slug,
            destination: link.destination,
            click_count: link.click_count,
            created_at: link.created_at,
        })
        .collect();

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(page, page_size, total),
        items,
    }))
}

/// Deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /links/{slug}`
///
/// Requires `X-User-Id`. Responds `204 No Content`; `403` for links owned by someone else or
/// by nobody, `404` for unknown slugs. Recorded clicks are kept.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let link = state
        .link_service
        .delete_link(&slug, DeleteAuthority::Owner(owner))
        .await?;

    state.redirect_service.forget(&link.slug).await;

    Ok(StatusCode::NO_CONTENT)
}
