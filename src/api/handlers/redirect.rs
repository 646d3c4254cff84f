//! Handlers for short URL redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::Resolution;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::country::country_from_headers;

/// Redirects a slug to its destination.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Resolve the slug (cache, then the link store)
/// 2. Queue a click event with the visitor's country, without waiting for it to be stored
/// 3. Return `302 Found` with `Location` set to the destination
///
/// # Errors
///
/// - `404 Not Found` for unknown or malformed slugs
/// - `500 Internal Server Error` if the link store cannot be queried
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let country = country_from_headers(&headers, &state.country_headers);

    let resolution = state
        .redirect_service
        .resolve(&slug, country.as_deref())
        .await?;

    Ok(found(resolution))
}

/// Sends `GET /` to the configured home page.
pub async fn home_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let resolution = state.redirect_service.resolve("", None).await?;
    Ok(found(resolution))
}

fn found(resolution: Resolution) -> Response {
    let location = match resolution {
        Resolution::Home(url) | Resolution::Redirect(url) => url,
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
