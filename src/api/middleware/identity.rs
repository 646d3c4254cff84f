//! Owner identity forwarded by the upstream auth gateway.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::json;

use crate::error::AppError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Optional caller identity. Blank, missing or non-UTF-8 values mean anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub Option<String>);

fn read_owner(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Owner(read_owner(parts)))
    }
}

/// Required caller identity; rejects anonymous requests with `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireOwner(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        read_owner(parts).map(RequireOwner).ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": format!("{USER_ID_HEADER} header is missing") }),
            )
        })
    }
}
