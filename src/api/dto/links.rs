//! DTOs for link creation, probing and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::PaginationMeta;

/// Request to create a short link.
///
/// Lengths and formats are checked by the allocator so that their errors carry specific codes.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub destination: String,

    /// Optional caller-chosen slug.
    pub slug: Option<String>,
}

/// The created link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub slug: String,
    pub short_url: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

/// Result of `GET /links/{slug}/exists`.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub slug: String,
    pub available: bool,
    pub message: String,
}

/// One entry of an owner's link listing.
#[derive(Debug, Serialize)]
pub struct LinkListItem {
    pub slug: String,
    pub short_url: String,
    pub destination: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkListItem>,
}
