//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// Country recorded when no geolocation is available.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One served redirect.
///
/// Created by the redirect path, handed to a [`crate::domain::visit::VisitRecorder`] and
/// eventually persisted as a counter increment and/or an appended click row.
///
/// `slug` is a plain back-reference: click history is kept independently of the link's own
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub slug: String,
    pub country: String,
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// A missing or blank `country` is recorded as [`UNKNOWN_COUNTRY`].
    pub fn new(slug: impl Into<String>, country: Option<&str>) -> Self {
        Self::at(slug, country, Utc::now())
    }

    /// Creates a click event with an explicit timestamp.
    pub fn at(slug: impl Into<String>, country: Option<&str>, occurred_at: DateTime<Utc>) -> Self {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY)
            .to_string();

        Self {
            slug: slug.into(),
            country,
            occurred_at,
        }
    }
}
