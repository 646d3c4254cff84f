//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link.
///
/// `slug`, `destination`, `owner` and `created_at` never change after creation.
/// `click_count` only grows, and only through click accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub destination: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        slug: String,
        destination: String,
        owner: Option<String>,
        created_at: DateTime<Utc>,
        click_count: i64,
    ) -> Self {
        Self {
            id,
            slug,
            destination,
            owner,
            created_at,
            click_count,
        }
    }

    /// Returns true if `owner` is the recorded owner of this link.
    ///
    /// Anonymous links are owned by nobody.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner.as_deref() == Some(owner)
    }
}

/// Input data for creating a new link.
///
/// Both fields are expected to be already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub slug: String,
    pub destination: String,
    pub owner: Option<String>,
}
