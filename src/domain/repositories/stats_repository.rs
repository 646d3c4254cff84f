//! Repository trait for click analytics.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Number of recorded clicks attributed to one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub total: i64,
}

/// Number of recorded clicks on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub clicks: i64,
}

/// Store-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub links: i64,
    pub clicks: i64,
}

/// A link ranked by its click counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClicks {
    pub slug: String,
    pub destination: String,
    pub click_count: i64,
}

/// Click rows of one owner's live links.
///
/// Each row is bounded below by the creation time of the link it belongs to, exactly as
/// [`ClickFilter`] does for a single link; `from_date`/`to_date` narrow all links alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFilter {
    pub owner: String,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl OwnerFilter {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            from_date: None,
            to_date: None,
        }
    }

    /// Adds date range filtering to the query.
    pub fn with_date_range(
        mut self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }

    /// The single-link window for a link of this owner created at `created_at`.
    pub fn for_link(&self, created_at: DateTime<Utc>) -> ClickFilter {
        ClickFilter::new(created_at).with_date_range(self.from_date, self.to_date)
    }
}

/// Time window applied to click rows.
///
/// `since` is the link's creation time: rows older than the link belong to a previous link
/// that used the same slug and are never counted. `from_date`/`to_date` narrow it further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickFilter {
    pub since: DateTime<Utc>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl ClickFilter {
    /// Creates a filter that only bounds rows from below by `since`.
    pub fn new(since: DateTime<Utc>) -> Self {
        Self {
            since,
            from_date: None,
            to_date: None,
        }
    }

    /// Adds date range filtering to the query.
    pub fn with_date_range(
        mut self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }

    /// Effective inclusive lower bound.
    pub fn lower_bound(&self) -> DateTime<Utc> {
        match self.from_date {
            Some(from) if from > self.since => from,
            _ => self.since,
        }
    }

    /// Returns true if a click at `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.lower_bound() && self.to_date.is_none_or(|to| at <= to)
    }
}

/// Read-side queries over recorded clicks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Counts recorded clicks for a slug inside the filter window.
    async fn count_clicks(&self, slug: &str, filter: ClickFilter) -> Result<i64, AppError>;

    /// Groups recorded clicks for a slug by country, largest first.
    async fn country_breakdown(
        &self,
        slug: &str,
        filter: ClickFilter,
    ) -> Result<Vec<CountryCount>, AppError>;

    /// Groups recorded clicks for a slug by UTC day, oldest first.
    async fn daily_clicks(&self, slug: &str, filter: ClickFilter)
    -> Result<Vec<DailyCount>, AppError>;

    /// Counts all links and all recorded clicks.
    async fn totals(&self) -> Result<Totals, AppError>;

    /// Counts an owner's links and sums their click counters.
    async fn owner_totals(&self, owner: &str) -> Result<Totals, AppError>;

    /// Groups recorded clicks across an owner's links by country, largest first.
    async fn owner_country_breakdown(
        &self,
        filter: OwnerFilter,
    ) -> Result<Vec<CountryCount>, AppError>;

    /// Groups recorded clicks across an owner's links by UTC day, oldest first.
    async fn owner_daily_clicks(&self, filter: OwnerFilter) -> Result<Vec<DailyCount>, AppError>;

    /// An owner's links with the highest click counters, at most `limit`.
    async fn top_links(&self, owner: &str, limit: i64) -> Result<Vec<LinkClicks>, AppError>;
}
