//! Repository trait for the link store.

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Outcome of [`LinkRepository::insert_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The row was written; carries the persisted link with its generated fields.
    Created(Link),
    /// A link with the same slug already exists. Nothing was written.
    Conflict,
}

/// Storage contract for short links.
///
/// Slug uniqueness is the store's responsibility: [`LinkRepository::insert_if_absent`] must be
/// atomic with respect to the uniqueness check (a unique index with conflict handling, a
/// conditional put, or a single critical section). Callers never check-then-insert.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its exact slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] when the store cannot be queried.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Inserts the link unless its slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures. A taken slug is not an error here;
    /// it is reported as [`Insertion::Conflict`].
    async fn insert_if_absent(&self, new_link: NewLink) -> Result<Insertion, AppError>;

    /// Adds one to the link's click counter.
    ///
    /// Returns `Ok(false)` if the slug no longer exists.
    async fn increment_clicks(&self, slug: &str) -> Result<bool, AppError>;

    /// Appends a click row for later analytics.
    async fn append_click_event(&self, event: ClickEvent) -> Result<(), AppError>;

    /// Removes a link. Click history is left untouched.
    ///
    /// Returns `Ok(true)` if a link was removed, `Ok(false)` if none matched.
    async fn delete(&self, slug: &str) -> Result<bool, AppError>;

    /// Lists an owner's links, newest first.
    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts an owner's links.
    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError>;

    /// Returns true if the store answers a trivial query.
    async fn health_check(&self) -> bool;
}
