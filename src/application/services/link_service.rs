//! Link allocation, lookup and removal.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{Insertion, LinkRepository};
use crate::error::AppError;
use crate::utils::slug::{SlugGenerator, canonical_slug, is_reserved, normalize_requested_slug};
use crate::utils::url_normalizer::normalize_destination;

/// Who is asking for a link to be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAuthority {
    /// An end user; only links they own may be removed.
    Owner(String),
    /// Operator tooling; ownership is not checked.
    Admin,
}

/// Result of a read-only slug availability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
    /// The slug could never be allocated; carries the reason.
    Invalid(String),
}

/// Allocates slugs and manages the link lifecycle.
///
/// Slug uniqueness rests entirely on [`LinkRepository::insert_if_absent`]. The service never
/// looks a slug up before inserting it, so two concurrent requests for the same slug resolve to
/// one success and one [`AppError::SlugTaken`].
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    generator: SlugGenerator,
    base_url: String,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    pub fn new(link_repository: Arc<L>, generator: SlugGenerator, base_url: impl Into<String>) -> Self {
        Self {
            link_repository,
            generator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a link for `destination`.
    ///
    /// # Slug Selection
    ///
    /// - A requested slug is validated and inserted once. A conflict is reported as
    ///   [`AppError::SlugTaken`]; there is no fallback to a generated slug.
    /// - Without a requested slug, random candidates are inserted until one succeeds or the
    ///   generator's attempt budget runs out.
    ///
    /// Validation always completes before the store is touched.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidDestination`] for anything but an absolute http(s) URL
    /// - [`AppError::InvalidSlugFormat`] for a malformed or reserved requested slug
    /// - [`AppError::SlugTaken`] when the requested slug exists
    /// - [`AppError::AllocationExhausted`] when every generated candidate collided
    /// - [`AppError::Store`] on storage failures
    pub async fn create_link(
        &self,
        destination: &str,
        requested_slug: Option<&str>,
        owner: Option<String>,
    ) -> Result<Link, AppError> {
        let destination = normalize_destination(destination).map_err(|e| {
            AppError::invalid_destination("Invalid destination URL", json!({ "reason": e.to_string() }))
        })?;

        let requested = match requested_slug {
            Some(raw) => normalize_requested_slug(raw)?,
            None => None,
        };

        let owner = owner
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());

        let link = match requested {
            Some(slug) => self.insert_requested(slug, destination, owner).await?,
            None => self.insert_generated(destination, owner).await?,
        };

        metrics::counter!("shortlink_links_created_total").increment(1);
        info!(slug = %link.slug, owner = ?link.owner, "Link created");

        Ok(link)
    }

    async fn insert_requested(
        &self,
        slug: String,
        destination: String,
        owner: Option<String>,
    ) -> Result<Link, AppError> {
        let new_link = NewLink {
            slug: slug.clone(),
            destination,
            owner,
        };

        match self.link_repository.insert_if_absent(new_link).await? {
            Insertion::Created(link) => Ok(link),
            Insertion::Conflict => Err(AppError::SlugTaken { slug }),
        }
    }

    async fn insert_generated(
        &self,
        destination: String,
        owner: Option<String>,
    ) -> Result<Link, AppError> {
        let attempts = self.generator.max_attempts();

        for attempt in 1..=attempts {
            let slug = self.generator.generate();
            if is_reserved(&slug) {
                continue;
            }

            let new_link = NewLink {
                slug,
                destination: destination.clone(),
                owner: owner.clone(),
            };

            match self.link_repository.insert_if_absent(new_link).await? {
                Insertion::Created(link) => return Ok(link),
                Insertion::Conflict => debug!(attempt, "Generated slug collided"),
            }
        }

        metrics::counter!("shortlink_allocation_exhausted_total").increment(1);
        warn!(attempts, "Slug allocation exhausted");

        Err(AppError::AllocationExhausted { attempts })
    }

    /// Reports whether `raw` could be claimed right now.
    ///
    /// Purely informational: a later [`Self::create_link`] can still lose a race.
    pub async fn availability(&self, raw: &str) -> Result<Availability, AppError> {
        let slug = match normalize_requested_slug(raw) {
            Ok(Some(slug)) => slug,
            Ok(None) => return Ok(Availability::Invalid("Slug must not be empty".to_string())),
            Err(e) => return Ok(Availability::Invalid(e.to_string())),
        };

        match self.link_repository.find_by_slug(&slug).await? {
            Some(_) => Ok(Availability::Taken),
            None => Ok(Availability::Available),
        }
    }

    /// Retrieves a link by slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches.
    pub async fn get_link(&self, slug: &str) -> Result<Link, AppError> {
        let not_found = || AppError::not_found("Short link not found", json!({ "slug": slug }));

        let key = canonical_slug(slug).ok_or_else(not_found)?;
        self.link_repository
            .find_by_slug(&key)
            .await?
            .ok_or_else(not_found)
    }

    /// Removes a link and returns it. Click history is kept.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link matches
    /// - [`AppError::Forbidden`] if an owner tries to remove a link that is not theirs;
    ///   anonymous links can only be removed with [`DeleteAuthority::Admin`]
    pub async fn delete_link(&self, slug: &str, authority: DeleteAuthority) -> Result<Link, AppError> {
        let link = self.get_link(slug).await?;

        if let DeleteAuthority::Owner(owner) = &authority
            && !link.is_owned_by(owner)
        {
            return Err(AppError::forbidden(
                "Only the owner can delete this link",
                json!({ "slug": link.slug }),
            ));
        }

        if !self.link_repository.delete(&link.slug).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": link.slug }),
            ));
        }

        info!(slug = %link.slug, admin = matches!(authority, DeleteAuthority::Admin), "Link deleted");
        Ok(link)
    }

    /// Returns one page of an owner's links, newest first, with the owner's total link count.
    pub async fn list_links(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let items = self.link_repository.list_by_owner(owner, offset, limit).await?;
        let total = self.link_repository.count_by_owner(owner).await?;

        Ok((items, total))
    }

    /// Public URL for `slug`.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url, slug)
    }

    pub async fn health_check(&self) -> bool {
        self.link_repository.health_check().await
    }
}
