//! Slug resolution for the redirect path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::domain::visit::VisitRecorder;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::slug::canonical_slug;

/// Where a resolved request should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Empty path: send the visitor to the site's home page.
    Home(String),
    /// A known slug: send the visitor to its destination.
    Redirect(String),
}

/// Resolves inbound slugs and accounts for the visit.
///
/// # Request Flow
///
/// 1. Blank input resolves to [`Resolution::Home`]
/// 2. Input that cannot be a slug is [`AppError::NotFound`] without touching the store
/// 3. Cache, then the link store; a store failure is [`AppError::LookupFailed`]
/// 4. On a hit, a [`ClickEvent`] goes to the [`VisitRecorder`]; its failures are logged and
///    counted, never returned
///
/// The lookup is never retried.
///
/// Store hits fill the cache in the background. A fill that overlaps [`RedirectService::forget`]
/// is dropped, so a deleted link is not cached again by this process.
pub struct RedirectService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    recorder: Arc<dyn VisitRecorder>,
    home_url: String,
    /// Bumped by every `forget`.
    invalidations: Arc<AtomicU64>,
}

impl<L: LinkRepository + ?Sized> RedirectService<L> {
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        recorder: Arc<dyn VisitRecorder>,
        home_url: impl Into<String>,
    ) -> Self {
        Self {
            link_repository,
            cache,
            recorder,
            home_url: home_url.into(),
            invalidations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Resolves `raw` and records the visit. `country` is best-effort geolocation.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] for malformed or unknown slugs (no click is recorded)
    /// - [`AppError::LookupFailed`] when the link store fails
    pub async fn resolve(&self, raw: &str, country: Option<&str>) -> Result<Resolution, AppError> {
        if raw.trim().is_empty() {
            return Ok(Resolution::Home(self.home_url.clone()));
        }

        let slug = canonical_slug(raw).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "slug": raw.trim() }))
        })?;

        let destination = self.lookup(&slug).await?;

        if let Err(e) = self.recorder.record_visit(ClickEvent::new(slug.clone(), country)).await {
            warn!(slug = %slug, error = %e, "Click not recorded");
        }

        metrics::counter!("shortlink_redirects_total").increment(1);
        Ok(Resolution::Redirect(destination))
    }

    async fn lookup(&self, slug: &str) -> Result<String, AppError> {
        let seen = self.invalidations.load(Ordering::SeqCst);

        match self.cache.get_destination(slug).await {
            Ok(Some(destination)) => return Ok(destination),
            Ok(None) => debug!(slug, "Cache MISS"),
            Err(e) => warn!(slug, error = %e, "Cache lookup failed, using the link store"),
        }

        let link = self
            .link_repository
            .find_by_slug(slug)
            .await
            .map_err(|e| {
                AppError::lookup_failed("Failed to resolve short link", json!({ "reason": e.to_string() }))
            })?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "slug": slug })))?;

        let cache = self.cache.clone();
        let invalidations = self.invalidations.clone();
        let key = link.slug.clone();
        let destination = link.destination.clone();
        tokio::spawn(async move {
            if invalidations.load(Ordering::SeqCst) != seen {
                debug!(slug = %key, "Cache fill skipped after invalidation");
                return;
            }
            if let Err(e) = cache.set_destination(&key, &destination, None).await {
                warn!(slug = %key, error = %e, "Failed to cache destination");
                return;
            }
            // A forget that landed during the write may have run its invalidate first.
            if invalidations.load(Ordering::SeqCst) != seen
                && let Err(e) = cache.invalidate(&key).await
            {
                warn!(slug = %key, error = %e, "Failed to undo cache fill");
            }
        });

        Ok(link.destination)
    }

    /// Drops any cached destination for `slug` and cancels fills still in flight.
    pub async fn forget(&self, slug: &str) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.cache.invalidate(slug).await {
            warn!(slug, error = %e, "Failed to invalidate cache entry");
        }
    }
}
