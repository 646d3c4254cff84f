//! Shared application state injected into every handler.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::application::services::{LinkService, RedirectService, StatsService};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::domain::visit::QueuedVisitRecorder;
use crate::infrastructure::cache::CacheService;
use crate::utils::country::DEFAULT_COUNTRY_HEADERS;
use crate::utils::slug::SlugGenerator;

/// Settings the HTTP layer needs beyond the storage handles.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub generator: SlugGenerator,
    pub base_url: String,
    pub home_url: String,
    pub country_headers: Vec<String>,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            generator: config.slug_generator()?,
            base_url: config.base_url.clone(),
            home_url: config.home_url.clone(),
            country_headers: config.country_headers.clone(),
        })
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            generator: SlugGenerator::default(),
            base_url: "http://localhost:3000".to_string(),
            home_url: "http://localhost:3000".to_string(),
            country_headers: DEFAULT_COUNTRY_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

/// Services and handles shared by all requests. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub redirect_service: Arc<RedirectService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn LinkRepository, dyn StatsRepository>>,
    pub cache: Arc<dyn CacheService>,
    /// Producer side of the click queue; also used by the health check.
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub country_headers: Arc<[String]>,
}

impl AppState {
    /// Wires the services together. Visits are recorded by pushing onto `click_sender`.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: AppSettings,
    ) -> Self {
        let recorder = Arc::new(QueuedVisitRecorder::new(click_sender.clone()));

        Self {
            link_service: Arc::new(LinkService::new(
                link_repository.clone(),
                settings.generator,
                settings.base_url,
            )),
            redirect_service: Arc::new(RedirectService::new(
                link_repository.clone(),
                cache.clone(),
                recorder,
                settings.home_url,
            )),
            stats_service: Arc::new(StatsService::new(link_repository, stats_repository)),
            cache,
            click_sender,
            country_headers: settings.country_headers.into(),
        }
    }
}
