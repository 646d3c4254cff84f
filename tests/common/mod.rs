#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::click_worker::run_click_worker;
use shortlink::domain::entities::{Link, NewLink};
use shortlink::domain::repositories::{Insertion, LinkRepository};
use shortlink::domain::visit::{ClickAccounting, StoreVisitRecorder};
use shortlink::error::AppError;
use shortlink::infrastructure::cache::NullCache;
use shortlink::infrastructure::persistence::InMemoryStore;
use shortlink::routes::router;
use shortlink::state::{AppSettings, AppState};

pub const HOME_URL: &str = "https://home.example/";

pub fn settings() -> AppSettings {
    AppSettings {
        base_url: "http://sho.rt".to_string(),
        home_url: HOME_URL.to_string(),
        ..AppSettings::default()
    }
}

/// State over `store` with no worker attached; the receiver holds queued clicks.
pub fn create_test_state(
    store: Arc<InMemoryStore>,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(queue_capacity);
    let state = AppState::new(store.clone(), store, Arc::new(NullCache), tx, settings());
    (state, rx)
}

/// Drains `rx` into `link_repository` the way the server does.
pub fn spawn_worker(
    rx: mpsc::Receiver<ClickEvent>,
    link_repository: Arc<dyn LinkRepository>,
) -> JoinHandle<()> {
    let recorder = Arc::new(StoreVisitRecorder::new(
        link_repository,
        ClickAccounting::Both,
        0,
    ));
    tokio::spawn(run_click_worker(rx, recorder, 4))
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(router(state, None)).unwrap()
}

pub fn make_router_server(app: Router) -> TestServer {
    TestServer::new(app).unwrap()
}

/// Server over a fresh in-memory store with a running click worker.
pub fn spawn_app() -> (TestServer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let (state, rx) = create_test_state(store.clone(), 100);
    spawn_worker(rx, store.clone());
    (make_server(state), store)
}

pub async fn create_test_link(
    store: &InMemoryStore,
    slug: &str,
    destination: &str,
    owner: Option<&str>,
) -> Link {
    let insertion = store
        .insert_if_absent(NewLink {
            slug: slug.to_string(),
            destination: destination.to_string(),
            owner: owner.map(str::to_string),
        })
        .await
        .unwrap();

    match insertion {
        Insertion::Created(link) => link,
        Insertion::Conflict => panic!("slug {slug} already exists"),
    }
}

/// Polls until `slug` has `clicks` counted and `rows` click rows stored.
pub async fn wait_for_clicks(store: &InMemoryStore, slug: &str, clicks: i64, rows: usize) {
    for _ in 0..200 {
        let counted = store
            .find_by_slug(slug)
            .await
            .unwrap()
            .map(|l| l.click_count)
            .unwrap_or_default();
        if counted >= clicks && store.click_rows().await >= rows {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("clicks for {slug} were not recorded in time");
}

/// Link store whose click writes always fail.
pub struct FailingClickStore {
    inner: InMemoryStore,
}

impl FailingClickStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LinkRepository for FailingClickStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        self.inner.find_by_slug(slug).await
    }

    async fn insert_if_absent(&self, new_link: NewLink) -> Result<Insertion, AppError> {
        self.inner.insert_if_absent(new_link).await
    }

    async fn increment_clicks(&self, _slug: &str) -> Result<bool, AppError> {
        Err(AppError::store("Database error", json!({ "kind": "connection" })))
    }

    async fn append_click_event(&self, _event: ClickEvent) -> Result<(), AppError> {
        Err(AppError::store("Database error", json!({ "kind": "connection" })))
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        self.inner.delete(slug).await
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        self.inner.list_by_owner(owner, offset, limit).await
    }

    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError> {
        self.inner.count_by_owner(owner).await
    }

    async fn health_check(&self) -> bool {
        true
    }
}
