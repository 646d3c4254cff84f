//! The "record visit" capability used by the redirect path.
//!
//! The resolver only knows [`VisitRecorder`]. What a recorded visit means in storage is decided
//! by the implementation:
//!
//! - [`StoreVisitRecorder`] writes to the link store, as a counter increment, an appended click
//!   row, or both ([`ClickAccounting`]), retrying each write with jittered backoff.
//! - [`QueuedVisitRecorder`] hands the event to a bounded channel without waiting; the
//!   background worker ([`crate::domain::click_worker::run_click_worker`]) drives a
//!   [`StoreVisitRecorder`] from the other end.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::debug;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Records one served redirect.
///
/// Implementations handed to the resolver must return promptly: the redirect waits for
/// `record_visit` to return, never for the underlying write to finish.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRecorder: Send + Sync {
    async fn record_visit(&self, event: ClickEvent) -> Result<(), AppError>;
}

/// Which writes a recorded visit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickAccounting {
    /// Increment `click_count` on the link only.
    Counter,
    /// Append a click row only.
    Events,
    /// Both of the above.
    #[default]
    Both,
}

impl ClickAccounting {
    fn counts(self) -> bool {
        matches!(self, Self::Counter | Self::Both)
    }

    fn appends(self) -> bool {
        matches!(self, Self::Events | Self::Both)
    }
}

impl FromStr for ClickAccounting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(Self::Counter),
            "events" => Ok(Self::Events),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "expected 'counter', 'events' or 'both', got '{other}'"
            )),
        }
    }
}

/// Writes visits straight to the link store.
pub struct StoreVisitRecorder {
    link_repository: Arc<dyn LinkRepository>,
    accounting: ClickAccounting,
    retries: usize,
}

impl StoreVisitRecorder {
    /// Creates a recorder retrying each failed write up to `retries` times.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        accounting: ClickAccounting,
        retries: usize,
    ) -> Self {
        Self {
            link_repository,
            accounting,
            retries,
        }
    }

    fn backoff(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_secs(1))
            .map(jitter)
            .take(self.retries)
    }
}

#[async_trait]
impl VisitRecorder for StoreVisitRecorder {
    /// Runs the configured writes. Each write is retried on its own, so a failed append never
    /// repeats an increment that already succeeded.
    ///
    /// When both writes are configured the append is attempted even if the increment failed;
    /// the first error is returned.
    async fn record_visit(&self, event: ClickEvent) -> Result<(), AppError> {
        let repo: &dyn LinkRepository = self.link_repository.as_ref();
        let mut first_error = None;

        if self.accounting.counts() {
            let slug = event.slug.as_str();
            match Retry::start(self.backoff(), move || repo.increment_clicks(slug)).await {
                Ok(true) => {}
                Ok(false) => debug!(slug, "Link vanished before its click was counted"),
                Err(e) => first_error = Some(e),
            }
        }

        if self.accounting.appends() {
            let append = Retry::start(self.backoff(), move || {
                repo.append_click_event(event.clone())
            })
            .await;
            if let Err(e) = append {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Non-blocking front for the click worker.
///
/// `record_visit` is a `try_send`: a full or closed queue drops the visit and reports it.
#[derive(Clone)]
pub struct QueuedVisitRecorder {
    sender: mpsc::Sender<ClickEvent>,
}

impl QueuedVisitRecorder {
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl VisitRecorder for QueuedVisitRecorder {
    async fn record_visit(&self, event: ClickEvent) -> Result<(), AppError> {
        self.sender.try_send(event).map_err(|e| {
            metrics::counter!("shortlink_clicks_dropped_total").increment(1);
            let reason = match e {
                TrySendError::Full(_) => "full",
                TrySendError::Closed(_) => "closed",
            };
            AppError::store("Click queue rejected the event", json!({ "queue": reason }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    fn recorder(mock: MockLinkRepository, accounting: ClickAccounting) -> StoreVisitRecorder {
        StoreVisitRecorder::new(Arc::new(mock), accounting, 2)
    }

    #[test]
    fn test_click_accounting_from_str() {
        assert_eq!(
            "counter".parse::<ClickAccounting>(),
            Ok(ClickAccounting::Counter)
        );
        assert_eq!(
            "EVENTS".parse::<ClickAccounting>(),
            Ok(ClickAccounting::Events)
        );
        assert_eq!(
            " both ".parse::<ClickAccounting>(),
            Ok(ClickAccounting::Both)
        );
        assert!("sometimes".parse::<ClickAccounting>().is_err());
    }

    #[tokio::test]
    async fn test_counter_mode_only_increments() {
        let mut mock = MockLinkRepository::new();
        mock.expect_increment_clicks()
            .withf(|slug| slug == "abc123")
            .times(1)
            .returning(|_| Ok(true));
        mock.expect_append_click_event().times(0);

        let result = recorder(mock, ClickAccounting::Counter)
            .record_visit(ClickEvent::new("abc123", None))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_events_mode_only_appends() {
        let mut mock = MockLinkRepository::new();
        mock.expect_increment_clicks().times(0);
        mock.expect_append_click_event()
            .withf(|event| event.slug == "abc123" && event.country == "NL")
            .times(1)
            .returning(|_| Ok(()));

        let result = recorder(mock, ClickAccounting::Events)
            .record_visit(ClickEvent::new("abc123", Some("NL")))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failed_write_is_retried() {
        let mut mock = MockLinkRepository::new();
        let mut calls = 0;
        mock.expect_increment_clicks().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(AppError::store("Database error", json!({})))
            } else {
                Ok(true)
            }
        });

        let result = recorder(mock, ClickAccounting::Counter)
            .record_visit(ClickEvent::new("abc123", None))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failed_increment_still_appends() {
        let mut mock = MockLinkRepository::new();
        mock.expect_increment_clicks()
            .times(3)
            .returning(|_| Err(AppError::store("Database error", json!({}))));
        mock.expect_append_click_event()
            .times(1)
            .returning(|_| Ok(()));

        let result = recorder(mock, ClickAccounting::Both)
            .record_visit(ClickEvent::new("abc123", None))
            .await;

        assert!(matches!(result, Err(AppError::Store { .. })));
    }

    #[tokio::test]
    async fn test_vanished_link_is_not_an_error() {
        let mut mock = MockLinkRepository::new();
        mock.expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(false));

        let result = recorder(mock, ClickAccounting::Counter)
            .record_visit(ClickEvent::new("gone", None))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_queued_recorder_sends_without_waiting() {
        let (tx, mut rx) = mpsc::channel(1);
        let recorder = QueuedVisitRecorder::new(tx);

        recorder
            .record_visit(ClickEvent::new("abc123", Some("US")))
            .await
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.slug, "abc123");
        assert_eq!(event.country, "US");
    }

    #[tokio::test]
    async fn test_queued_recorder_reports_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let recorder = QueuedVisitRecorder::new(tx);

        recorder
            .record_visit(ClickEvent::new("first", None))
            .await
            .unwrap();
        let result = recorder.record_visit(ClickEvent::new("second", None)).await;

        assert!(matches!(result, Err(AppError::Store { .. })));
    }

    #[tokio::test]
    async fn test_queued_recorder_reports_closed_queue() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let recorder = QueuedVisitRecorder::new(tx);

        let result = recorder.record_visit(ClickEvent::new("abc123", None)).await;

        assert!(matches!(result, Err(AppError::Store { .. })));
    }
}
