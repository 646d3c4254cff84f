//! Background worker that persists queued click events.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::visit::VisitRecorder;

/// Drains the click queue, recording up to `concurrency` events at a time.
///
/// Failures are logged and counted; they never reach the request that produced the event.
/// Returns once every sender is dropped and all in-flight writes have finished.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    recorder: Arc<dyn VisitRecorder>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let recorder = recorder.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let slug = event.slug.clone();

            match recorder.record_visit(event).await {
                Ok(()) => {
                    metrics::counter!("shortlink_clicks_recorded_total").increment(1);
                    debug!(slug = %slug, "Click recorded");
                }
                Err(e) => {
                    metrics::counter!("shortlink_clicks_failed_total").increment(1);
                    warn!(slug = %slug, error = %e, "Failed to record click");
                }
            }
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Click worker stopped");
}
