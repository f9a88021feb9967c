//! Background worker draining the click queue.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{info, warn};

use crate::application::services::ClickRecorder;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Queue outcome of a redirect's click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// The queue was full or closed; the click is lost.
    Dropped,
}

/// Hands `event` to the worker without waiting.
///
/// A full or closed queue drops the click with a warning and bumps the
/// `clicks_dropped_total` metric.
pub fn enqueue_click(sender: &mpsc::Sender<ClickEvent>, event: ClickEvent) -> Enqueued {
    match sender.try_send(event) {
        Ok(()) => Enqueued::Queued,
        Err(mpsc::error::TrySendError::Full(ev)) => {
            warn!(code = %ev.code, "Click queue full, dropping click");
            metrics::counter!("clicks_dropped_total", "reason" => "full").increment(1);
            Enqueued::Dropped
        }
        Err(mpsc::error::TrySendError::Closed(ev)) => {
            warn!(code = %ev.code, "Click queue closed, dropping click");
            metrics::counter!("clicks_dropped_total", "reason" => "closed").increment(1);
            Enqueued::Dropped
        }
    }
}

/// Drains the click queue until every sender is dropped.
///
/// Each event is recorded on its own task; at most `concurrency` events are
/// in flight at once. Events are not ordered relative to each other.
pub async fn run_click_worker<C, L>(
    mut rx: mpsc::Receiver<ClickEvent>,
    recorder: Arc<ClickRecorder<C, L>>,
    concurrency: usize,
) where
    C: ClickRepository + 'static,
    L: LinkRepository + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let recorder = recorder.clone();
        tokio::spawn(async move {
            recorder.record(event).await;
            drop(permit);
        });
    }

    info!("Click queue closed, worker stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Click;
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::infrastructure::geo::LocalOnlyLocator;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn event(code: &str) -> ClickEvent {
        ClickEvent::new(code.to_string(), None, None, None, Utc::now())
    }

    #[tokio::test]
    async fn test_enqueue_reports_dropped_when_full() {
        let (tx, _rx) = mpsc::channel(1);

        assert_eq!(enqueue_click(&tx, event("a")), Enqueued::Queued);
        assert_eq!(enqueue_click(&tx, event("b")), Enqueued::Dropped);
    }

    #[tokio::test]
    async fn test_enqueue_reports_dropped_when_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        assert_eq!(enqueue_click(&tx, event("a")), Enqueued::Dropped);
    }

    #[tokio::test]
    async fn test_worker_records_every_event() {
        let logged = Arc::new(AtomicUsize::new(0));
        let counted = Arc::new(AtomicUsize::new(0));

        let mut clicks = MockClickRepository::new();
        let logged_c = logged.clone();
        clicks.expect_record_click().times(5).returning(move |c| {
            logged_c.fetch_add(1, Ordering::SeqCst);
            Ok(Click {
                id: 1,
                link_code: c.link_code,
                client_address: c.client_address,
                user_agent: c.user_agent,
                referrer: c.referrer,
                country: c.country,
                city: c.city,
                observed_at: c.observed_at,
            })
        });

        let mut links = MockLinkRepository::new();
        let counted_c = counted.clone();
        links.expect_increment_clicks().times(5).returning(move |_| {
            counted_c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let recorder = Arc::new(ClickRecorder::new(
            Arc::new(clicks),
            Arc::new(links),
            Arc::new(LocalOnlyLocator),
            Duration::from_secs(2),
        ));

        let (tx, rx) = mpsc::channel(16);
        let worker = tokio::spawn(run_click_worker(rx, recorder, 2));

        for i in 0..5 {
            enqueue_click(&tx, event(&format!("code{i}")));
        }
        drop(tx);
        worker.await.unwrap();

        for _ in 0..100 {
            if logged.load(Ordering::SeqCst) == 5 && counted.load(Ordering::SeqCst) == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(logged.load(Ordering::SeqCst), 5);
        assert_eq!(counted.load(Ordering::SeqCst), 5);
    }
}
