//! Debounced persistence of the page order.
//!
//! Reorders tend to arrive in bursts (several arrow clicks, a drag followed by
//! a correction). `OrderSaver` waits for a quiet period and then saves only
//! the latest order. Saves run one at a time in the order they were issued,
//! so the last move always determines what the server stores.

use std::sync::Arc;
use std::time::Duration;

use pdashboard_common::PageId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::DashboardError;
use crate::registry::PageRegistry;

#[derive(Debug)]
enum SaveCommand {
    Schedule(Request),
    SaveNow(Request),
}

#[derive(Debug)]
struct Request {
    generation: u64,
    order: Vec<PageId>,
}

/// Result of one `save_order` call.
#[derive(Debug)]
pub struct SaveOutcome {
    /// Which handed-over order this was; later orders have higher numbers.
    pub generation: u64,
    pub order: Vec<PageId>,
    pub result: Result<(), DashboardError>,
}

pub struct OrderSaver {
    cmd_tx: mpsc::UnboundedSender<SaveCommand>,
    outcome_rx: mpsc::UnboundedReceiver<SaveOutcome>,
    issued: u64,
    task: JoinHandle<()>,
}

impl OrderSaver {
    pub fn start(registry: Arc<dyn PageRegistry>, debounce: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_saver(registry, debounce, cmd_rx, outcome_tx));
        Self {
            cmd_tx,
            outcome_rx,
            issued: 0,
            task,
        }
    }

    /// Save `order` once no newer order arrives within the debounce window.
    pub fn schedule(&mut self, order: Vec<PageId>) {
        let request = self.request(order);
        let _ = self.cmd_tx.send(SaveCommand::Schedule(request));
    }

    /// Save `order` immediately, superseding anything pending.
    pub fn save_now(&mut self, order: Vec<PageId>) {
        let request = self.request(order);
        let _ = self.cmd_tx.send(SaveCommand::SaveNow(request));
    }

    fn request(&mut self, order: Vec<PageId>) -> Request {
        self.issued += 1;
        Request {
            generation: self.issued,
            order,
        }
    }

    /// Whether `outcome` is for the most recent order handed to the saver.
    /// Anything older has already been superseded.
    pub fn is_latest(&self, outcome: &SaveOutcome) -> bool {
        outcome.generation == self.issued
    }

    pub async fn next_outcome(&mut self) -> Option<SaveOutcome> {
        self.outcome_rx.recv().await
    }

    pub fn try_outcome(&mut self) -> Option<SaveOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    pub fn dispose(self) {
        self.task.abort();
    }
}

impl Drop for OrderSaver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_saver(
    registry: Arc<dyn PageRegistry>,
    debounce: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<SaveCommand>,
    outcome_tx: mpsc::UnboundedSender<SaveOutcome>,
) {
    let mut pending: Option<Request> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SaveCommand::Schedule(request)) => {
                    pending = Some(request);
                    deadline = Instant::now() + debounce;
                }
                Some(SaveCommand::SaveNow(request)) => {
                    pending = None;
                    save(registry.as_ref(), request, &outcome_tx).await;
                }
                None => {
                    if let Some(request) = pending.take() {
                        save(registry.as_ref(), request, &outcome_tx).await;
                    }
                    return;
                }
            },
            _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                if let Some(request) = pending.take() {
                    save(registry.as_ref(), request, &outcome_tx).await;
                }
            }
        }
    }
}

async fn save(
    registry: &dyn PageRegistry,
    request: Request,
    outcome_tx: &mpsc::UnboundedSender<SaveOutcome>,
) {
    let Request { generation, order } = request;
    debug!(pages = order.len(), generation, "saving page order");
    let result = registry.save_order(&order).await;
    if let Err(e) = &result {
        warn!(error = %e, "failed to save page order");
    }
    let _ = outcome_tx.send(SaveOutcome {
        generation,
        order,
        result,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRegistry, ids, pages};

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced_into_latest_order() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(3)));
        let mut saver = OrderSaver::start(registry.clone(), Duration::from_millis(400));

        saver.schedule(ids(&[2, 1, 3]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        saver.schedule(ids(&[2, 3, 1]));

        let outcome = saver.next_outcome().await.unwrap();
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.order, ids(&[2, 3, 1]));
        assert!(saver.is_latest(&outcome));
        assert_eq!(registry.saved_orders(), vec![ids(&[2, 3, 1])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_is_stale_once_a_newer_order_is_handed_over() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(3)));
        let mut saver = OrderSaver::start(registry.clone(), Duration::from_millis(10));

        saver.schedule(ids(&[2, 1, 3]));
        let first = saver.next_outcome().await.unwrap();
        assert!(saver.is_latest(&first));

        saver.schedule(ids(&[3, 2, 1]));
        assert!(!saver.is_latest(&first));
        let second = saver.next_outcome().await.unwrap();
        assert!(second.generation > first.generation);
        assert!(saver.is_latest(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_skips_debounce_and_drops_pending() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(3)));
        let mut saver = OrderSaver::start(registry.clone(), Duration::from_secs(60));

        saver.schedule(ids(&[3, 2, 1]));
        saver.save_now(ids(&[1, 3, 2]));

        let outcome = saver.next_outcome().await.unwrap();
        assert_eq!(outcome.order, ids(&[1, 3, 2]));
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(registry.saved_orders(), vec![ids(&[1, 3, 2])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(2)));
        registry.set(|s| s.fail_save = true);
        let mut saver = OrderSaver::start(registry.clone(), Duration::from_millis(10));

        saver.schedule(ids(&[2, 1]));
        let outcome = saver.next_outcome().await.unwrap();
        assert!(matches!(
            outcome.result,
            Err(DashboardError::Server { status: 500, .. })
        ));
    }
}
