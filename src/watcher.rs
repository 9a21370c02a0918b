//! Config-change watcher.
//!
//! Polls the page list and compares a hash of each page's `(id, active,
//! order)` with the previous poll. A change means the kiosk is showing a
//! stale slide set and must be rebuilt. The same loop keeps the displayed
//! version string current.

use std::sync::Arc;
use std::time::Duration;

use pdashboard_common::{PageDescriptor, PageId};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::registry::PageRegistry;

#[derive(Serialize)]
struct HashEntry {
    id: PageId,
    active: bool,
    order: u32,
}

/// SHA-256 (hex) over the `(id, active, order)` sequence of `pages`, in list order.
pub fn config_hash(pages: &[PageDescriptor]) -> String {
    let entries: Vec<HashEntry> = pages
        .iter()
        .map(|p| HashEntry {
            id: p.id,
            active: p.active,
            order: p.order,
        })
        .collect();
    // Serializing plain structs of numbers and bools cannot fail.
    let json = serde_json::to_vec(&entries).unwrap_or_default();
    hex::encode(Sha256::digest(&json))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// First observation; stored without action.
    Baseline,
    Unchanged,
    Changed,
}

#[derive(Debug, Default)]
pub struct ConfigWatcher {
    last: Option<String>,
}

impl ConfigWatcher {
    pub fn last_hash(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn observe(&mut self, pages: &[PageDescriptor]) -> WatchOutcome {
        let hash = config_hash(pages);
        let outcome = match &self.last {
            None => WatchOutcome::Baseline,
            Some(prev) if *prev == hash => WatchOutcome::Unchanged,
            Some(_) => WatchOutcome::Changed,
        };
        self.last = Some(hash);
        outcome
    }

    /// Fetch and observe. Fetch errors are logged and leave the stored hash as is.
    pub async fn check(&mut self, registry: &dyn PageRegistry) -> Option<WatchOutcome> {
        match registry.load_pages().await {
            Ok(pages) => Some(self.observe(&pages)),
            Err(e) => {
                warn!(error = %e, "config check failed");
                None
            }
        }
    }
}

/// Display form of a backend version.
pub fn version_label(version: &str) -> String {
    format!("v{}", version)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    Reload,
    Version(String),
}

pub struct WatcherHandle {
    events: mpsc::UnboundedReceiver<WatcherEvent>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Spawn the poll loop. The first check runs immediately.
    pub fn start(registry: Arc<dyn PageRegistry>, interval: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_watcher(registry, interval, tx));
        Self { events, task }
    }

    pub async fn next_event(&mut self) -> Option<WatcherEvent> {
        self.events.recv().await
    }

    pub fn dispose(self) {
        self.task.abort();
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_watcher(
    registry: Arc<dyn PageRegistry>,
    interval: Duration,
    tx: mpsc::UnboundedSender<WatcherEvent>,
) {
    let mut watcher = ConfigWatcher::default();
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        match watcher.check(registry.as_ref()).await {
            Some(WatchOutcome::Changed) => {
                info!("page configuration changed; requesting reload");
                if tx.send(WatcherEvent::Reload).is_err() {
                    return;
                }
            }
            Some(outcome) => debug!(?outcome, "config checked"),
            None => {}
        }

        match registry.fetch_version().await {
            Ok(version) => {
                if tx.send(WatcherEvent::Version(version_label(&version))).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "failed to fetch version"),
        }
    }
}
