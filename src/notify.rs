//! Transient toast notifications.
//!
//! At most one toast is visible: showing a new one replaces the current one.
//! Each toast dismisses itself after the configured delay unless it has
//! already been replaced.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Clone)]
pub struct Notifier {
    tx: Arc<watch::Sender<Option<Toast>>>,
    next_id: Arc<AtomicU64>,
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            next_id: Arc::new(AtomicU64::new(1)),
            dismiss_after,
        }
    }

    pub fn success(&self, message: impl Into<String>) -> Toast {
        self.show(ToastLevel::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Toast {
        self.show(ToastLevel::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Toast {
        self.show(ToastLevel::Info, message)
    }

    /// Show a toast, replacing any visible one. Must be called inside a
    /// tokio runtime: the dismissal timer is a spawned task.
    pub fn show(&self, level: ToastLevel, message: impl Into<String>) -> Toast {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
        };
        self.tx.send_replace(Some(toast.clone()));

        let tx = self.tx.clone();
        let id = toast.id;
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_if_modified(|current| {
                if current.as_ref().is_some_and(|t| t.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
        });

        toast
    }

    pub fn current(&self) -> Option<Toast> {
        self.tx.borrow().clone()
    }

    pub fn dismiss(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toast_dismisses_after_delay() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        notifier.success("Page order updated");
        assert_eq!(notifier.current().unwrap().level, ToastLevel::Success);

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(notifier.current().is_some());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_replaces_and_outlives_old_timer() {
        let notifier = Notifier::new(Duration::from_millis(5000));
        notifier.error("first");
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let second = notifier.info("second");

        // The first toast's timer fires at 5000ms and must not clear the second.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(notifier.current(), Some(second));
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let notifier = Notifier::new(Duration::from_secs(5));
        let mut rx = notifier.subscribe();
        notifier.error("Failed to update page order");
        rx.changed().await.unwrap();
        let toast = rx.borrow().clone().unwrap();
        assert_eq!(toast.message, "Failed to update page order");
    }
}
