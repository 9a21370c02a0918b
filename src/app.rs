//! Application context: the configured backend client, the notifier and the
//! long-running kiosk session built from them.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::admin::AdminPanel;
use crate::carousel::{CarouselCommand, CarouselEvent, CarouselHandle, CarouselSettings, event_channel};
use crate::config::DashboardConfig;
use crate::errors::DashboardError;
use crate::notify::Notifier;
use crate::registry::{HttpRegistry, PageRegistry};
use crate::status::{DataStatus, probe_data_status};
use crate::watcher::{WatcherEvent, WatcherHandle};

#[derive(Clone)]
pub struct AppContext {
    config: DashboardConfig,
    registry: Arc<dyn PageRegistry>,
    notifier: Notifier,
}

impl AppContext {
    /// Context talking to the backend named in `config`.
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let registry = HttpRegistry::new(&config.api.base_url, config.api_timeout())?;
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    pub fn with_registry(config: DashboardConfig, registry: Arc<dyn PageRegistry>) -> Self {
        let notifier = Notifier::new(config.toast_dismiss());
        Self {
            config,
            registry,
            notifier,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<dyn PageRegistry> {
        self.registry.clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn admin_panel(&self) -> Result<AdminPanel, DashboardError> {
        AdminPanel::load(self.registry.clone(), &self.config, self.notifier.clone()).await
    }

    pub async fn data_status(&self) -> DataStatus {
        probe_data_status(self.registry.as_ref()).await
    }

    /// Load the pages and start the carousel and the config watcher.
    pub async fn start_kiosk(&self) -> Result<KioskSession, DashboardError> {
        let pages = self.registry.load_pages().await?;
        let events = event_channel();
        let carousel = CarouselHandle::start_with_events(
            self.registry.clone(),
            &pages,
            self.carousel_settings(),
            events.clone(),
        );
        let watcher = WatcherHandle::start(self.registry.clone(), self.config.watch_interval());
        Ok(KioskSession {
            context: self.clone(),
            events,
            carousel,
            watcher,
            hidden: false,
        })
    }

    fn carousel_settings(&self) -> CarouselSettings {
        CarouselSettings::from(&self.config)
    }
}

/// A running carousel plus the watcher that decides when to rebuild it.
pub struct KioskSession {
    context: AppContext,
    events: broadcast::Sender<CarouselEvent>,
    carousel: CarouselHandle,
    watcher: WatcherHandle,
    /// Last visibility the display reported; survives a reload.
    hidden: bool,
}

impl KioskSession {
    pub fn carousel(&self) -> &CarouselHandle {
        &self.carousel
    }

    /// Forward display input to the current carousel.
    pub fn send(&mut self, command: CarouselCommand) {
        if let CarouselCommand::Visibility { hidden } = command {
            self.hidden = hidden;
        }
        self.carousel.send(command);
    }

    /// Events of the current carousel and of every one that replaces it.
    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    pub async fn next_watcher_event(&mut self) -> Option<WatcherEvent> {
        self.watcher.next_event().await
    }

    /// Rebuild the carousel from a fresh page list. On failure the current
    /// carousel keeps running.
    pub async fn reload(&mut self) -> bool {
        match self.context.registry.load_pages().await {
            Ok(pages) => {
                let settings = CarouselSettings {
                    start_hidden: self.hidden,
                    ..self.context.carousel_settings()
                };
                let fresh = CarouselHandle::start_with_events(
                    self.context.registry.clone(),
                    &pages,
                    settings,
                    self.events.clone(),
                );
                let stale = std::mem::replace(&mut self.carousel, fresh);
                stale.dispose();
                info!(pages = pages.len(), "kiosk reloaded");
                true
            }
            Err(e) => {
                warn!(error = %e, "reload failed; keeping current slides");
                false
            }
        }
    }

    pub fn dispose(self) {
        let Self {
            carousel,
            watcher,
            ..
        } = self;
        carousel.dispose();
        watcher.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::CarouselState;
    use crate::testing::{FakeRegistry, pages};
    use pdashboard_common::PageId;
    use std::time::Duration;

    fn context(registry: Arc<FakeRegistry>) -> AppContext {
        AppContext::with_registry(DashboardConfig::default(), registry)
    }

    #[tokio::test(start_paused = true)]
    async fn test_kiosk_reloads_after_config_change() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(2)));
        let ctx = context(registry.clone());
        let mut session = ctx.start_kiosk().await.unwrap();
        assert!(matches!(
            session.next_watcher_event().await,
            Some(WatcherEvent::Version(_))
        ));

        registry.set(|s| s.pages[1].active = false);
        assert_eq!(session.next_watcher_event().await, Some(WatcherEvent::Reload));
        let mut rx = session.subscribe();
        assert!(session.reload().await);

        loop {
            if let CarouselEvent::SlideShown(slide) = rx.recv().await.unwrap() {
                assert_eq!(slide.total, 1);
                assert_eq!(slide.page_id, PageId(1));
                break;
            }
        }
        session.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_while_hidden_stays_paused() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(2)));
        let ctx = context(registry.clone());
        let mut session = ctx.start_kiosk().await.unwrap();
        session.send(CarouselCommand::Visibility { hidden: true });

        registry.set(|s| s.pages[1].active = false);
        assert!(session.reload().await);
        let mut rx = session.subscribe();
        tokio::time::sleep(Duration::from_secs(30)).await;
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, CarouselEvent::SlideShown(_)), "{:?}", event);
        }
        assert_eq!(session.carousel().status().state, CarouselState::Paused);

        session.send(CarouselCommand::Visibility { hidden: false });
        loop {
            if let CarouselEvent::SlideShown(slide) = rx.recv().await.unwrap() {
                assert_eq!(slide.total, 1);
                break;
            }
        }
        session.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_keeps_carousel() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(3)));
        let ctx = context(registry.clone());
        let mut session = ctx.start_kiosk().await.unwrap();
        let mut rx = session.subscribe();

        registry.set(|s| s.fail_load = true);
        assert!(!session.reload().await);
        // The first carousel is still running.
        loop {
            if let CarouselEvent::SlideShown(slide) = rx.recv().await.unwrap() {
                assert_eq!(slide.total, 3);
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_start_kiosk_fails_when_backend_is_down() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(1)));
        registry.set(|s| s.fail_load = true);
        let result = context(registry).start_kiosk().await;
        assert!(matches!(result, Err(DashboardError::Network { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_panel_shares_notifier() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(2)));
        let ctx = context(registry);
        let mut panel = ctx.admin_panel().await.unwrap();
        panel.move_page(1, 0);
        panel.next_save().await;
        assert!(ctx.notifier().current().is_some());
    }
}
