//! Timer-driven carousel task.
//!
//! Owns a `CarouselEngine`, the content cache and three timers (slide
//! advance, full data refresh, clock). Displays observe it through a
//! broadcast stream of `CarouselEvent`s and drive it with `CarouselCommand`s.

use std::sync::Arc;
use std::time::Duration;

use pdashboard_common::{PageDescriptor, PageId};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::cache::ContentCache;
use super::engine::{CarouselEngine, CarouselState};
use crate::config::DashboardConfig;
use crate::registry::PageRegistry;
use crate::render::{ContentRequest, RenderRegistry, html};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselSettings {
    pub interval: Duration,
    pub refresh: Duration,
    pub clock: Duration,
    /// Begin paused, as if the display had already reported itself hidden.
    pub start_hidden: bool,
}

impl From<&DashboardConfig> for CarouselSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            interval: config.slide_interval(),
            refresh: config.refresh_interval(),
            clock: config.clock_interval(),
            start_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselCommand {
    Jump(usize),
    Visibility { hidden: bool },
    RefreshNow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShownSlide {
    pub index: usize,
    pub total: usize,
    pub page_id: PageId,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    SlideShown(ShownSlide),
    /// No active pages to show.
    Idle,
    Clock { date: String, time: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselStatus {
    pub state: CarouselState,
    pub total: usize,
    pub slide: Option<ShownSlide>,
}

impl Default for CarouselStatus {
    fn default() -> Self {
        Self {
            state: CarouselState::Idle,
            total: 0,
            slide: None,
        }
    }
}

pub struct CarouselHandle {
    cmd_tx: mpsc::UnboundedSender<CarouselCommand>,
    events: broadcast::Sender<CarouselEvent>,
    status: watch::Receiver<CarouselStatus>,
    task: JoinHandle<()>,
}

impl CarouselHandle {
    /// Spawn the carousel over `pages` and show the first active slide.
    pub fn start(
        registry: Arc<dyn PageRegistry>,
        pages: &[PageDescriptor],
        settings: CarouselSettings,
    ) -> Self {
        Self::start_with_events(registry, pages, settings, event_channel())
    }

    /// Like `start`, publishing on an existing channel so subscribers
    /// survive a carousel being replaced.
    pub fn start_with_events(
        registry: Arc<dyn PageRegistry>,
        pages: &[PageDescriptor],
        settings: CarouselSettings,
        events: broadcast::Sender<CarouselEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(CarouselStatus::default());

        let runner = CarouselRunner {
            registry,
            engine: CarouselEngine::new(pages),
            renderers: RenderRegistry::default(),
            cache: ContentCache::default(),
            events: events.clone(),
            status_tx,
        };
        info!(slides = runner.engine.total(), "starting carousel");
        let task = tokio::spawn(runner.run(settings, cmd_rx));

        Self {
            cmd_tx,
            events,
            status,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarouselEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> CarouselStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<CarouselStatus> {
        self.status.clone()
    }

    pub fn send(&self, command: CarouselCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn jump(&self, index: usize) {
        self.send(CarouselCommand::Jump(index));
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.send(CarouselCommand::Visibility { hidden });
    }

    /// Stop every timer of this carousel.
    pub fn dispose(self) {
        self.task.abort();
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn event_channel() -> broadcast::Sender<CarouselEvent> {
    broadcast::channel(EVENT_CAPACITY).0
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Ticks `period` apart, first one `period` from now. A tick missed while
/// a slow fetch was running is not caught up in a burst.
fn every(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

struct CarouselRunner {
    registry: Arc<dyn PageRegistry>,
    engine: CarouselEngine,
    renderers: RenderRegistry,
    cache: ContentCache,
    events: broadcast::Sender<CarouselEvent>,
    status_tx: watch::Sender<CarouselStatus>,
}

impl CarouselRunner {
    async fn run(mut self, settings: CarouselSettings, mut cmd_rx: mpsc::UnboundedReceiver<CarouselCommand>) {
        let mut advance = if settings.start_hidden && self.engine.start().is_some() {
            self.engine.hide();
            self.publish_status(None);
            debug!("display hidden; carousel starts paused");
            None
        } else {
            self.restart(settings.interval).await
        };
        let mut refresh = every(settings.refresh);
        let mut clock = tokio::time::interval(settings.clock);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick(&mut advance) => {
                    if self.engine.advance().is_some() {
                        self.show_current().await;
                        // Each slide stays up a full interval once shown.
                        if let Some(advance) = advance.as_mut() {
                            advance.reset();
                        }
                    }
                }
                _ = refresh.tick() => self.refresh_all().await,
                _ = clock.tick() => self.emit_clock(),
                cmd = cmd_rx.recv() => match cmd {
                    Some(CarouselCommand::Jump(index)) => {
                        // The advance timer keeps its phase.
                        if self.engine.jump(index).is_some() {
                            self.show_current().await;
                        } else {
                            debug!(index, "ignoring jump outside the slide range");
                        }
                    }
                    Some(CarouselCommand::Visibility { hidden: true }) => {
                        if self.engine.hide() {
                            advance = None;
                            self.publish_status(None);
                            debug!("display hidden; carousel paused");
                        }
                    }
                    Some(CarouselCommand::Visibility { hidden: false }) => {
                        if self.engine.state() == CarouselState::Paused {
                            advance = self.restart(settings.interval).await;
                        }
                    }
                    Some(CarouselCommand::RefreshNow) => self.refresh_all().await,
                    None => return,
                },
            }
        }
    }

    /// Show slide 0 and return a fresh advance timer, or go idle.
    async fn restart(&mut self, interval: Duration) -> Option<Interval> {
        match self.engine.start() {
            Some(_) => {
                self.show_current().await;
                Some(every(interval))
            }
            None => {
                self.publish_status(None);
                let _ = self.events.send(CarouselEvent::Idle);
                None
            }
        }
    }

    async fn show_current(&mut self) {
        let Some(index) = self.engine.current() else {
            return;
        };
        let Some(page) = self.engine.slides().get(index).cloned() else {
            return;
        };
        let html = self.slide_html(&page).await;
        let slide = ShownSlide {
            index,
            total: self.engine.total(),
            page_id: page.id,
            title: page.title.clone(),
            html,
        };
        debug!(index, page = %page.id, "slide shown");
        self.publish_status(Some(slide.clone()));
        let _ = self.events.send(CarouselEvent::SlideShown(slide));
    }

    /// Render a slide, loading its content on first activation.
    async fn slide_html(&mut self, page: &PageDescriptor) -> String {
        let request = match ContentRequest::for_page(page) {
            Ok(request) => request,
            Err(e) => return html::error_block(&e.to_string()),
        };
        let key = request.key();
        if !self.cache.contains(&key) {
            match request.fetch(self.registry.as_ref()).await {
                Ok(data) => self.cache.insert(key.clone(), data),
                Err(e) => {
                    warn!(page = %page.id, error = %e, "failed to load slide content");
                    return html::error_block(&e.to_string());
                }
            }
        }
        match self.cache.get(&key) {
            Some(data) => self.renderers.render_or_error(page, data),
            None => html::error_block("content unavailable"),
        }
    }

    /// Refetch every source the slides use. Failures keep the cached entry.
    async fn refresh_all(&mut self) {
        let mut requests: Vec<ContentRequest> = Vec::new();
        for page in self.engine.slides() {
            if let Ok(request) = ContentRequest::for_page(page)
                && !requests.iter().any(|r| r.key() == request.key())
            {
                requests.push(request);
            }
        }

        debug!(sources = requests.len(), "refreshing slide content");
        for request in requests {
            match request.fetch(self.registry.as_ref()).await {
                Ok(data) => self.cache.insert(request.key(), data),
                Err(e) => warn!(source = %request.key(), error = %e, "refresh failed; keeping cached content"),
            }
        }

        if self.engine.state() == CarouselState::Running {
            self.show_current().await;
        }
    }

    fn emit_clock(&self) {
        let now = chrono::Local::now();
        let _ = self.events.send(CarouselEvent::Clock {
            date: now.format("%A, %d %B %Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        });
    }

    fn publish_status(&self, slide: Option<ShownSlide>) {
        let state = self.engine.state();
        let total = self.engine.total();
        self.status_tx.send_modify(|status| {
            status.state = state;
            status.total = total;
            if slide.is_some() || state == CarouselState::Idle {
                status.slide = slide;
            }
        });
    }
}
