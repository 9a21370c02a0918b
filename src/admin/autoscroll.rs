//! Edge auto-scroll while dragging inside the scrollable page list.
//!
//! While the pointer sits within `margin` of the container viewport's top or
//! bottom edge, the container scrolls toward that edge by `step` every
//! `tick`, until the pointer leaves the margin or the drag ends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::AdminSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Scroll state of the list container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top edge of the visible area, in pointer coordinates.
    pub top: f64,
    pub height: f64,
    pub scroll_top: f64,
    /// Maximum value `scroll_top` can reach.
    pub max_scroll: f64,
}

impl Viewport {
    /// Scroll by `delta`, clamped to `[0, max_scroll]`. Returns the applied delta.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        let next = (self.scroll_top + delta).clamp(0.0, self.max_scroll.max(0.0));
        let applied = next - self.scroll_top;
        self.scroll_top = next;
        applied
    }
}

/// Anything that can report and change its scroll position.
pub trait ScrollSurface: Send {
    fn viewport(&self) -> Viewport;
    fn scroll_by(&mut self, delta: f64) -> f64;
}

impl ScrollSurface for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }

    fn scroll_by(&mut self, delta: f64) -> f64 {
        Viewport::scroll_by(self, delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoScrollSettings {
    pub margin: f64,
    pub step: f64,
    pub tick: Duration,
}

impl Default for AutoScrollSettings {
    fn default() -> Self {
        Self::from(&AdminSection::default())
    }
}

impl From<&AdminSection> for AutoScrollSettings {
    fn from(admin: &AdminSection) -> Self {
        Self {
            margin: admin.autoscroll_margin,
            step: admin.autoscroll_step,
            tick: Duration::from_millis(admin.autoscroll_tick_ms),
        }
    }
}

impl AutoScrollSettings {
    /// Direction to scroll for a pointer at `pointer_y`, if any.
    pub fn direction_for(&self, pointer_y: f64, viewport: &Viewport) -> Option<ScrollDirection> {
        let bottom = viewport.top + viewport.height;
        if pointer_y < viewport.top || pointer_y > bottom {
            return None;
        }
        if pointer_y - viewport.top < self.margin {
            Some(ScrollDirection::Up)
        } else if bottom - pointer_y < self.margin {
            Some(ScrollDirection::Down)
        } else {
            None
        }
    }

    pub fn delta(&self, direction: ScrollDirection) -> f64 {
        match direction {
            ScrollDirection::Up => -self.step,
            ScrollDirection::Down => self.step,
        }
    }
}

/// Drives a `ScrollSurface` on a timer while a direction is set.
pub struct AutoScroller<S: ScrollSurface + ?Sized + 'static> {
    settings: AutoScrollSettings,
    surface: Arc<Mutex<S>>,
    direction_tx: watch::Sender<Option<ScrollDirection>>,
    task: JoinHandle<()>,
}

impl<S: ScrollSurface + ?Sized + 'static> AutoScroller<S> {
    pub fn start(settings: AutoScrollSettings, surface: Arc<Mutex<S>>) -> Self {
        let (direction_tx, direction_rx) = watch::channel(None);
        let task = tokio::spawn(run_scroll_loop(settings, surface.clone(), direction_rx));
        Self {
            settings,
            surface,
            direction_tx,
            task,
        }
    }

    /// Feed a pointer position during a drag.
    pub fn pointer_moved(&self, pointer_y: f64) -> Option<ScrollDirection> {
        let viewport = match self.surface.lock() {
            Ok(surface) => surface.viewport(),
            Err(_) => return None,
        };
        let direction = self.settings.direction_for(pointer_y, &viewport);
        self.direction_tx.send_if_modified(|current| {
            if *current == direction {
                false
            } else {
                *current = direction;
                true
            }
        });
        direction
    }

    /// The drag ended; stop scrolling.
    pub fn stop(&self) {
        self.direction_tx.send_replace(None);
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        *self.direction_tx.borrow()
    }

    pub fn dispose(self) {
        self.task.abort();
    }
}

impl<S: ScrollSurface + ?Sized + 'static> Drop for AutoScroller<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_scroll_loop<S: ScrollSurface + ?Sized>(
    settings: AutoScrollSettings,
    surface: Arc<Mutex<S>>,
    mut direction_rx: watch::Receiver<Option<ScrollDirection>>,
) {
    loop {
        let direction = *direction_rx.borrow_and_update();
        let Some(direction) = direction else {
            if direction_rx.changed().await.is_err() {
                return;
            }
            continue;
        };

        let mut ticker = tokio::time::interval_at(Instant::now() + settings.tick, settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Clamped at the ends of the scroll range.
                    match surface.lock() {
                        Ok(mut s) => {
                            s.scroll_by(settings.delta(direction));
                        }
                        Err(_) => return,
                    }
                }
                changed = direction_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}
