//! Admin panel: the page list with reorder and enable/disable controls.
//!
//! ```text
//!  pointer / keys ──> AdminPanel ──> ReorderController (order, rows, drag state)
//!                        │      └──> ToggleController  (per-page buttons)
//!                        │
//!                        ├──> AutoScroller (edge scrolling while a drag is active)
//!                        ├──> OrderSaver (debounced save_order) ──> outcomes
//!                        └──> Notifier   (toasts)
//! ```
//!
//! Reorders are applied to the local list first and saved afterwards. If the
//! latest save fails the list is rolled back to the last order the server
//! accepted. A failure that a newer order has already superseded only raises
//! the error toast; the newer save decides what is shown.

pub mod autoscroll;
pub mod keys;
pub mod persist;
pub mod reorder;
pub mod toggle;

use std::sync::{Arc, Mutex};

use pdashboard_common::{PageDescriptor, PageId};
use tracing::{info, warn};

pub use autoscroll::{AutoScrollSettings, AutoScroller, ScrollDirection, ScrollSurface, Viewport};
pub use keys::{KeyCommand, KeyEvent};
pub use persist::{OrderSaver, SaveOutcome};
pub use reorder::{Bounds, DragOverOutcome, DropIndicator, DropPosition, PageRow, ReorderController};
pub use toggle::{ToggleControl, ToggleController, ToggleLabel};

use crate::config::DashboardConfig;
use crate::errors::{DashboardError, ToggleError};
use crate::notify::Notifier;
use crate::registry::PageRegistry;

pub const ORDER_SAVED_MESSAGE: &str = "Page order updated";
pub const ORDER_FAILED_MESSAGE: &str = "Failed to update page order";

pub struct AdminPanel {
    registry: Arc<dyn PageRegistry>,
    notifier: Notifier,
    reorder: ReorderController,
    toggles: ToggleController,
    saver: OrderSaver,
    scroll_settings: AutoScrollSettings,
    scroller: Option<AutoScroller<dyn ScrollSurface>>,
}

impl AdminPanel {
    /// Load the page list and build the panel.
    pub async fn load(
        registry: Arc<dyn PageRegistry>,
        config: &DashboardConfig,
        notifier: Notifier,
    ) -> Result<Self, DashboardError> {
        let pages = registry.load_pages().await?;
        info!(pages = pages.len(), "admin panel loaded");
        let saver = OrderSaver::start(registry.clone(), config.save_debounce());
        Ok(Self {
            toggles: ToggleController::new(&pages),
            reorder: ReorderController::new(pages),
            registry,
            notifier,
            saver,
            scroll_settings: AutoScrollSettings::from(&config.admin),
            scroller: None,
        })
    }

    /// Let drags scroll `surface`, the container holding the page list.
    pub fn attach_scroll_surface(&mut self, surface: Arc<Mutex<dyn ScrollSurface>>) {
        if let Some(previous) = self.scroller.take() {
            previous.dispose();
        }
        self.scroller = Some(AutoScroller::start(self.scroll_settings, surface));
    }

    /// Re-fetch the page list. On failure the current list is kept.
    pub async fn reload(&mut self) -> bool {
        match self.registry.load_pages().await {
            Ok(pages) => {
                self.toggles.sync(&pages);
                self.reorder.replace_pages(pages);
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to reload pages; keeping current list");
                false
            }
        }
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        self.reorder.pages()
    }

    pub fn rows(&self) -> Vec<PageRow> {
        self.reorder.rows()
    }

    pub fn toggle_control(&self, id: PageId) -> Option<&ToggleControl> {
        self.toggles.control(id)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn begin_drag(&mut self, id: PageId) -> bool {
        self.reorder.begin_drag(id)
    }

    pub fn drag_over(&mut self, target: PageId, pointer_y: f64, bounds: Bounds) -> DragOverOutcome {
        self.reorder.drag_over(target, pointer_y, bounds)
    }

    /// Pointer position during a drag, in the scroll container's
    /// coordinates. Ignored when no drag is active.
    pub fn pointer_moved(&self, pointer_y: f64) -> Option<ScrollDirection> {
        let scroller = self.scroller.as_ref()?;
        if self.reorder.dragged().is_none() {
            scroller.stop();
            return None;
        }
        scroller.pointer_moved(pointer_y)
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroller.as_ref().and_then(|s| s.direction())
    }

    fn stop_scrolling(&self) {
        if let Some(scroller) = &self.scroller {
            scroller.stop();
        }
    }

    pub fn drop_on(&mut self, target: PageId) -> bool {
        self.stop_scrolling();
        let changed = self.reorder.drop_on(target);
        self.schedule_save(changed)
    }

    pub fn end_drag(&mut self) {
        self.stop_scrolling();
        self.reorder.end_drag();
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let changed = self.reorder.move_page(from, to);
        self.schedule_save(changed)
    }

    pub fn move_up(&mut self, id: PageId) -> bool {
        let changed = self.reorder.move_up(id);
        self.schedule_save(changed)
    }

    pub fn move_down(&mut self, id: PageId) -> bool {
        let changed = self.reorder.move_down(id);
        self.schedule_save(changed)
    }

    fn schedule_save(&mut self, changed: Option<Vec<PageId>>) -> bool {
        match changed {
            Some(order) => {
                self.saver.schedule(order);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<KeyCommand> {
        let command = KeyCommand::from_event(event)?;
        match command {
            KeyCommand::SaveOrder => {
                let order = self.reorder.ids();
                self.saver.save_now(order);
            }
            KeyCommand::CancelDrag => self.end_drag(),
        }
        Some(command)
    }

    /// Wait for the next save to finish and reconcile with its result.
    pub async fn next_save(&mut self) -> Option<bool> {
        let outcome = self.saver.next_outcome().await?;
        Some(self.apply_save_outcome(outcome))
    }

    /// Reconcile any saves that already finished, without waiting.
    pub fn poll_saves(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.saver.try_outcome() {
            self.apply_save_outcome(outcome);
            applied += 1;
        }
        applied
    }

    fn apply_save_outcome(&mut self, outcome: SaveOutcome) -> bool {
        let latest = self.saver.is_latest(&outcome);
        match outcome.result {
            Ok(()) => {
                self.reorder.mark_saved(&outcome.order);
                if latest && self.reorder.show_order(&outcome.order) {
                    info!("page list realigned with saved order");
                }
                self.notifier.success(ORDER_SAVED_MESSAGE);
                true
            }
            Err(e) => {
                if latest && self.reorder.rollback() {
                    info!("page order rolled back to last saved state");
                }
                self.notifier.error(format!("{}: {}", ORDER_FAILED_MESSAGE, e));
                false
            }
        }
    }

    /// Toggle a page and reflect the confirmed state in the list.
    pub async fn toggle(&mut self, id: PageId) -> Result<bool, ToggleError> {
        let result = self.toggles.toggle(self.registry.as_ref(), id).await?;
        match result {
            Ok(page) => {
                if let Some(local) = self.reorder.page_mut(id) {
                    local.active = page.active;
                }
                let state = if page.active { "activated" } else { "deactivated" };
                self.notifier.success(format!("Page '{}' {}", page.title, state));
                Ok(true)
            }
            Err(e) => {
                self.notifier.error(format!("Failed to toggle page: {}", e));
                Ok(false)
            }
        }
    }

    pub fn dispose(self) {
        let Self {
            saver, scroller, ..
        } = self;
        saver.dispose();
        if let Some(scroller) = scroller {
            scroller.dispose();
        }
    }
}
