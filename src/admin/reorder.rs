//! Drag-and-drop and arrow-button reordering of the page list.
//!
//! The controller owns the ordered descriptors and exposes them as row view
//! models (one per page, tagged with the page id). Every successful move
//! renumbers the list so `order` is always the dense sequence `1..=N`, and
//! returns the new id sequence for the caller to persist.
//!
//! Only one drag can be active at a time: the drag source is a single slot.

use pdashboard_common::{PageDescriptor, PageId, sort_by_order};

/// Where the dragged row will land relative to the row under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

/// Vertical extent of a rendered row, in viewport units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// `Above` when the pointer is in the top half of the box, else `Below`.
    pub fn drop_position(&self, pointer_y: f64) -> DropPosition {
        if pointer_y < self.top + self.height / 2.0 {
            DropPosition::Above
        } else {
            DropPosition::Below
        }
    }
}

/// The insertion-point marker shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropIndicator {
    pub target: PageId,
    pub position: DropPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOverOutcome {
    /// No drag in progress, or the target is unknown or the drag source itself.
    Ignored,
    /// Same target and position as before; nothing to redraw.
    Unchanged,
    /// The indicator moved.
    Updated(DropIndicator),
}

/// What a front end draws for one page in the admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub id: PageId,
    pub title: String,
    pub page_type: String,
    pub order_label: String,
    pub active: bool,
    pub dragging: bool,
    pub indicator: Option<DropPosition>,
    pub can_move_up: bool,
    pub can_move_down: bool,
    /// Required form fields the page has left empty.
    pub missing_fields: Vec<&'static str>,
}

pub fn order_label(order: u32) -> String {
    format!("Order: {}", order)
}

#[derive(Debug, Default)]
pub struct ReorderController {
    pages: Vec<PageDescriptor>,
    dragged: Option<PageId>,
    indicator: Option<DropIndicator>,
    /// Id sequence the server last confirmed.
    confirmed: Vec<PageId>,
}

impl ReorderController {
    pub fn new(mut pages: Vec<PageDescriptor>) -> Self {
        sort_by_order(&mut pages);
        let confirmed = pages.iter().map(|p| p.id).collect();
        Self {
            pages,
            dragged: None,
            indicator: None,
            confirmed,
        }
    }

    /// Replace the list with a fresh server snapshot.
    pub fn replace_pages(&mut self, pages: Vec<PageDescriptor>) {
        *self = Self::new(pages);
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }

    pub fn confirmed(&self) -> &[PageId] {
        &self.confirmed
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn index_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn dragged(&self) -> Option<PageId> {
        self.dragged
    }

    pub fn indicator(&self) -> Option<DropIndicator> {
        self.indicator
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut PageDescriptor> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn rows(&self) -> Vec<PageRow> {
        let last = self.pages.len().saturating_sub(1);
        self.pages
            .iter()
            .enumerate()
            .map(|(index, page)| PageRow {
                id: page.id,
                title: page.title.clone(),
                page_type: page.page_type.to_string(),
                order_label: order_label(page.order),
                active: page.active,
                dragging: self.dragged == Some(page.id),
                indicator: self
                    .indicator
                    .filter(|i| i.target == page.id)
                    .map(|i| i.position),
                can_move_up: index > 0,
                can_move_down: index < last,
                missing_fields: page.missing_fields(),
            })
            .collect()
    }

    /// Mark `id` as the drag source. Unknown ids are ignored.
    pub fn begin_drag(&mut self, id: PageId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.dragged = Some(id);
        self.indicator = None;
        true
    }

    /// Recompute the insertion point for a pointer over `target`.
    ///
    /// Must be called on every pointer move: the position depends on live
    /// geometry. Repeating the same target and position is a no-op.
    pub fn drag_over(&mut self, target: PageId, pointer_y: f64, bounds: Bounds) -> DragOverOutcome {
        let Some(dragged) = self.dragged else {
            return DragOverOutcome::Ignored;
        };
        if dragged == target || self.index_of(target).is_none() {
            self.indicator = None;
            return DragOverOutcome::Ignored;
        }

        let next = DropIndicator {
            target,
            position: bounds.drop_position(pointer_y),
        };
        if self.indicator == Some(next) {
            return DragOverOutcome::Unchanged;
        }
        self.indicator = Some(next);
        DragOverOutcome::Updated(next)
    }

    /// Drop the dragged page next to `target`.
    ///
    /// Uses the last computed indicator for `target`. Without one, a page
    /// dropped on a later row lands after it and a page dropped on an
    /// earlier row lands before it. Returns the new id sequence when the
    /// list changed. The drag ends either way.
    pub fn drop_on(&mut self, target: PageId) -> Option<Vec<PageId>> {
        let dragged = self.dragged.take();
        let indicator = self.indicator.take();
        let dragged = dragged?;
        if dragged == target {
            return None;
        }

        let from = self.index_of(dragged)?;
        let to = self.index_of(target)?;
        let position = match indicator {
            Some(i) if i.target == target => i.position,
            _ if from < to => DropPosition::Below,
            _ => DropPosition::Above,
        };

        let before = self.ids();
        let page = self.pages.remove(from);
        let target_index = self.index_of(target)?;
        let insert_at = match position {
            DropPosition::Above => target_index,
            DropPosition::Below => target_index + 1,
        };
        self.pages.insert(insert_at, page);

        if self.ids() == before {
            return None;
        }
        self.renumber();
        Some(self.ids())
    }

    /// Clear drag source and indicator (drag end, Escape).
    pub fn end_drag(&mut self) {
        self.dragged = None;
        self.indicator = None;
    }

    /// Move the page at `from` to index `to` (arrow buttons, keyboard).
    /// Out-of-range indices and `from == to` are no-ops.
    pub fn move_page(&mut self, from: usize, to: usize) -> Option<Vec<PageId>> {
        let len = self.pages.len();
        if from >= len || to >= len || from == to {
            return None;
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.renumber();
        Some(self.ids())
    }

    pub fn move_up(&mut self, id: PageId) -> Option<Vec<PageId>> {
        let index = self.index_of(id)?;
        self.move_page(index, index.checked_sub(1)?)
    }

    pub fn move_down(&mut self, id: PageId) -> Option<Vec<PageId>> {
        let index = self.index_of(id)?;
        self.move_page(index, index + 1)
    }

    /// Reassign `order` to each page's 1-based position.
    pub fn renumber(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.order = index as u32 + 1;
        }
    }

    /// Record `order` as accepted by the server.
    pub fn mark_saved(&mut self, order: &[PageId]) {
        self.confirmed = order.to_vec();
    }

    /// Restore the last server-confirmed order. Returns whether anything moved.
    pub fn rollback(&mut self) -> bool {
        let confirmed = self.confirmed.clone();
        self.show_order(&confirmed)
    }

    /// Rearrange the list to follow `order`. Returns whether anything moved.
    ///
    /// Pages missing from `order` keep their relative order at the end of
    /// the list.
    pub fn show_order(&mut self, order: &[PageId]) -> bool {
        let before = self.ids();
        self.pages.sort_by_key(|p| {
            order
                .iter()
                .position(|id| *id == p.id)
                .unwrap_or(usize::MAX)
        });
        self.renumber();
        self.ids() != before
    }
}
