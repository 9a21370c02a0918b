//! Enable/disable buttons of the admin list.
//!
//! A control is disabled for as long as its request is in flight, which is
//! what keeps at most one toggle per page outstanding. The label only ever
//! reflects the server-confirmed `active` flag; on failure it reverts.

use std::collections::HashMap;

use pdashboard_common::{PageDescriptor, PageId};
use tracing::{info, warn};

use crate::errors::{DashboardError, ToggleError};
use crate::registry::PageRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    Active,
    Inactive,
    Loading,
}

impl ToggleLabel {
    pub fn for_state(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Loading => "Loading...",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Active => "btn-success",
            Self::Inactive => "btn-secondary",
            Self::Loading => "btn-loading",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleControl {
    pub page_id: PageId,
    pub active: bool,
    pub label: ToggleLabel,
    pub disabled: bool,
}

impl ToggleControl {
    pub fn new(page_id: PageId, active: bool) -> Self {
        Self {
            page_id,
            active,
            label: ToggleLabel::for_state(active),
            disabled: false,
        }
    }
}

/// Proof that a control was disabled by `begin`. Consumed by `complete`.
#[derive(Debug)]
#[must_use]
pub struct ToggleTicket {
    page_id: PageId,
    previous: ToggleLabel,
}

impl ToggleTicket {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }
}

#[derive(Debug, Default)]
pub struct ToggleController {
    controls: HashMap<PageId, ToggleControl>,
}

impl ToggleController {
    pub fn new(pages: &[PageDescriptor]) -> Self {
        let mut ctrl = Self::default();
        ctrl.sync(pages);
        ctrl
    }

    /// Rebuild controls from a fresh page list.
    pub fn sync(&mut self, pages: &[PageDescriptor]) {
        self.controls = pages
            .iter()
            .map(|p| (p.id, ToggleControl::new(p.id, p.active)))
            .collect();
    }

    pub fn control(&self, id: PageId) -> Option<&ToggleControl> {
        self.controls.get(&id)
    }

    /// Disable the control and show the loading label.
    pub fn begin(&mut self, id: PageId) -> Result<ToggleTicket, ToggleError> {
        let control = self
            .controls
            .get_mut(&id)
            .ok_or(ToggleError::UnknownPage(id))?;
        if control.disabled {
            return Err(ToggleError::InFlight(id));
        }
        let previous = control.label;
        control.disabled = true;
        control.label = ToggleLabel::Loading;
        Ok(ToggleTicket {
            page_id: id,
            previous,
        })
    }

    /// Apply the request result and re-enable the control.
    ///
    /// Returns the confirmed `active` state on success.
    pub fn complete(
        &mut self,
        ticket: ToggleTicket,
        result: &Result<PageDescriptor, DashboardError>,
    ) -> Option<bool> {
        let control = self.controls.get_mut(&ticket.page_id)?;
        control.disabled = false;
        match result {
            Ok(page) => {
                control.active = page.active;
                control.label = ToggleLabel::for_state(page.active);
                Some(page.active)
            }
            Err(_) => {
                control.label = ticket.previous;
                None
            }
        }
    }

    /// Full toggle round trip against the registry.
    pub async fn toggle(
        &mut self,
        registry: &dyn PageRegistry,
        id: PageId,
    ) -> Result<Result<PageDescriptor, DashboardError>, ToggleError> {
        let ticket = self.begin(id)?;
        let result = registry.toggle_page(id).await;
        match &result {
            Ok(page) => info!(page = %id, active = page.active, "page toggled"),
            Err(e) => warn!(page = %id, error = %e, "failed to toggle page"),
        }
        self.complete(ticket, &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRegistry, page};
    use pdashboard_common::PageType;

    fn inactive_page() -> PageDescriptor {
        page(5, 1, false, PageType::Grid2x2)
    }

    #[tokio::test]
    async fn test_success_shows_confirmed_state() {
        let registry = FakeRegistry::with_pages(vec![inactive_page()]);
        let mut ctrl = ToggleController::new(&[inactive_page()]);
        assert_eq!(ctrl.control(PageId(5)).unwrap().label.text(), "Inactive");

        let result = ctrl.toggle(&registry, PageId(5)).await.unwrap();
        assert!(result.unwrap().active);
        let control = ctrl.control(PageId(5)).unwrap();
        assert_eq!(control.label.text(), "Active");
        assert!(control.active);
        assert!(!control.disabled);
    }

    #[tokio::test]
    async fn test_failure_reverts_label_and_reenables() {
        let registry = FakeRegistry::with_pages(vec![inactive_page()]);
        registry.set(|s| s.fail_toggle = true);
        let mut ctrl = ToggleController::new(&[inactive_page()]);

        let result = ctrl.toggle(&registry, PageId(5)).await.unwrap();
        assert!(result.is_err());
        let control = ctrl.control(PageId(5)).unwrap();
        assert_eq!(control.label, ToggleLabel::Inactive);
        assert!(!control.disabled);
        assert!(!control.active);
    }

    #[test]
    fn test_second_toggle_while_in_flight_is_rejected() {
        let mut ctrl = ToggleController::new(&[inactive_page()]);
        let ticket = ctrl.begin(PageId(5)).unwrap();
        let control = ctrl.control(PageId(5)).unwrap();
        assert!(control.disabled);
        assert_eq!(control.label.text(), "Loading...");

        assert_eq!(ctrl.begin(PageId(5)).unwrap_err(), ToggleError::InFlight(PageId(5)));

        let mut confirmed = inactive_page();
        confirmed.active = true;
        assert_eq!(ctrl.complete(ticket, &Ok(confirmed)), Some(true));
        assert!(ctrl.begin(PageId(5)).is_ok());
    }

    #[test]
    fn test_unknown_page() {
        let mut ctrl = ToggleController::new(&[]);
        assert_eq!(ctrl.begin(PageId(1)).unwrap_err(), ToggleError::UnknownPage(PageId(1)));
    }

    #[test]
    fn test_server_confirmation_wins_over_expectation() {
        // The server reports the page still inactive; the label must say so.
        let mut ctrl = ToggleController::new(&[inactive_page()]);
        let ticket = ctrl.begin(PageId(5)).unwrap();
        ctrl.complete(ticket, &Ok(inactive_page()));
        assert_eq!(ctrl.control(PageId(5)).unwrap().label, ToggleLabel::Inactive);
    }
}
