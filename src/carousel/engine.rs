//! Slide selection state machine, free of timers and I/O.

use pdashboard_common::{PageDescriptor, sort_by_order};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselState {
    /// No active slides, or not started yet.
    Idle,
    Running,
    /// Display hidden; no automatic transitions.
    Paused,
}

#[derive(Debug, Clone)]
pub struct CarouselEngine {
    slides: Vec<PageDescriptor>,
    current: usize,
    state: CarouselState,
}

impl CarouselEngine {
    /// Build from the full page list. Only active pages become slides.
    pub fn new(pages: &[PageDescriptor]) -> Self {
        let mut slides: Vec<PageDescriptor> = pages.iter().filter(|p| p.active).cloned().collect();
        sort_by_order(&mut slides);
        Self {
            slides,
            current: 0,
            state: CarouselState::Idle,
        }
    }

    pub fn slides(&self) -> &[PageDescriptor] {
        &self.slides
    }

    pub fn total(&self) -> usize {
        self.slides.len()
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    /// Index of the active slide; `None` until started or when empty.
    pub fn current(&self) -> Option<usize> {
        (self.state != CarouselState::Idle).then_some(self.current)
    }

    pub fn current_slide(&self) -> Option<&PageDescriptor> {
        self.current().and_then(|i| self.slides.get(i))
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.current() == Some(index)
    }

    /// Show slide 0. With no slides the engine stays idle.
    pub fn start(&mut self) -> Option<usize> {
        if self.slides.is_empty() {
            self.state = CarouselState::Idle;
            return None;
        }
        self.current = 0;
        self.state = CarouselState::Running;
        Some(0)
    }

    /// Automatic transition. Only moves while running.
    pub fn advance(&mut self) -> Option<usize> {
        if self.state != CarouselState::Running {
            return None;
        }
        self.current = (self.current + 1) % self.slides.len();
        Some(self.current)
    }

    /// Manual jump from an indicator. Out-of-range indices are ignored.
    pub fn jump(&mut self, index: usize) -> Option<usize> {
        if self.state == CarouselState::Idle || index >= self.slides.len() {
            return None;
        }
        self.current = index;
        Some(index)
    }

    pub fn hide(&mut self) -> bool {
        if self.state == CarouselState::Running {
            self.state = CarouselState::Paused;
            true
        } else {
            false
        }
    }

    /// Display visible again: restart from slide 0.
    pub fn show(&mut self) -> Option<usize> {
        match self.state {
            CarouselState::Paused => self.start(),
            _ => None,
        }
    }
}
