//! Kiosk carousel: cycles through the active pages.
//!
//! `CarouselEngine` is the pure slide state machine; `CarouselHandle` runs it
//! on a tokio task with the advance, refresh and clock timers.

pub mod cache;
pub mod engine;
pub mod runtime;

pub use cache::ContentCache;
pub use engine::{CarouselEngine, CarouselState};
pub use runtime::{
    CarouselCommand, CarouselEvent, CarouselHandle, CarouselSettings, CarouselStatus, ShownSlide,
    event_channel,
};
