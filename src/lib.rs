pub mod admin;
pub mod app;
pub mod carousel;
pub mod config;
pub mod errors;
pub mod kiosk;
pub mod notify;
pub mod registry;
pub mod render;
pub mod status;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;
