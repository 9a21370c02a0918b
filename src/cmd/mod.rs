//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `pages`         | `Pages` (`list`, `move`, `toggle`)                 |
//! | `status`        | `Status`, `Version`                                |
//! | `kiosk`         | `Kiosk`                                            |
//! | `config`        | `Config`                                           |

pub mod config;
pub mod kiosk;
pub mod pages;
pub mod status;

pub use config::cmd_config;
pub use kiosk::cmd_kiosk;
pub use pages::cmd_pages;
pub use status::{cmd_status, cmd_version};
