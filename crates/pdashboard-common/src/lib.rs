//! Shared domain types for the PDashboard clients.
//!
//! The page registry is owned by the backend; everything in here mirrors the
//! JSON it serves so the admin controllers, the carousel and the kiosk server
//! agree on one canonical shape.
//!
//! | Module    | Responsibility                                          |
//! |-----------|---------------------------------------------------------|
//! | `page`    | `PageId`, `PageType`, `PageConfig`, `PageDescriptor`    |
//! | `wire`    | Request/response bodies for the REST endpoints          |
//! | `records` | Data records served by `/api/data/{source}`             |

pub mod page;
pub mod records;
pub mod wire;

pub use page::{
    ConfigField, FieldKind, PageConfig, PageDescriptor, PageId, PageType, Widget, sort_by_order,
};
pub use records::{ForecastRecord, ProductionRecord, ProductionStatus, ValueRecord};
pub use wire::{
    ErrorBody, PagesResponse, ReorderRequest, ReorderResponse, ToggleResponse, VersionResponse,
};
