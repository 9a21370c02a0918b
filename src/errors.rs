//! Typed error hierarchy for the dashboard clients.
//!
//! Every failure a controller can hit falls into one of three kinds:
//! - `Network`: the request never produced a response (refused, timed out)
//! - `Server`: a non-2xx status or a `success: false` body
//! - `Render`: the data arrived but does not have the shape a renderer needs
//!
//! None of these are retried. Controllers convert them into a toast or an
//! inline error block at the call site nearest the user action.

use pdashboard_common::PageId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("Server error from {endpoint} (status {status}): {message}")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Cannot render {what}: {message}")]
    Render { what: String, message: String },

    #[error("Page {id} not found")]
    PageNotFound { id: PageId },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Why a toggle request was not issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    #[error("No toggle control for page {0}")]
    UnknownPage(PageId),

    #[error("Toggle for page {0} is already in progress")]
    InFlight(PageId),
}

impl DashboardError {
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn server(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    pub fn render(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
