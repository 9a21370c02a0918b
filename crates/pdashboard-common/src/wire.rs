//! JSON bodies exchanged with the page registry backend.

use serde::{Deserialize, Serialize};

use crate::page::{PageDescriptor, PageId};

/// `GET /api/pages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesResponse {
    pub pages: Vec<PageDescriptor>,
}

/// `POST /api/pages/reorder` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<PageId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/pages/{id}/toggle`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    #[serde(default)]
    pub page: Option<PageDescriptor>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Error body the backend returns with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
