//! Page registry client.
//!
//! `PageRegistry` is the seam between the controllers and the backend REST
//! API. `HttpRegistry` is the production implementation over `reqwest`;
//! tests substitute in-memory fakes.
//!
//! | Method             | Endpoint                          |
//! |--------------------|-----------------------------------|
//! | `load_pages`       | `GET /api/pages`                  |
//! | `save_order`       | `POST /api/pages/reorder`         |
//! | `toggle_page`      | `POST /api/pages/{id}/toggle`     |
//! | `fetch_data`       | `GET /api/data/{source}`          |
//! | `fetch_page_asset` | `GET /pages/{id}/{file}`          |
//! | `fetch_version`    | `GET /api/version`                |

use std::time::Duration;

use async_trait::async_trait;
use pdashboard_common::{
    ErrorBody, PageDescriptor, PageId, PagesResponse, ReorderRequest, ReorderResponse,
    ToggleResponse, VersionResponse, sort_by_order,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::DashboardError;

#[async_trait]
pub trait PageRegistry: Send + Sync {
    /// Full page list, sorted by ascending `order`.
    async fn load_pages(&self) -> Result<Vec<PageDescriptor>, DashboardError>;

    /// Persist the complete order as a sequence of ids.
    async fn save_order(&self, order: &[PageId]) -> Result<(), DashboardError>;

    /// Flip a page's `active` flag. Returns the server-confirmed descriptor.
    async fn toggle_page(&self, id: PageId) -> Result<PageDescriptor, DashboardError>;

    /// Records for one data source, as raw JSON.
    async fn fetch_data(&self, source: &str) -> Result<serde_json::Value, DashboardError>;

    /// Raw text of a page asset (the Markdown body of a `text-md` page).
    async fn fetch_page_asset(&self, id: PageId, file: &str) -> Result<String, DashboardError>;

    async fn fetch_version(&self) -> Result<String, DashboardError>;

    /// URL a display should load the asset from (image pages).
    fn asset_url(&self, id: PageId, file: &str) -> String;
}

/// `PageRegistry` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, DashboardError> {
        let resp = request
            .send()
            .await
            .map_err(|e| DashboardError::network(path, network_message(&e)))?;

        let status = resp.status();
        debug!(path, status = status.as_u16(), "registry response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body
                }
            });
        Err(DashboardError::server(path, status.as_u16(), message))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DashboardError> {
        let resp = self.send(path, request).await?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| DashboardError::network(path, network_message(&e)))?;
        serde_json::from_str(&body).map_err(|e| {
            DashboardError::server(path, status, format!("Invalid response body: {}", e))
        })
    }
}

fn network_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

#[async_trait]
impl PageRegistry for HttpRegistry {
    async fn load_pages(&self) -> Result<Vec<PageDescriptor>, DashboardError> {
        let path = "/api/pages";
        let resp: PagesResponse = self.json(path, self.client.get(self.url(path))).await?;
        let mut pages = resp.pages;
        sort_by_order(&mut pages);
        Ok(pages)
    }

    async fn save_order(&self, order: &[PageId]) -> Result<(), DashboardError> {
        let path = "/api/pages/reorder";
        let body = ReorderRequest {
            order: order.to_vec(),
        };
        let resp: ReorderResponse = self
            .json(path, self.client.post(self.url(path)).json(&body))
            .await?;
        if resp.success {
            Ok(())
        } else {
            Err(DashboardError::server(
                path,
                200,
                resp.message.unwrap_or_else(|| "reorder rejected".to_string()),
            ))
        }
    }

    async fn toggle_page(&self, id: PageId) -> Result<PageDescriptor, DashboardError> {
        let path = format!("/api/pages/{}/toggle", id);
        let resp: ToggleResponse = self
            .json(&path, self.client.post(self.url(&path)))
            .await
            .map_err(|e| match e {
                DashboardError::Server { status: 404, .. } => DashboardError::PageNotFound { id },
                other => other,
            })?;
        match (resp.success, resp.page) {
            (true, Some(page)) => Ok(page),
            (true, None) => Err(DashboardError::server(
                &path,
                200,
                "toggle response did not include the page",
            )),
            (false, _) => Err(DashboardError::server(
                &path,
                200,
                resp.message.unwrap_or_else(|| "toggle rejected".to_string()),
            )),
        }
    }

    async fn fetch_data(&self, source: &str) -> Result<serde_json::Value, DashboardError> {
        let path = format!("/api/data/{}", source);
        self.json(&path, self.client.get(self.url(&path))).await
    }

    async fn fetch_page_asset(&self, id: PageId, file: &str) -> Result<String, DashboardError> {
        let path = format!("/pages/{}/{}", id, file);
        let resp = self.send(&path, self.client.get(self.url(&path))).await?;
        resp.text()
            .await
            .map_err(|e| DashboardError::network(&path, network_message(&e)))
    }

    async fn fetch_version(&self) -> Result<String, DashboardError> {
        let path = "/api/version";
        let resp: VersionResponse = self.json(path, self.client.get(self.url(path))).await?;
        Ok(resp.version)
    }

    fn asset_url(&self, id: PageId, file: &str) -> String {
        self.url(&format!("/pages/{}/{}", id, file))
    }
}
