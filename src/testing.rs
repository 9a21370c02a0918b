//! In-memory `PageRegistry` used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pdashboard_common::{PageConfig, PageDescriptor, PageId, PageType, sort_by_order};
use serde_json::json;

use crate::errors::DashboardError;
use crate::registry::PageRegistry;

#[derive(Default)]
pub struct FakeState {
    pub pages: Vec<PageDescriptor>,
    pub data: HashMap<String, serde_json::Value>,
    pub assets: HashMap<String, String>,
    pub version: String,
    pub fail_load: bool,
    pub fail_save: bool,
    pub fail_toggle: bool,
    /// Data fetches fail as if the backend were unreachable.
    pub offline: bool,
    pub failing_sources: HashSet<String>,
    /// How long each data fetch takes.
    pub fetch_delay: Option<Duration>,
    pub saved_orders: Vec<Vec<PageId>>,
    pub data_fetches: Vec<String>,
    pub load_calls: usize,
}

#[derive(Default)]
pub struct FakeRegistry {
    pub state: Mutex<FakeState>,
}

impl FakeRegistry {
    pub fn with_pages(pages: Vec<PageDescriptor>) -> Self {
        let registry = Self::default();
        {
            let mut state = registry.state.lock().unwrap();
            state.pages = pages;
            state.version = "1.4.2".to_string();
            state.data.insert("production_monthly".into(), sample_production());
            state.data.insert("forecast_3months".into(), sample_forecast());
            state.data.insert("total_value".into(), sample_values());
        }
        registry
    }

    pub fn set<F: FnOnce(&mut FakeState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn saved_orders(&self) -> Vec<Vec<PageId>> {
        self.state.lock().unwrap().saved_orders.clone()
    }

    pub fn data_fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().data_fetches.clone()
    }
}

#[async_trait]
impl PageRegistry for FakeRegistry {
    async fn load_pages(&self) -> Result<Vec<PageDescriptor>, DashboardError> {
        let mut state = self.state.lock().unwrap();
        state.load_calls += 1;
        if state.fail_load {
            return Err(DashboardError::network("/api/pages", "connection refused"));
        }
        let mut pages = state.pages.clone();
        sort_by_order(&mut pages);
        Ok(pages)
    }

    async fn save_order(&self, order: &[PageId]) -> Result<(), DashboardError> {
        let mut state = self.state.lock().unwrap();
        state.saved_orders.push(order.to_vec());
        if state.fail_save {
            return Err(DashboardError::server("/api/pages/reorder", 500, "database locked"));
        }
        for (index, id) in order.iter().enumerate() {
            if let Some(page) = state.pages.iter_mut().find(|p| p.id == *id) {
                page.order = index as u32 + 1;
            }
        }
        Ok(())
    }

    async fn toggle_page(&self, id: PageId) -> Result<PageDescriptor, DashboardError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_toggle {
            return Err(DashboardError::server(
                format!("/api/pages/{}/toggle", id),
                500,
                "toggle failed",
            ));
        }
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DashboardError::PageNotFound { id })?;
        page.active = !page.active;
        Ok(page.clone())
    }

    async fn fetch_data(&self, source: &str) -> Result<serde_json::Value, DashboardError> {
        let delay = self.state.lock().unwrap().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.data_fetches.push(source.to_string());
        if state.offline {
            return Err(DashboardError::network(
                format!("/api/data/{}", source),
                "connection refused",
            ));
        }
        if state.failing_sources.contains(source) {
            return Err(DashboardError::server(
                format!("/api/data/{}", source),
                500,
                "spreadsheet unreadable",
            ));
        }
        Ok(state.data.get(source).cloned().unwrap_or_else(|| json!([])))
    }

    async fn fetch_page_asset(&self, id: PageId, file: &str) -> Result<String, DashboardError> {
        let mut state = self.state.lock().unwrap();
        state.data_fetches.push(file.to_string());
        state
            .assets
            .get(file)
            .cloned()
            .ok_or_else(|| DashboardError::server(format!("/pages/{}/{}", id, file), 404, "Not Found"))
    }

    async fn fetch_version(&self) -> Result<String, DashboardError> {
        Ok(self.state.lock().unwrap().version.clone())
    }

    fn asset_url(&self, id: PageId, file: &str) -> String {
        format!("http://backend/pages/{}/{}", id, file)
    }
}

pub fn page(id: i64, order: u32, active: bool, page_type: PageType) -> PageDescriptor {
    let mut config = PageConfig::default();
    match page_type {
        PageType::TextMarkdown => config.md_file = Some("notes.md".into()),
        PageType::Image => config.image_file = Some("plant.jpg".into()),
        _ => config.xlsx_file = Some("producao.xlsx".into()),
    }
    PageDescriptor {
        id: PageId(id),
        title: format!("Page {}", id),
        description: None,
        icon: None,
        page_type,
        order,
        active,
        config,
    }
}

/// `n` active grid pages with ids and orders `1..=n`.
pub fn pages(n: i64) -> Vec<PageDescriptor> {
    (1..=n)
        .map(|i| page(i, i as u32, true, PageType::Grid3x2))
        .collect()
}

pub fn ids(raw: &[i64]) -> Vec<PageId> {
    raw.iter().copied().map(PageId).collect()
}

pub fn sample_production() -> serde_json::Value {
    json!([
        {"familia": "Equipamentos A", "produzido": 1250, "meta": 1200, "status": "success"},
        {"familia": "Equipamentos B", "produzido": 980, "meta": 1000, "status": "warning"},
        {"familia": "Equipamentos C", "produzido": 850, "meta": 900, "status": "danger"}
    ])
}

pub fn sample_forecast() -> serde_json::Value {
    json!([
        {"mes": "Janeiro", "previsao": 1200, "real": 1250},
        {"mes": "Fevereiro", "previsao": 1100, "real": 980},
        {"mes": "Março", "previsao": 1300, "real": 1350}
    ])
}

pub fn sample_values() -> serde_json::Value {
    json!([
        {"mes": "Janeiro", "valor": 1250},
        {"mes": "Fevereiro", "valor": 980},
        {"mes": "Março", "valor": 1350}
    ])
}
