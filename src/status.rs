//! Data status probe shown in the admin panel and by `pdashboard status`.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::errors::DashboardError;
use crate::registry::PageRegistry;

/// Source probed for data availability.
pub const PROBE_SOURCE: &str = "production_monthly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Spreadsheet,
    Sample,
}

impl DataOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Sample => "sample data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    Loaded {
        source: DataOrigin,
        records: usize,
        checked_at: DateTime<Local>,
    },
    ServerError {
        message: String,
    },
    ConnectionError {
        message: String,
    },
}

impl DataStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Fetch the probe source and classify the result.
///
/// A non-empty record list is reported as spreadsheet data, an empty one as
/// sample data.
pub async fn probe_data_status(registry: &dyn PageRegistry) -> DataStatus {
    match registry.fetch_data(PROBE_SOURCE).await {
        Ok(value) => {
            let records = value.as_array().map_or(0, Vec::len);
            DataStatus::Loaded {
                source: if records > 0 {
                    DataOrigin::Spreadsheet
                } else {
                    DataOrigin::Sample
                },
                records,
                checked_at: Local::now(),
            }
        }
        Err(e @ DashboardError::Network { .. }) => DataStatus::ConnectionError {
            message: e.to_string(),
        },
        Err(e) => DataStatus::ServerError {
            message: e.to_string(),
        },
    }
}
