//! Data records served by `GET /api/data/{source}`.
//!
//! Field names follow the spreadsheet columns the backend reads
//! (`familia`, `produzido`, `meta`, ...), so they are kept verbatim.

use serde::{Deserialize, Serialize};

/// Monthly production of one product family against its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub familia: String,
    pub produzido: f64,
    pub meta: f64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionStatus {
    /// At or above target.
    Above,
    /// Within 5% of target.
    Near,
    Below,
}

impl ProductionStatus {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Above => "success",
            Self::Near => "warning",
            Self::Below => "danger",
        }
    }
}

impl ProductionRecord {
    /// Percentage of target reached, rounded to the nearest integer.
    /// A zero target yields `None`.
    pub fn percentage(&self) -> Option<i64> {
        if self.meta == 0.0 {
            return None;
        }
        Some((self.produzido / self.meta * 100.0).round() as i64)
    }

    pub fn status(&self) -> Option<ProductionStatus> {
        self.percentage().map(|pct| match pct {
            p if p >= 100 => ProductionStatus::Above,
            p if p >= 95 => ProductionStatus::Near,
            _ => ProductionStatus::Below,
        })
    }
}

/// Forecast vs. actual production for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub mes: String,
    pub previsao: f64,
    pub real: f64,
}

/// Total production value for one month, in euros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub mes: String,
    pub valor: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(produzido: f64, meta: f64) -> ProductionRecord {
        ProductionRecord {
            familia: "Equipamentos A".into(),
            produzido,
            meta,
            status: None,
        }
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(record(1250.0, 1200.0).percentage(), Some(104));
        assert_eq!(record(980.0, 1000.0).percentage(), Some(98));
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(record(1100.0, 1100.0).status(), Some(ProductionStatus::Above));
        assert_eq!(record(920.0, 950.0).status(), Some(ProductionStatus::Near));
        assert_eq!(record(850.0, 900.0).status(), Some(ProductionStatus::Below));
    }

    #[test]
    fn zero_target_has_no_percentage() {
        assert_eq!(record(10.0, 0.0).percentage(), None);
        assert_eq!(record(10.0, 0.0).status(), None);
    }
}
