use pdashboard_common::{ForecastRecord, PageDescriptor};

use super::html::{escape, format_number};
use super::{RenderStrategy, SlideData, parse_records, slide_header};
use crate::errors::DashboardError;

/// Tallest bar, in pixels.
const CHART_HEIGHT: f64 = 250.0;

/// Forecast and actual side-by-side bars per month, scaled to the largest value.
pub struct ForecastChart;

fn bar(kind: &str, value: f64, max: f64) -> String {
    format!(
        r#"<div class="bar bar-{}" style="height: {:.1}px;"><div class="bar-value">{}</div></div>"#,
        kind,
        value / max * CHART_HEIGHT,
        format_number(value)
    )
}

const LEGEND: &str = concat!(
    r#"<div class="forecast-legend">"#,
    r#"<span class="legend-item legend-forecast">Previsão</span>"#,
    r#"<span class="legend-item legend-real">Real</span>"#,
    "</div>"
);

impl RenderStrategy for ForecastChart {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let records: Vec<ForecastRecord> = parse_records(page, data)?;
        let max = records
            .iter()
            .flat_map(|r| [r.previsao, r.real])
            .fold(0.0_f64, f64::max);
        if records.is_empty() || max <= 0.0 {
            return Err(DashboardError::render(
                format!("page '{}'", page.title),
                "no forecast values to chart",
            ));
        }

        let bars: String = records
            .iter()
            .map(|r| {
                format!(
                    r#"<div class="forecast-bar"><div class="bar-container">{}{}</div><div class="bar-label">{}</div></div>"#,
                    bar("forecast", r.previsao, max),
                    bar("real", r.real, max),
                    escape(&r.mes)
                )
            })
            .collect();

        Ok(format!(
            r#"{}<div class="forecast-container"><div class="forecast-chart"><div class="forecast-bars">{}</div></div>{}</div>"#,
            slide_header(page),
            bars,
            LEGEND
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, sample_forecast};
    use pdashboard_common::PageType;
    use serde_json::json;

    fn render(data: serde_json::Value) -> Result<String, DashboardError> {
        ForecastChart.render(&page(4, 1, true, PageType::Graph2x1), &SlideData::Records(data))
    }

    #[test]
    fn largest_value_gets_full_height() {
        let html = render(sample_forecast()).unwrap();
        // Março real = 1350 is the maximum.
        assert!(html.contains(r#"<div class="bar bar-real" style="height: 250.0px;"><div class="bar-value">1 350</div>"#));
        // Janeiro forecast: 1200 / 1350 * 250
        assert!(html.contains("height: 222.2px;"));
        assert!(html.contains(r#"<div class="bar-label">Fevereiro</div>"#));
        assert!(html.contains("Previsão"));
    }

    #[test]
    fn empty_data_is_render_error() {
        assert!(matches!(render(json!([])), Err(DashboardError::Render { .. })));
    }

    #[test]
    fn all_zero_values_are_render_error() {
        let result = render(json!([{"mes": "Janeiro", "previsao": 0, "real": 0}]));
        assert!(result.is_err());
    }
}
