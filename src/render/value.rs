use pdashboard_common::{PageDescriptor, ValueRecord};

use super::html::{escape, format_thousands_eur};
use super::{RenderStrategy, SlideData, parse_records, slide_header};
use crate::errors::DashboardError;

const BAR_HEIGHT: f64 = 150.0;

/// Headline value of the latest month with a bar per month below it.
pub struct ValueCards;

impl RenderStrategy for ValueCards {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let records: Vec<ValueRecord> = parse_records(page, data)?;
        let Some(current) = records.last() else {
            return Err(DashboardError::render(
                format!("page '{}'", page.title),
                "no monthly values",
            ));
        };
        let max = records.iter().map(|r| r.valor).fold(0.0_f64, f64::max);

        let bars: String = records
            .iter()
            .map(|r| {
                let height = if max > 0.0 { r.valor / max * BAR_HEIGHT } else { 0.0 };
                format!(
                    r#"<div class="value-bar"><div class="value-bar-fill" style="height: {:.1}px;"></div><div class="value-bar-amount">{}</div><div class="value-bar-label">{}</div></div>"#,
                    height,
                    format_thousands_eur(r.valor),
                    escape(&r.mes)
                )
            })
            .collect();

        Ok(format!(
            concat!(
                "{header}",
                r#"<div class="value-container">"#,
                r#"<div class="value-main"><div class="value-current">{current}</div>"#,
                r#"<div class="value-label">Valor Total Produção - {month}</div></div>"#,
                r#"<div class="value-chart">{bars}</div>"#,
                "</div>"
            ),
            header = slide_header(page),
            current = format_thousands_eur(current.valor),
            month = escape(&current.mes),
            bars = bars,
        ))
    }
}
