use pdashboard_common::{PageDescriptor, ProductionRecord, ProductionStatus};

use super::html::{escape, format_number};
use super::{RenderStrategy, SlideData, parse_records, slide_header};
use crate::errors::DashboardError;

/// Production-versus-target cards laid out on a fixed number of columns.
pub struct ProductionGrid {
    columns: u8,
}

impl ProductionGrid {
    pub fn new(columns: u8) -> Self {
        Self { columns }
    }
}

fn status_text(status: Option<ProductionStatus>) -> &'static str {
    match status {
        Some(ProductionStatus::Above) => "✅ Acima da meta",
        Some(ProductionStatus::Near) => "⚠️ Próximo da meta",
        Some(ProductionStatus::Below) => "❌ Abaixo da meta",
        None => "Sem meta definida",
    }
}

fn render_item(record: &ProductionRecord) -> String {
    let status = record.status();
    let class = status.map_or("danger", |s| s.css_class());
    let percentage = record
        .percentage()
        .map_or_else(|| "n/a".to_string(), |p| format!("{}%", p));
    format!(
        concat!(
            r#"<div class="production-item {class}">"#,
            "<h3>{familia}</h3>",
            r#"<div class="production-numbers">"#,
            r#"<div class="production-produced">{produzido}</div>"#,
            r#"<div class="production-target">Meta: {meta}</div>"#,
            "</div>",
            r#"<div class="production-percentage {class}">{percentage}</div>"#,
            r#"<div class="production-status">{status}</div>"#,
            "</div>"
        ),
        class = class,
        familia = escape(&record.familia),
        produzido = format_number(record.produzido),
        meta = format_number(record.meta),
        percentage = percentage,
        status = status_text(status),
    )
}

impl RenderStrategy for ProductionGrid {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let records: Vec<ProductionRecord> = parse_records(page, data)?;
        let items: String = records.iter().map(render_item).collect();
        Ok(format!(
            r#"{}<div class="production-grid" style="grid-template-columns: repeat({}, 1fr);">{}</div>"#,
            slide_header(page),
            self.columns,
            items
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, sample_production};
    use pdashboard_common::PageType;
    use serde_json::json;

    fn render(data: serde_json::Value) -> Result<String, DashboardError> {
        ProductionGrid::new(3).render(&page(1, 1, true, PageType::Grid3x2), &SlideData::Records(data))
    }

    #[test]
    fn renders_percentage_and_status_per_family() {
        let html = render(sample_production()).unwrap();
        assert!(html.contains("repeat(3, 1fr)"));
        assert!(html.contains("<h3>Equipamentos A</h3>"));
        assert!(html.contains(r#"<div class="production-percentage success">104%</div>"#));
        assert!(html.contains(r#"<div class="production-percentage warning">98%</div>"#));
        assert!(html.contains(r#"<div class="production-percentage danger">94%</div>"#));
        assert!(html.contains("Acima da meta"));
        assert!(html.contains("1 250"));
    }

    #[test]
    fn zero_target_is_not_a_division() {
        let html = render(json!([{"familia": "X", "produzido": 10, "meta": 0}])).unwrap();
        assert!(html.contains("n/a"));
        assert!(html.contains("Sem meta definida"));
    }

    #[test]
    fn family_names_are_escaped() {
        let html = render(json!([{"familia": "<b>A</b>", "produzido": 1, "meta": 1}])).unwrap();
        assert!(html.contains("&lt;b&gt;A&lt;/b&gt;"));
    }

    #[test]
    fn wrong_shape_is_render_error() {
        let err = render(json!({"error": "sheet missing"})).unwrap_err();
        assert!(matches!(err, DashboardError::Render { .. }));
    }
}
