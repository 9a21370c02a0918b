use pdashboard_common::PageDescriptor;
use pulldown_cmark::{Event, Options, Parser, html as md_html};

use super::{RenderStrategy, SlideData, slide_header};
use crate::errors::DashboardError;

pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Markdown text page. Raw HTML in the source is shown as text, never injected.
pub struct MarkdownPage;

pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::with_capacity(source.len() * 3 / 2);
    md_html::push_html(&mut out, parser);
    out
}

impl RenderStrategy for MarkdownPage {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let SlideData::Markdown(source) = data else {
            return Err(DashboardError::render(
                format!("page '{}'", page.title),
                "expected Markdown text",
            ));
        };
        let font_size = page.config.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        Ok(format!(
            r#"{}<div class="markdown-body" style="font-size: {}px;">{}</div>"#,
            slide_header(page),
            font_size,
            markdown_to_html(source)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::page;
    use pdashboard_common::PageType;

    #[test]
    fn renders_headings_and_lists() {
        let html = markdown_to_html("# Turno\n\n- Linha 1\n- Linha 2\n");
        assert!(html.contains("<h1>Turno</h1>"));
        assert!(html.contains("<li>Linha 1</li>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn font_size_defaults_and_overrides() {
        let mut p = page(2, 1, true, PageType::TextMarkdown);
        let data = SlideData::Markdown("text".into());
        let html = MarkdownPage.render(&p, &data).unwrap();
        assert!(html.contains("font-size: 16px;"));

        p.config.font_size = Some(22);
        let html = MarkdownPage.render(&p, &data).unwrap();
        assert!(html.contains("font-size: 22px;"));
    }

    #[test]
    fn records_are_rejected() {
        let p = page(2, 1, true, PageType::TextMarkdown);
        let result = MarkdownPage.render(&p, &SlideData::Records(serde_json::json!([])));
        assert!(result.is_err());
    }
}
