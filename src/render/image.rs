use pdashboard_common::PageDescriptor;

use super::html::escape;
use super::{RenderStrategy, SlideData, slide_header};
use crate::errors::DashboardError;

pub struct ImagePage;

impl RenderStrategy for ImagePage {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let SlideData::AssetUrl(url) = data else {
            return Err(DashboardError::render(
                format!("page '{}'", page.title),
                "expected an image URL",
            ));
        };
        Ok(format!(
            r#"{}<div class="image-slide"><img src="{}" alt="{}"></div>"#,
            slide_header(page),
            escape(url),
            escape(&page.title)
        ))
    }
}
