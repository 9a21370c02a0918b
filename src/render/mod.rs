//! Slide content renderers.
//!
//! A closed set of `RenderStrategy` implementations keyed by `PageType`. Each
//! turns a page descriptor and its fetched content into an HTML fragment for
//! the slide body. Nothing fetched from the server is ever executed; page
//! content is data, and the renderer decides the markup.
//!
//! | Page type              | Strategy          | Content                     |
//! |------------------------|-------------------|-----------------------------|
//! | `3x2`, `2x2`           | `ProductionGrid`  | production records          |
//! | `2x1-graph`            | `ForecastChart`   | forecast records            |
//! | `2x2-cards`            | `ValueCards`      | value records               |
//! | `text-md`              | `MarkdownPage`    | Markdown text               |
//! | `image`                | `ImagePage`       | asset URL                   |

pub mod forecast;
pub mod html;
pub mod image;
pub mod markdown;
pub mod production;
pub mod value;

use std::collections::HashMap;

use pdashboard_common::{PageDescriptor, PageId, PageType};
use serde::de::DeserializeOwned;

pub use forecast::ForecastChart;
pub use image::ImagePage;
pub use markdown::MarkdownPage;
pub use production::ProductionGrid;
pub use value::ValueCards;

use crate::errors::DashboardError;
use crate::registry::PageRegistry;

/// Content fetched for one slide.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideData {
    /// JSON array from `/api/data/{source}`.
    Records(serde_json::Value),
    Markdown(String),
    AssetUrl(String),
}

/// What has to be fetched before a page can be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRequest {
    Data(String),
    Markdown { page: PageId, file: String },
    Image { page: PageId, file: String },
}

impl ContentRequest {
    /// Resolve the fetch for `page`. Asset pages need their file name; data
    /// pages always resolve, falling back to their type's default source.
    pub fn for_page(page: &PageDescriptor) -> Result<Self, DashboardError> {
        let missing = |field: &str| {
            DashboardError::render(
                format!("page '{}'", page.title),
                format!("missing config field: {}", field),
            )
        };
        match page.page_type {
            PageType::TextMarkdown => page
                .config
                .field("md_file")
                .map(|file| Self::Markdown {
                    page: page.id,
                    file,
                })
                .ok_or_else(|| missing("md_file")),
            PageType::Image => page
                .config
                .field("image_file")
                .map(|file| Self::Image {
                    page: page.id,
                    file,
                })
                .ok_or_else(|| missing("image_file")),
            _ => page.data_source().map(Self::Data).ok_or_else(|| {
                DashboardError::render(format!("page '{}'", page.title), "no content source")
            }),
        }
    }

    /// Cache key; data pages sharing a source share one fetch.
    pub fn key(&self) -> String {
        match self {
            Self::Data(source) => source.clone(),
            Self::Markdown { page, file } | Self::Image { page, file } => {
                format!("pages/{}/{}", page, file)
            }
        }
    }

    pub async fn fetch(&self, registry: &dyn PageRegistry) -> Result<SlideData, DashboardError> {
        match self {
            Self::Data(source) => registry.fetch_data(source).await.map(SlideData::Records),
            Self::Markdown { page, file } => registry
                .fetch_page_asset(*page, file)
                .await
                .map(SlideData::Markdown),
            // The display loads the image itself.
            Self::Image { page, file } => Ok(SlideData::AssetUrl(registry.asset_url(*page, file))),
        }
    }
}

pub trait RenderStrategy: Send + Sync {
    fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError>;
}

pub struct RenderRegistry {
    strategies: HashMap<PageType, Box<dyn RenderStrategy>>,
}

impl Default for RenderRegistry {
    fn default() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register(PageType::Grid3x2, ProductionGrid::new(3));
        registry.register(PageType::Grid2x2, ProductionGrid::new(2));
        registry.register(PageType::Graph2x1, ForecastChart);
        registry.register(PageType::Cards2x2, ValueCards);
        registry.register(PageType::TextMarkdown, MarkdownPage);
        registry.register(PageType::Image, ImagePage);
        registry
    }
}

impl RenderRegistry {
    pub fn register(&mut self, page_type: PageType, strategy: impl RenderStrategy + 'static) {
        self.strategies.insert(page_type, Box::new(strategy));
    }

    pub fn render(&self, page: &PageDescriptor, data: &SlideData) -> Result<String, DashboardError> {
        let strategy = self.strategies.get(&page.page_type).ok_or_else(|| {
            DashboardError::render(
                format!("page '{}'", page.title),
                format!("no renderer for type {}", page.page_type),
            )
        })?;
        strategy.render(page, data)
    }

    /// Render, turning any failure into an inline error block.
    pub fn render_or_error(&self, page: &PageDescriptor, data: &SlideData) -> String {
        self.render(page, data)
            .unwrap_or_else(|e| html::error_block(&e.to_string()))
    }
}

/// Decode a records payload into typed rows.
pub(crate) fn parse_records<T: DeserializeOwned>(
    page: &PageDescriptor,
    data: &SlideData,
) -> Result<Vec<T>, DashboardError> {
    let SlideData::Records(value) = data else {
        return Err(DashboardError::render(
            format!("page '{}'", page.title),
            "expected data records",
        ));
    };
    serde_json::from_value(value.clone()).map_err(|e| {
        DashboardError::render(
            format!("page '{}'", page.title),
            format!("malformed data: {}", e),
        )
    })
}

/// Header shared by every slide body.
pub(crate) fn slide_header(page: &PageDescriptor) -> String {
    let icon = page
        .icon
        .as_deref()
        .map(|i| format!(r#"<span class="slide-icon">{}</span> "#, html::escape(i)))
        .unwrap_or_default();
    let description = page
        .description
        .as_deref()
        .map(|d| format!(r#"<p class="slide-description">{}</p>"#, html::escape(d)))
        .unwrap_or_default();
    format!(
        r#"<header class="slide-header"><h2>{}{}</h2>{}</header>"#,
        icon,
        html::escape(&page.title),
        description
    )
}
