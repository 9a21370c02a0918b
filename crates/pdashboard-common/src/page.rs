use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical page identifier.
///
/// The backend has served both integers and numeric strings over time, and
/// some payloads use `page_id` instead of `id`. Both spellings deserialize to
/// this one integer type; it always serializes as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(PageId)
            .map_err(|_| format!("Invalid page id: {}", s))
    }
}

impl From<i64> for PageId {
    fn from(value: i64) -> Self {
        PageId(value)
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(PageId(n)),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Layout kind of a page. Selects the renderer used by the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "3x2")]
    Grid3x2,
    #[serde(rename = "2x2")]
    Grid2x2,
    #[serde(rename = "2x1-graph")]
    Graph2x1,
    #[serde(rename = "2x2-cards")]
    Cards2x2,
    #[serde(rename = "text-md")]
    TextMarkdown,
    #[serde(rename = "image")]
    Image,
}

/// Input kind of a page-type config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// One config field a page type declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: &'static str,
}

const SPREADSHEET_FIELDS: &[ConfigField] = &[ConfigField {
    name: "xlsx_file",
    kind: FieldKind::Text,
    required: true,
    default: "producao.xlsx",
}];

const MARKDOWN_FIELDS: &[ConfigField] = &[
    ConfigField {
        name: "md_file",
        kind: FieldKind::Text,
        required: true,
        default: "sample.md",
    },
    ConfigField {
        name: "font_size",
        kind: FieldKind::Number,
        required: false,
        default: "16",
    },
];

const IMAGE_FIELDS: &[ConfigField] = &[ConfigField {
    name: "image_file",
    kind: FieldKind::Text,
    required: true,
    default: "sample.jpg",
}];

impl PageType {
    pub const ALL: [PageType; 6] = [
        PageType::Grid3x2,
        PageType::Grid2x2,
        PageType::Graph2x1,
        PageType::Cards2x2,
        PageType::TextMarkdown,
        PageType::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid3x2 => "3x2",
            Self::Grid2x2 => "2x2",
            Self::Graph2x1 => "2x1-graph",
            Self::Cards2x2 => "2x2-cards",
            Self::TextMarkdown => "text-md",
            Self::Image => "image",
        }
    }

    /// Config fields the admin form collects for this type.
    pub fn config_fields(&self) -> &'static [ConfigField] {
        match self {
            Self::Grid3x2 | Self::Grid2x2 | Self::Graph2x1 | Self::Cards2x2 => SPREADSHEET_FIELDS,
            Self::TextMarkdown => MARKDOWN_FIELDS,
            Self::Image => IMAGE_FIELDS,
        }
    }

    /// Data source fetched from `/api/data/{source}` when the page does not name one.
    pub fn default_data_source(&self) -> Option<&'static str> {
        match self {
            Self::Grid3x2 | Self::Grid2x2 => Some("production_monthly"),
            Self::Graph2x1 => Some("forecast_3months"),
            Self::Cards2x2 => Some("total_value"),
            Self::TextMarkdown | Self::Image => None,
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid page type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Type-dependent page configuration. Keys this crate does not know about
/// are kept in `extra` so a round trip through the admin client is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlsx_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widgets: Vec<Widget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_size: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// The admin form posts numbers as strings.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl PageConfig {
    /// Value of a named field, as text. Empty strings count as absent.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "xlsx_file" => self.xlsx_file.clone(),
            "md_file" => self.md_file.clone(),
            "image_file" => self.image_file.clone(),
            "template" => self.template.clone(),
            "css_file" => self.css_file.clone(),
            "data_source" => self.data_source.clone(),
            "font_size" => self.font_size.map(|n| n.to_string()),
            other => self.extra.get(other).and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn widget_enabled(&self, name: &str) -> bool {
        self.widgets
            .iter()
            .find(|w| w.name == name)
            .is_none_or(|w| w.active)
    }
}

/// A server-defined page: metadata, layout type and data bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    #[serde(alias = "page_id")]
    pub id: PageId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub order: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub config: PageConfig,
}

impl PageDescriptor {
    /// Required config fields of this page's type that are missing or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.page_type
            .config_fields()
            .iter()
            .filter(|f| f.required && self.config.field(f.name).is_none())
            .map(|f| f.name)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Key the carousel caches fetched content under.
    ///
    /// Data-backed pages key by data source, so pages bound to the same source
    /// share one fetch. Markdown and image pages key by their asset path,
    /// which is scoped to the page.
    pub fn content_key(&self) -> Option<String> {
        let asset = |field: &str| {
            self.config
                .field(field)
                .map(|file| format!("pages/{}/{}", self.id, file))
        };
        match self.page_type {
            PageType::TextMarkdown => asset("md_file"),
            PageType::Image => asset("image_file"),
            _ => self.data_source(),
        }
    }

    /// Source passed to `/api/data/{source}`: `data_source`, then `template`,
    /// then the type's default. `None` for asset pages.
    pub fn data_source(&self) -> Option<String> {
        let fallback = self.page_type.default_data_source()?;
        self.config
            .field("data_source")
            .or_else(|| self.config.field("template"))
            .or_else(|| Some(fallback.to_string()))
    }
}

/// Sort descriptors by ascending `order`, breaking ties by id.
pub fn sort_by_order(pages: &mut [PageDescriptor]) {
    pages.sort_by_key(|p| (p.order, p.id));
}
