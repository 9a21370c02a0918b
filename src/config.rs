//! Dashboard configuration, read from `dashboard.toml`.
//!
//! Every field has a default, so an empty or missing file is valid. Values are
//! layered file → environment (`PDASHBOARD_API_URL`) → CLI flags.
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! timeout_ms = 10000
//!
//! [carousel]
//! interval_ms = 10000
//! refresh_ms = 300000
//! clock_ms = 1000
//!
//! [watcher]
//! interval_ms = 30000
//!
//! [admin]
//! save_debounce_ms = 400
//! autoscroll_margin = 60.0
//! autoscroll_step = 18.0
//! autoscroll_tick_ms = 30
//!
//! [notifications]
//! dismiss_ms = 5000
//!
//! [kiosk]
//! port = 8080
//! lan = false
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "dashboard.toml";
pub const API_URL_ENV: &str = "PDASHBOARD_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSection {
    /// Time each slide stays on screen.
    #[serde(default = "default_slide_interval_ms")]
    pub interval_ms: u64,
    /// Period of the full data refresh.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default = "default_clock_ms")]
    pub clock_ms: u64,
}

fn default_slide_interval_ms() -> u64 {
    10_000
}

fn default_refresh_ms() -> u64 {
    300_000
}

fn default_clock_ms() -> u64 {
    1_000
}

impl Default for CarouselSection {
    fn default() -> Self {
        Self {
            interval_ms: default_slide_interval_ms(),
            refresh_ms: default_refresh_ms(),
            clock_ms: default_clock_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherSection {
    #[serde(default = "default_watch_interval_ms")]
    pub interval_ms: u64,
}

fn default_watch_interval_ms() -> u64 {
    30_000
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            interval_ms: default_watch_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSection {
    /// Quiet period before a burst of reorders is saved.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    /// Distance from the viewport edge that starts auto-scroll.
    #[serde(default = "default_autoscroll_margin")]
    pub autoscroll_margin: f64,
    #[serde(default = "default_autoscroll_step")]
    pub autoscroll_step: f64,
    #[serde(default = "default_autoscroll_tick_ms")]
    pub autoscroll_tick_ms: u64,
}

fn default_save_debounce_ms() -> u64 {
    400
}

fn default_autoscroll_margin() -> f64 {
    60.0
}

fn default_autoscroll_step() -> f64 {
    18.0
}

fn default_autoscroll_tick_ms() -> u64 {
    30
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            save_debounce_ms: default_save_debounce_ms(),
            autoscroll_margin: default_autoscroll_margin(),
            autoscroll_step: default_autoscroll_step(),
            autoscroll_tick_ms: default_autoscroll_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSection {
    #[serde(default = "default_dismiss_ms")]
    pub dismiss_ms: u64,
}

fn default_dismiss_ms() -> u64 {
    5_000
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            dismiss_ms: default_dismiss_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskSection {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen on all interfaces so floor screens can connect.
    #[serde(default)]
    pub lan: bool,
}

fn default_port() -> u16 {
    8080
}

impl Default for KioskSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            lan: false,
        }
    }
}

/// Root of `dashboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub carousel: CarouselSection,
    #[serde(default)]
    pub watcher: WatcherSection,
    #[serde(default)]
    pub admin: AdminSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
    #[serde(default)]
    pub kiosk: KioskSection,
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse dashboard.toml")
    }

    /// Load `dashboard.toml` from `dir`, or defaults if there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize dashboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `PDASHBOARD_API_URL` if it is set and non-empty.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api.base_url = url;
        }
        self
    }

    pub fn with_api_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url {
            self.api.base_url = url.to_string();
        }
        self
    }

    /// Problems that would make the dashboard misbehave.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "Invalid api.base_url '{}': must start with http:// or https://",
                self.api.base_url
            ));
        }

        for (name, value) in [
            ("api.timeout_ms", self.api.timeout_ms),
            ("carousel.interval_ms", self.carousel.interval_ms),
            ("carousel.refresh_ms", self.carousel.refresh_ms),
            ("carousel.clock_ms", self.carousel.clock_ms),
            ("watcher.interval_ms", self.watcher.interval_ms),
            ("admin.autoscroll_tick_ms", self.admin.autoscroll_tick_ms),
            ("notifications.dismiss_ms", self.notifications.dismiss_ms),
        ] {
            if value == 0 {
                warnings.push(format!("{} must be greater than zero", name));
            }
        }

        if self.admin.autoscroll_margin < 0.0 {
            warnings.push("admin.autoscroll_margin must not be negative".to_string());
        }
        if self.admin.autoscroll_step <= 0.0 {
            warnings.push("admin.autoscroll_step must be greater than zero".to_string());
        }

        warnings
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_millis(self.carousel.interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.carousel.refresh_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.carousel.clock_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watcher.interval_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.admin.save_debounce_ms)
    }

    pub fn toast_dismiss(&self) -> Duration {
        Duration::from_millis(self.notifications.dismiss_ms)
    }
}
