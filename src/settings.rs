use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_API_BASE, Sort};
use crate::feed::{LoaderConfig, PageToken, TriggerConfig};

const APP_SENTINEL: &str = "coloring-gallery-feed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "_app")]
    pub app: String,

    pub api_base: String,

    /// Public site used for "open in browser"
    pub site_url: String,

    pub page_size: usize,

    /// Upper bound on a single page fetch
    pub fetch_timeout_secs: u64,

    /// Rows past the list bottom within which the sentinel counts as visible
    pub sentinel_margin: usize,

    /// Remaining rows below which a scroll event loads more
    pub scroll_threshold: usize,

    /// Delay after first render before the scroll fallback attaches
    pub scroll_settle_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let triggers = TriggerConfig::default();
        Self {
            app: APP_SENTINEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            site_url: "https://coloring-gallery.example".to_string(),
            page_size: 20,
            fetch_timeout_secs: 15,
            sentinel_margin: triggers.sentinel_margin,
            scroll_threshold: triggers.scroll_threshold,
            scroll_settle_ms: triggers.scroll_settle.as_millis() as u64,
            sort: None,
            theme: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.app != APP_SENTINEL {
            bail!(
                "Settings file appears to belong to another application (expected _app = '{}', found '{}')",
                APP_SENTINEL,
                self.app
            );
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn gallery_loader(&self) -> LoaderConfig {
        LoaderConfig {
            page_size: self.page_size,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            first_token: PageToken::first_page(),
        }
    }

    pub fn history_loader(&self) -> LoaderConfig {
        LoaderConfig {
            first_token: PageToken::first_cursor(),
            ..self.gallery_loader()
        }
    }

    pub fn triggers(&self) -> TriggerConfig {
        TriggerConfig {
            sentinel_margin: self.sentinel_margin,
            scroll_threshold: self.scroll_threshold,
            scroll_settle: Duration::from_millis(self.scroll_settle_ms),
        }
    }
}

pub fn config_dir(custom: Option<&PathBuf>) -> Option<PathBuf> {
    custom
        .cloned()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config").join("gallery")))
}

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.toml")
}

pub fn log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("gallery.log")
}
