//! Browser settings read from `settings.toml`

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page size defaults for table sessions.
///
/// # Default
///
/// - `page_limit`: 100
/// - `max_page_limit`: 10,000
/// - `fetch_total_on_open`: false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Rows per page when a session is opened without an explicit limit
    pub page_limit: usize,

    /// Upper bound for any requested page size
    pub max_page_limit: usize,

    /// Count the table's rows as part of opening it
    pub fetch_total_on_open: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            page_limit: 100,
            max_page_limit: 10_000,
            fetch_total_on_open: false,
        }
    }
}

impl BrowserSettings {
    /// Load from the default settings file, falling back to defaults when
    /// it does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid settings in {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_limit == 0 {
            bail!("page_limit must be greater than 0");
        }
        if self.max_page_limit == 0 {
            bail!("max_page_limit must be greater than 0");
        }
        Ok(())
    }

    /// Page size for a session: the requested one or the default, clamped
    /// to `1..=max_page_limit`
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.page_limit)
            .clamp(1, self.max_page_limit.max(1))
    }
}

/// `<config_dir>/tabview/settings.toml`
pub fn settings_file() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("tabview").join("settings.toml"))
}
