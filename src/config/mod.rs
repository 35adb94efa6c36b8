use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::table::TableOptions;

/// Optional theme overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Rows per page when the table opens
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Page sizes the selector cycles through
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_page_size() -> usize {
    TableOptions::default().page_size
}

fn default_page_size_options() -> Vec<usize> {
    TableOptions::default().page_size_options
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("fleetgrid");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // a broken file is left untouched
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Paging options for the table, with an optional page size override
    pub fn table_options(&self, page_size: Option<usize>) -> TableOptions {
        TableOptions {
            page_size: page_size.unwrap_or(self.page_size),
            page_size_options: self.page_size_options.clone(),
        }
    }
}
