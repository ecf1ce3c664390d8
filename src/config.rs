use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::message::Locale;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Persisted settings, stored as JSON in the user config directory
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server_url: Option<String>,
    pub locale: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chatbot-tui").join("config.json"))
    }
}

/// Effective settings after merging CLI/env overrides with the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub locale: Locale,
}

impl Settings {
    /// Overrides win over the file, the file wins over built-in defaults.
    pub fn resolve(config: &Config, url: Option<&str>, locale: Option<Locale>) -> Self {
        let server_url = url
            .map(str::to_string)
            .or_else(|| config.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let locale = locale.unwrap_or_else(|| match config.locale.as_deref() {
            Some(name) => Locale::from_str(name).unwrap_or_else(|| {
                tracing::warn!(locale = name, "unknown locale in config file, using default");
                Locale::default()
            }),
            None => Locale::default(),
        });

        Self { server_url, locale }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "server_url": self.server_url,
            "locale": self.locale.as_str(),
        })
    }
}
