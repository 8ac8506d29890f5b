//! Process-wide configuration: store path and bridge endpoint.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. `<config_dir>/whatsapp-mcp/config.json`
//! 3. `WHATSAPP_DB_PATH` / `WHATSAPP_API_BASE_URL` env vars
//! 4. CLI overrides applied by the binaries
//!
//! CHANGELOG:
//! - 01/28/2026 - Initial implementation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "../whatsapp-bridge/store/messages.db";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

pub const DB_PATH_ENV: &str = "WHATSAPP_DB_PATH";
pub const API_BASE_URL_ENV: &str = "WHATSAPP_API_BASE_URL";

/// Configuration shared by the store and the bridge client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub api_base_url: String,
}

/// On-disk config file; every field optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    db_path: Option<String>,
    api_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("whatsapp-mcp").join("config.json"))
}

/// Expand `~` and env references in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

impl Config {
    /// Load from the default file (if present) and the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = default_config_path() {
            if path.exists() {
                config.apply_file(&path)?;
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from a JSON config file.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if let Some(db_path) = file.db_path {
            self.db_path = expand_path(&db_path);
        }
        if let Some(url) = file.api_base_url {
            self.api_base_url = normalize_base_url(&url);
        }
        tracing::debug!(?path, "loaded config file");
        Ok(())
    }

    /// Overlay values from environment lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            self.db_path = expand_path(&db_path);
        }
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_base_url = normalize_base_url(&url);
        }
    }

    /// Apply CLI overrides.
    pub fn with_overrides(mut self, db_path: Option<&str>, api_base_url: Option<&str>) -> Self {
        if let Some(path) = db_path {
            self.db_path = expand_path(path);
        }
        if let Some(url) = api_base_url {
            self.api_base_url = normalize_base_url(url);
        }
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
