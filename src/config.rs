// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! On-disk configuration at `~/.shopfloor/config.json`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::security::{GuardConfig, DEFAULT_DISPOSE_TIMEOUT_SECS, DEFAULT_SESSION_WINDOW_SECS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The single admin identity allowed to unlock configuration screens
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Secret paired with `admin_username`
    #[serde(default = "default_admin_secret")]
    pub admin_secret: String,
    /// Idle seconds before an admin session lapses (default: 30)
    #[serde(default = "default_session_window_secs")]
    pub session_window_secs: u64,
    /// Seconds shutdown waits for a pending countdown (default: 60)
    #[serde(default = "default_dispose_timeout_secs")]
    pub dispose_timeout_secs: u64,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_secret() -> String {
    "admin".to_string()
}

fn default_session_window_secs() -> u64 {
    DEFAULT_SESSION_WINDOW_SECS
}

fn default_dispose_timeout_secs() -> u64 {
    DEFAULT_DISPOSE_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_secret: default_admin_secret(),
            session_window_secs: default_session_window_secs(),
            dispose_timeout_secs: default_dispose_timeout_secs(),
        }
    }
}

impl Config {
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig::new(&self.admin_username, &self.admin_secret)
            .with_window(Duration::from_secs(self.session_window_secs))
            .with_dispose_timeout(Duration::from_secs(self.dispose_timeout_secs))
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let config_dir = home.join(".shopfloor");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    }
    Ok(config_dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Read a config file, falling back to defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config in {}", path.display()))?;

    if config.session_window_secs == 0 {
        tracing::warn!("session_window_secs is 0; admin sessions will lapse immediately");
    }

    Ok(config)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
