//! # Configuration Module
//!
//! Bot settings and data locations.
//!
//! ## Data Storage
//!
//! The catalog database lives in the platform data directory:
//! - Linux: `~/.local/share/enigma/catalog.db`
//! - macOS: `~/Library/Application Support/enigma/catalog.db`
//! - Windows: `%APPDATA%\enigma\catalog.db`
//!
//! Settings are read from `config.json` in the platform config directory
//! (`~/.config/enigma/config.json` on Linux). A missing file means defaults;
//! every field is optional.
//!
//! ```json
//! { "command_channel": "music", "poll_timeout_secs": 30 }
//! ```

use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::recommend::RecommendConfig;

/// Returns the platform data directory for Enigma, creating it if needed.
///
/// # Errors
///
/// Fails if the system data directory cannot be determined or the
/// `enigma` subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let enigma_dir = data_dir.join("enigma");
    fs::create_dir_all(&enigma_dir).with_context(|| {
        format!(
            "Failed to create Enigma data directory at {}. Please check file permissions.",
            enigma_dir.display()
        )
    })?;

    Ok(enigma_dir)
}

/// Default catalog database location: `<data dir>/enigma/catalog.db`.
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("catalog.db"))
}

/// Default settings file location. The directory is not created.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine system config directory."))?;
    Ok(config_dir.join("enigma").join("config.json"))
}

/// Turn a user-supplied path into an absolute one relative to the working directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?
        .into_owned())
}

/// Runtime settings for the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name used in log lines, e.g. `ENIGMA (alice /queue) ...`.
    pub bot_name: String,
    pub command_prefix: String,
    /// Only messages posted in this channel are treated as commands.
    pub command_channel: String,
    pub poll_size: usize,
    pub poll_max_selections: usize,
    pub poll_timeout_secs: u64,
    pub recommend_timeout_secs: u64,
    pub artist_limit: usize,
    pub max_recommendations: usize,
    /// Catalog database. `None` means [`get_db_path`].
    pub db_path: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: "ENIGMA".to_string(),
            command_prefix: "/".to_string(),
            command_channel: "general".to_string(),
            poll_size: 10,
            poll_max_selections: 3,
            poll_timeout_secs: 60,
            recommend_timeout_secs: 300,
            artist_limit: 2,
            max_recommendations: 10,
            db_path: None,
        }
    }
}

impl BotConfig {
    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config.sanitized())
    }

    /// Clamp values that would make the bot unusable.
    #[must_use]
    fn sanitized(mut self) -> Self {
        self.poll_size = self.poll_size.clamp(1, 10);
        self.max_recommendations = self.max_recommendations.clamp(1, 10);
        self.poll_max_selections = self.poll_max_selections.max(1);
        self.artist_limit = self.artist_limit.max(1);
        if self.command_prefix.is_empty() {
            self.command_prefix = "/".to_string();
        }
        self
    }

    /// Resolved catalog path: explicit setting or the platform default.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => absolute(path),
            None => get_db_path(),
        }
    }

    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    #[must_use]
    pub fn recommend_timeout(&self) -> Duration {
        Duration::from_secs(self.recommend_timeout_secs)
    }

    #[must_use]
    pub fn recommend_config(&self) -> RecommendConfig {
        RecommendConfig {
            artist_limit: self.artist_limit,
            max_results: self.max_recommendations,
        }
    }
}
