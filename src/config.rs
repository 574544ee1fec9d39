//! Engine settings loaded from TOML.
//!
//! Settings live in `$CLIPSYNC_CONFIG` if set, otherwise in
//! `<config dir>/clipsync/config.toml`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CLIPSYNC_CONFIG";

/// Timing knobs for seek handling and drift correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Watchdog for frame-accurate seeks
    pub seek_timeout_ms: u64,
    /// Sleep between seek status polls (0 = busy poll)
    pub seek_poll_interval_ms: u64,
    /// Minimum time between two drift checks of one clip
    pub drift_check_interval_secs: f64,
    /// Offsets below `-ratio * length` are treated as a loop wraparound
    pub loop_unwrap_ratio: f64,
    /// Timeline duration for clips whose media length is unknown
    pub default_clip_duration_secs: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            seek_timeout_ms: 5000,
            seek_poll_interval_ms: 1,
            drift_check_interval_secs: 1.0,
            loop_unwrap_ratio: 0.9,
            default_clip_duration_secs: 30.0,
        }
    }
}

impl SyncSettings {
    pub fn seek_timeout(&self) -> Duration {
        Duration::from_millis(self.seek_timeout_ms)
    }

    pub fn seek_poll_interval(&self) -> Duration {
        Duration::from_millis(self.seek_poll_interval_ms)
    }

    pub fn drift_check_interval(&self) -> Duration {
        Duration::from_secs_f64(self.drift_check_interval_secs.max(0.0))
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.seek_timeout_ms == 0 {
            bail!("seek_timeout_ms must be greater than zero");
        }
        if !(self.drift_check_interval_secs >= 0.0) {
            bail!("drift_check_interval_secs must be non-negative");
        }
        if !(self.loop_unwrap_ratio > 0.0 && self.loop_unwrap_ratio <= 1.0) {
            bail!("loop_unwrap_ratio must be in (0, 1]");
        }
        if !(self.default_clip_duration_secs > 0.0) {
            bail!("default_clip_duration_secs must be positive");
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncSettings,
}

impl Config {
    /// Location of the config file.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("clipsync").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.sync.validate()?;
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
