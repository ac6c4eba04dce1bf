//! Configuration file management for flashrec.
//!
//! This module handles loading and saving the recorder configuration from a TOML file
//! in the user's config directory. Storage sits behind [`SettingsStore`] so the resolver
//! can be exercised without touching the filesystem.

use super::shortcut::{DEFAULT_PLAY_SHORTCUT, DEFAULT_RECORD_SHORTCUT};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::PathBuf;

/// Gain used when none is configured or the configured value is not a number.
pub const DEFAULT_GAIN: f64 = 1.25;

/// Gain written into a freshly synthesized configuration.
pub const FIRST_RUN_GAIN: f64 = 1.0;

/// Audio capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `flashrec list-devices`
    /// - device name from `flashrec list-devices`
    #[serde(default = "default_device", deserialize_with = "lenient_text")]
    pub device: String,
}

fn default_device() -> String {
    "default".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
        }
    }
}

/// Complete recorder configuration as persisted.
///
/// Values are kept as written by the user; [`super::Settings`] validates and
/// clamps them when they are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Folder for new recordings. Empty means the collection's media folder.
    #[serde(default, deserialize_with = "lenient_text")]
    pub save_dir: String,
    /// Linear gain applied after each recording. Numbers and numeric strings are accepted.
    #[serde(default = "default_gain")]
    pub gain: toml::Value,
    /// Chord that toggles recording
    #[serde(default = "default_record_shortcut", deserialize_with = "lenient_text")]
    pub record_shortcut: String,
    /// Chord that plays the last recording
    #[serde(default = "default_play_shortcut", deserialize_with = "lenient_text")]
    pub play_shortcut: String,
    #[serde(default, deserialize_with = "lenient_audio")]
    pub audio: AudioConfig,
}

fn default_gain() -> toml::Value {
    toml::Value::Float(DEFAULT_GAIN)
}

fn default_record_shortcut() -> String {
    DEFAULT_RECORD_SHORTCUT.to_string()
}

fn default_play_shortcut() -> String {
    DEFAULT_PLAY_SHORTCUT.to_string()
}

/// Scalars of any type are kept as text so the resolver can validate them.
/// Arrays and tables become empty, which resolves to the field's default.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match toml::Value::deserialize(deserializer)? {
        toml::Value::String(s) => s,
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        other => {
            tracing::warn!("Ignoring non-text config value {other}");
            String::new()
        }
    })
}

fn lenient_audio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AudioConfig, D::Error> {
    let value = toml::Value::deserialize(deserializer)?;
    Ok(value.try_into().unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid [audio] section: {e}");
        AudioConfig::default()
    }))
}

impl RecorderConfig {
    /// Configuration written when none exists yet. Recordings start at unity gain.
    pub fn first_run() -> Self {
        Self {
            gain: toml::Value::Float(FIRST_RUN_GAIN),
            ..Self::default()
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            save_dir: String::new(),
            gain: default_gain(),
            record_shortcut: default_record_shortcut(),
            play_shortcut: default_play_shortcut(),
            audio: AudioConfig::default(),
        }
    }
}

/// Backing storage for the recorder configuration.
pub trait SettingsStore {
    /// Reads the stored configuration, `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> anyhow::Result<Option<RecorderConfig>>;

    /// Persists the configuration, replacing what was stored.
    fn write(&mut self, config: &RecorderConfig) -> anyhow::Result<()>;
}

/// Configuration stored as TOML on disk.
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    /// Store at `~/.config/flashrec/flashrec.toml`.
    ///
    /// # Errors
    /// - If the home directory cannot be determined
    pub fn from_default_location() -> anyhow::Result<Self> {
        Ok(Self {
            path: get_config_path()?,
        })
    }

    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsStore for TomlStore {
    fn read(&self) -> anyhow::Result<Option<RecorderConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let config: RecorderConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Malformed config {}: {e}", self.path.display()))?;
        Ok(Some(config))
    }

    fn write(&mut self, config: &RecorderConfig) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        tracing::info!("Configuration saved to {}", self.path.display());
        Ok(())
    }
}

/// Configuration held in memory only.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    config: Option<RecorderConfig>,
    writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_config(config: RecorderConfig) -> Self {
        Self {
            config: Some(config),
            writes: 0,
        }
    }

    /// Number of times the configuration has been written.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl SettingsStore for MemoryStore {
    fn read(&self) -> anyhow::Result<Option<RecorderConfig>> {
        Ok(self.config.clone())
    }

    fn write(&mut self, config: &RecorderConfig) -> anyhow::Result<()> {
        self.config = Some(config.clone());
        self.writes += 1;
        Ok(())
    }
}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("flashrec").join("flashrec.toml"))
}
