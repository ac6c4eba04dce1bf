//! Configuration management for flashrec.
//!
//! This module handles the persisted recorder settings and the rules for turning them
//! into usable values: the save directory, the gain factor and the two shortcuts.
//! Defaults are synthesized and written back the first time the settings are read.

pub mod file;
pub mod shortcut;

pub use file::{
    get_config_path, RecorderConfig, SettingsStore, TomlStore, DEFAULT_GAIN, FIRST_RUN_GAIN,
};
pub use shortcut::{
    KeyChord, DEFAULT_PLAY_CHORD, DEFAULT_PLAY_SHORTCUT, DEFAULT_RECORD_CHORD,
    DEFAULT_RECORD_SHORTCUT,
};

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Smallest gain applied to a recording.
pub const MIN_GAIN: f64 = 0.1;
/// Largest gain applied to a recording.
pub const MAX_GAIN: f64 = 5.0;

/// Resolved view over a [`SettingsStore`].
pub struct Settings<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored configuration.
    ///
    /// When nothing is stored yet, a first-run configuration is written back. A
    /// store that cannot be read is logged and defaults are used without
    /// overwriting it.
    pub fn config(&mut self) -> RecorderConfig {
        match self.store.read() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = RecorderConfig::first_run();
                if let Err(e) = self.store.write(&config) {
                    tracing::warn!("Failed to write default configuration: {e}");
                }
                config
            }
            Err(e) => {
                tracing::error!("Failed to read configuration, using defaults: {e}");
                RecorderConfig::default()
            }
        }
    }

    /// Folder new recordings are written to.
    ///
    /// The configured folder when set, otherwise `media_dir`.
    pub fn save_dir(&mut self, media_dir: &Path) -> PathBuf {
        let raw = self.config().save_dir;
        let raw = raw.trim();
        if raw.is_empty() {
            media_dir.to_path_buf()
        } else {
            PathBuf::from(raw)
        }
    }

    /// Gain factor, clamped to `MIN_GAIN..=MAX_GAIN`.
    pub fn gain(&mut self) -> f64 {
        resolve_gain(&self.config().gain)
    }

    pub fn record_shortcut(&mut self) -> KeyChord {
        resolve_shortcut(&self.config().record_shortcut, DEFAULT_RECORD_CHORD)
    }

    pub fn play_shortcut(&mut self) -> KeyChord {
        resolve_shortcut(&self.config().play_shortcut, DEFAULT_PLAY_CHORD)
    }

    /// Raw record shortcut text for prefilling an editor, falling back to the default.
    pub fn record_shortcut_text(&mut self) -> String {
        non_empty_or(self.config().record_shortcut, DEFAULT_RECORD_SHORTCUT)
    }

    /// Raw play shortcut text for prefilling an editor, falling back to the default.
    pub fn play_shortcut_text(&mut self) -> String {
        non_empty_or(self.config().play_shortcut, DEFAULT_PLAY_SHORTCUT)
    }

    /// Audio device name from the `[audio]` table.
    pub fn audio_device(&mut self) -> String {
        self.config().audio.device
    }

    /// Persists a new save folder.
    ///
    /// # Errors
    /// - If the store cannot be written
    /// - If the stored configuration cannot be read
    pub fn set_save_dir(&mut self, dir: &Path) -> anyhow::Result<()> {
        let mut config = self.stored()?;
        config.save_dir = dir.to_string_lossy().into_owned();
        self.store.write(&config)
    }

    /// Persists both shortcuts in canonical form.
    ///
    /// # Errors
    /// - If the store cannot be written
    /// - If the stored configuration cannot be read
    pub fn set_shortcuts(&mut self, record: &KeyChord, play: &KeyChord) -> anyhow::Result<()> {
        let mut config = self.stored()?;
        config.record_shortcut = record.to_string();
        config.play_shortcut = play.to_string();
        self.store.write(&config)
    }

    /// Configuration to update before a write. An unreadable store is never overwritten.
    fn stored(&self) -> anyhow::Result<RecorderConfig> {
        let config = self
            .store
            .read()
            .context("Refusing to overwrite a configuration that cannot be read")?;
        Ok(config.unwrap_or_else(RecorderConfig::first_run))
    }
}

/// Parses a configured gain and clamps it to the accepted range.
pub fn resolve_gain(value: &toml::Value) -> f64 {
    let parsed = match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    clamp_gain(parsed.unwrap_or(DEFAULT_GAIN))
}

/// Clamps a gain to `MIN_GAIN..=MAX_GAIN`. NaN and infinities become `DEFAULT_GAIN`.
pub fn clamp_gain(gain: f64) -> f64 {
    if !gain.is_finite() {
        tracing::warn!("Ignoring non-finite gain {gain}, using {DEFAULT_GAIN}");
        return DEFAULT_GAIN;
    }
    gain.clamp(MIN_GAIN, MAX_GAIN)
}

fn resolve_shortcut(raw: &str, default: KeyChord) -> KeyChord {
    match raw.parse::<KeyChord>() {
        Ok(chord) => chord,
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::warn!("Ignoring invalid shortcut '{raw}' ({e}), using {default}");
            }
            default
        }
    }
}

fn non_empty_or(raw: String, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
