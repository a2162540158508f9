//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Breathing session presets and timer cadences
//! - Theme and progress bar appearance
//!
//! Configuration is stored at `~/.config/mindfulness/config.toml`.
//! Streaks and session history are deliberately not stored here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::breathing::{Cadence, Preset};
use crate::error::{ConfigError, ValidationError};

/// Breathing session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingConfig {
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,
    #[serde(default = "default_presets")]
    pub presets: Vec<u64>,
    #[serde(default = "default_countdown_interval_ms")]
    pub countdown_interval_ms: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_phase_interval_ms")]
    pub phase_interval_ms: u64,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
    #[serde(default = "default_progress_bar_width")]
    pub progress_bar_width: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mindfulness/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub breathing: BreathingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_duration_secs() -> u64 {
    60
}
fn default_presets() -> Vec<u64> {
    Preset::ALL.iter().map(|preset| preset.secs()).collect()
}
fn default_countdown_interval_ms() -> u64 {
    1000
}
fn default_progress_interval_ms() -> u64 {
    100
}
fn default_phase_interval_ms() -> u64 {
    4000
}
fn default_true() -> bool {
    true
}
fn default_progress_bar_width() -> u32 {
    40
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: default_duration_secs(),
            presets: default_presets(),
            countdown_interval_ms: default_countdown_interval_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            phase_interval_ms: default_phase_interval_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_progress_bar: true,
            progress_bar_width: default_progress_bar_width(),
        }
    }
}

impl BreathingConfig {
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn phase_interval(&self) -> Duration {
        Duration::from_millis(self.phase_interval_ms)
    }

    pub fn cadence(&self) -> Cadence {
        Cadence {
            countdown_ms: self.countdown_interval_ms,
            progress_ms: self.progress_interval_ms,
            phase_ms: self.phase_interval_ms,
        }
    }

    /// Look up `secs` among the configured presets.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownPreset`] if it is not one of them.
    pub fn preset(&self, secs: u64) -> Result<u64, ValidationError> {
        if self.presets.contains(&secs) {
            Ok(secs)
        } else {
            Err(ValidationError::UnknownPreset {
                secs,
                presets: self.presets.clone(),
            })
        }
    }

    /// Reject values that would produce a session that never ticks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("breathing.default_duration_secs", self.default_duration_secs),
            ("breathing.countdown_interval_ms", self.countdown_interval_ms),
            ("breathing.progress_interval_ms", self.progress_interval_ms),
            ("breathing.phase_interval_ms", self.phase_interval_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if self.presets.iter().any(|&secs| secs == 0) {
            return Err(ConfigError::InvalidValue {
                key: "breathing.presets".into(),
                message: "presets must be positive durations in seconds".into(),
            });
        }
        Ok(())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/mindfulness"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.breathing.validate()?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. The config is unchanged on error.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.breathing.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default configuration");
                Self::default()
            }
        }
    }
}
