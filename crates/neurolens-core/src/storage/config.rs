//! TOML-based application configuration.
//!
//! Stores:
//! - Notification and sound preferences
//! - Metric simulation parameters
//! - Reminder and fatigue watchdog intervals and thresholds
//! - How many sessions of history are kept
//!
//! Configuration is stored at `~/.config/neurolens/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::fatigue::FatigueWatchdog;
use crate::metrics::RandomMetricSource;
use crate::notify::Preferences;
use crate::reminder::ReminderSettings;
use crate::session::DEFAULT_HISTORY_LIMIT;
use crate::timer::TimerIntervals;

/// Metric simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_blink_interval_secs")]
    pub blink_interval_secs: u64,
    #[serde(default = "default_blink_probability")]
    pub blink_probability: f64,
    #[serde(default = "default_rate_interval_secs")]
    pub rate_interval_secs: u64,
    #[serde(default = "default_rate_min")]
    pub rate_min: u32,
    #[serde(default = "default_rate_max")]
    pub rate_max: u32,
}

/// Reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_break_interval_mins")]
    pub break_interval_mins: u64,
    #[serde(default = "default_low_blink_window_secs")]
    pub low_blink_window_secs: u64,
    #[serde(default = "default_low_blink_threshold")]
    pub low_blink_threshold: u32,
    #[serde(default = "default_tip_interval_mins")]
    pub tip_interval_mins: u64,
}

/// Fatigue watchdog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueConfig {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_fatigue_threshold")]
    pub fatigue_threshold: u32,
    #[serde(default = "default_drowsy_threshold")]
    pub drowsy_threshold: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/neurolens/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub fatigue: FatigueConfig,
}

// Default functions
fn default_blink_interval_secs() -> u64 {
    3
}
fn default_blink_probability() -> f64 {
    0.3
}
fn default_rate_interval_secs() -> u64 {
    10
}
fn default_rate_min() -> u32 {
    13
}
fn default_rate_max() -> u32 {
    22
}
fn default_break_interval_mins() -> u64 {
    20
}
fn default_low_blink_window_secs() -> u64 {
    30
}
fn default_low_blink_threshold() -> u32 {
    12
}
fn default_tip_interval_mins() -> u64 {
    30
}
fn default_check_interval_secs() -> u64 {
    15
}
fn default_fatigue_threshold() -> u32 {
    8
}
fn default_drowsy_threshold() -> u32 {
    10
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            blink_interval_secs: default_blink_interval_secs(),
            blink_probability: default_blink_probability(),
            rate_interval_secs: default_rate_interval_secs(),
            rate_min: default_rate_min(),
            rate_max: default_rate_max(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            break_interval_mins: default_break_interval_mins(),
            low_blink_window_secs: default_low_blink_window_secs(),
            low_blink_threshold: default_low_blink_threshold(),
            tip_interval_mins: default_tip_interval_mins(),
        }
    }
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            fatigue_threshold: default_fatigue_threshold(),
            drowsy_threshold: default_drowsy_threshold(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            preferences: Preferences::default(),
            simulation: SimulationConfig::default(),
            reminders: RemindersConfig::default(),
            fatigue: FatigueConfig::default(),
        }
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

        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a leaf key".to_string()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location: `<data_dir>/config.toml`.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn nonzero(key: &str, value: u64) -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            Ok(())
        }

        nonzero("history_limit", self.history_limit as u64)?;
        nonzero("simulation.blink_interval_secs", self.simulation.blink_interval_secs)?;
        nonzero("simulation.rate_interval_secs", self.simulation.rate_interval_secs)?;
        nonzero("reminders.break_interval_mins", self.reminders.break_interval_mins)?;
        nonzero("reminders.low_blink_window_secs", self.reminders.low_blink_window_secs)?;
        nonzero("reminders.tip_interval_mins", self.reminders.tip_interval_mins)?;
        nonzero("fatigue.check_interval_secs", self.fatigue.check_interval_secs)?;

        let p = self.simulation.blink_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidValue {
                key: "simulation.blink_probability".to_string(),
                message: format!("{p} is outside [0, 1]"),
            });
        }
        if self.simulation.rate_min > self.simulation.rate_max {
            return Err(ConfigError::InvalidValue {
                key: "simulation.rate_min".to_string(),
                message: format!(
                    "{} is above simulation.rate_max ({})",
                    self.simulation.rate_min, self.simulation.rate_max
                ),
            });
        }
        if self.fatigue.fatigue_threshold > self.fatigue.drowsy_threshold {
            return Err(ConfigError::InvalidValue {
                key: "fatigue.fatigue_threshold".to_string(),
                message: format!(
                    "{} is above fatigue.drowsy_threshold ({})",
                    self.fatigue.fatigue_threshold, self.fatigue.drowsy_threshold
                ),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key with its current value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out.sort();
        out
    }

    /// Set a value by key without touching disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn timer_intervals(&self) -> TimerIntervals {
        let secs = |n: u64| Duration::seconds(n as i64);
        let mins = |n: u64| Duration::minutes(n as i64);
        TimerIntervals {
            blink_sample: secs(self.simulation.blink_interval_secs),
            rate_sample: secs(self.simulation.rate_interval_secs),
            break_reminder: mins(self.reminders.break_interval_mins),
            health_tip: mins(self.reminders.tip_interval_mins),
            fatigue_check: secs(self.fatigue.check_interval_secs),
            ..TimerIntervals::default()
        }
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            low_blink_window: Duration::seconds(self.reminders.low_blink_window_secs as i64),
            low_blink_threshold: self.reminders.low_blink_threshold,
        }
    }

    pub fn watchdog(&self) -> FatigueWatchdog {
        FatigueWatchdog::new(self.fatigue.fatigue_threshold, self.fatigue.drowsy_threshold)
    }

    pub fn metric_source(&self, seed: Option<u64>) -> RandomMetricSource {
        RandomMetricSource::new(
            self.simulation.blink_probability,
            self.simulation.rate_min..=self.simulation.rate_max,
            seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[preferences]\nsound = false\n").unwrap();
        assert!(!parsed.preferences.sound);
        assert!(parsed.preferences.notifications);
        assert_eq!(parsed.simulation.rate_max, 22);
        assert_eq!(parsed.history_limit, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("preferences.notifications").as_deref(), Some("true"));
        assert_eq!(cfg.get("fatigue.check_interval_secs").as_deref(), Some("15"));
        assert_eq!(cfg.get("simulation.blink_probability").as_deref(), Some("0.3"));
        assert!(cfg.get("preferences.missing_key").is_none());
        assert!(cfg.get("fatigue").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("preferences.reduced_alerts", "true").unwrap();
        cfg.apply("reminders.break_interval_mins", "25").unwrap();
        cfg.apply("simulation.blink_probability", "0.5").unwrap();
        assert!(cfg.preferences.reduced_alerts);
        assert_eq!(cfg.reminders.break_interval_mins, 25);
        assert_eq!(cfg.simulation.blink_probability, 0.5);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("preferences.theme", "dark").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("preferences.sound", "loud").is_err());
        assert!(cfg.apply("fatigue.fatigue_threshold", "-1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_values_that_fail_validation() {
        let mut cfg = Config::default();
        assert!(cfg.apply("simulation.rate_min", "30").is_err());
        assert!(cfg.apply("simulation.blink_probability", "1.5").is_err());
        assert!(cfg.apply("fatigue.check_interval_secs", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_list_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries.contains(&("history_limit".to_string(), "30".to_string())));
        assert!(entries.contains(&("reminders.tip_interval_mins".to_string(), "30".to_string())));
        assert_eq!(entries.len(), 16);
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simulation]\nrate_min = 40\nrate_max = 10\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn conversions_use_configured_values() {
        let mut cfg = Config::default();
        cfg.fatigue.check_interval_secs = 5;
        cfg.reminders.low_blink_threshold = 9;
        let intervals = cfg.timer_intervals();
        assert_eq!(intervals.fatigue_check, Duration::seconds(5));
        assert_eq!(intervals.session_tick, Duration::seconds(1));
        assert_eq!(intervals.break_reminder, Duration::minutes(20));
        assert_eq!(cfg.reminder_settings().low_blink_threshold, 9);
    }
}
