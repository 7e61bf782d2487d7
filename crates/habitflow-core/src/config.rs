//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Streak behavior for an unmarked "today"
//! - Defaults applied to newly created habits
//! - Label language
//!
//! Configuration is stored at `~/.config/habitflow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::frequency::{Locale, TodayPolicy, DEFAULT_TIMES_PER_WEEK};
use crate::habit::Habit;

/// `~/.config/habitflow[-dev]/` based on HABITFLOW_ENV, without touching disk.
fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("habitflow-dev")
    } else {
        base_dir.join("habitflow")
    }
}

/// Returns `~/.config/habitflow[-dev]/` based on HABITFLOW_ENV, creating it.
///
/// Set HABITFLOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Streak configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Do not break a day-based streak while today is still unmarked.
    #[serde(default = "default_true")]
    pub today_grace: bool,
}

/// Defaults for new habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDefaults {
    #[serde(default = "default_times_per_week")]
    pub times_per_week: i64,
    #[serde(default = "default_reminder_time")]
    pub reminder_time: String,
}

/// UI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitflow/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub defaults: HabitDefaults,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_true() -> bool {
    true
}
fn default_times_per_week() -> i64 {
    DEFAULT_TIMES_PER_WEEK
}
fn default_reminder_time() -> String {
    "08:00".into()
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self { today_grace: true }
    }
}

impl Default for HabitDefaults {
    fn default() -> Self {
        Self {
            times_per_week: default_times_per_week(),
            reminder_time: default_reminder_time(),
        }
    }
}

impl HabitDefaults {
    /// A daily habit pre-filled with the configured weekly target and
    /// reminder time, so switching it to times-per-week keeps the target.
    pub fn new_habit(
        &self,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Habit {
        let mut habit = Habit::new(name, icon, color, created_at);
        habit.reminder_time = self.reminder_time.clone();
        habit.frequency.times_per_week = self.times_per_week;
        habit
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
    ) -> std::result::Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || invalid("unknown config key".to_string());

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in parent.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Read the config file if there is one, without creating anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Self> {
        Self::read_at(&config_dir().join("config.toml"))
    }

    /// Like [`Config::load_from`], but a missing file yields the defaults.
    pub fn read_at(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(cfg)
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
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type. The config is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn today_policy(&self) -> TodayPolicy {
        TodayPolicy::from_grace(self.streak.today_grace)
    }

    /// Read from disk, returning default on error. Never writes.
    pub fn read_or_default() -> Self {
        Self::read().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(parsed.streak.today_grace);
        assert_eq!(parsed.defaults.times_per_week, 3);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[ui]\nlocale = \"es\"\n").unwrap();
        assert_eq!(parsed.ui.locale, Locale::Es);
        assert!(parsed.streak.today_grace);
        assert_eq!(parsed.defaults.reminder_time, "08:00");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("streak.today_grace").as_deref(), Some("true"));
        assert_eq!(cfg.get("defaults.times_per_week").as_deref(), Some("3"));
        assert_eq!(cfg.get("ui.locale").as_deref(), Some("en"));
        assert!(cfg.get("ui.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.apply("streak.today_grace", "false").unwrap();
        cfg.apply("defaults.times_per_week", "5").unwrap();
        cfg.apply("ui.locale", "es").unwrap();
        assert_eq!(cfg.today_policy(), TodayPolicy::Strict);
        assert_eq!(cfg.defaults.times_per_week, 5);
        assert_eq!(cfg.ui.locale, Locale::Es);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("ui.nonexistent_key", "value").is_err());
        assert!(cfg.apply("nope", "value").is_err());
        assert!(cfg.apply("streak.", "true").is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("streak.today_grace", "not_a_bool").is_err());
        assert!(cfg.apply("defaults.times_per_week", "many").is_err());
        // unknown locale fails when mapped back onto the struct
        assert!(cfg.apply("ui.locale", "fr").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.defaults.reminder_time = "21:30".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.reminder_time, "21:30");
    }

    #[test]
    fn read_at_missing_file_yields_defaults_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::read_at(&path).unwrap(), Config::default());
        assert!(!path.exists());

        std::fs::write(&path, "[streak]\ntoday_grace = false\n").unwrap();
        assert_eq!(Config::read_at(&path).unwrap().today_policy(), TodayPolicy::Strict);
    }

    #[test]
    fn new_habit_takes_configured_defaults() {
        let defaults = HabitDefaults {
            times_per_week: 5,
            reminder_time: "21:30".into(),
        };
        let mut habit = defaults.new_habit("Gym", "🏋️", "#ef4444", "2024-06-01");
        assert_eq!(habit.reminder_time, "21:30");
        assert_eq!(habit.frequency.times_per_week, 5);
        assert_eq!(habit.frequency.policy(), crate::frequency::Frequency::Daily);

        habit.frequency.frequency_type = crate::FrequencyType::TimesPerWeek;
        assert_eq!(
            habit.frequency.policy(),
            crate::frequency::Frequency::TimesPerWeek(5)
        );
        assert!(crate::validation::validate_habit(&habit).is_ok());
    }

    #[test]
    fn load_from_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "streak = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(crate::CoreError::Config(ConfigError::ParseFailed(_)))
        ));
    }
}
