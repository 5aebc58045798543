//! # Settings Module
//!
//! ## Purpose
//! Persistent user settings of the balancer shell: log level and what is printed next to a
//! balanced equation. The library itself never reads them; the binary and the interactive menu
//! pass the values into the balancing functions.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "log_level": "info",
//!   "show_explanation": true,
//!   "show_oxidation_table": false,
//!   "trace": false
//! }
//! ```
//! Missing keys take their default values, a missing file means all defaults.
//!
//! ## Usage Patterns
//! ```rust,no_run
//! use RedoxBalancer::settings::{with_config, with_config_mut};
//!
//! let explain = with_config(|manager| manager.get_config().show_explanation);
//! let _ = with_config_mut(|manager| manager.set_flag("trace", !explain));
//! ```
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "balancer_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access the configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown log level: {0}")]
    UnknownLogLevel(String),
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value {value} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// one of off, error, warn, info, debug, trace
    pub log_level: String,
    /// print the Penjelasan block after a half-reaction result
    pub show_explanation: bool,
    pub show_oxidation_table: bool,
    /// print the intermediate steps of every run
    pub trace: bool,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_explanation: true,
            show_oxidation_table: false,
            trace: false,
        }
    }
}

impl BalancerConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

fn parse_level(level: &str) -> Result<String, ConfigError> {
    level
        .parse::<LevelFilter>()
        .map(|_| level.to_lowercase())
        .map_err(|_| ConfigError::UnknownLogLevel(level.to_string()))
}

/// Loads, changes and saves the configuration file. Every change is saved right away.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BalancerConfig,
    config_file: String,
}

impl ConfigManager {
    /// Uses `balancer_config.json` in the working directory.
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    /// An unreadable or malformed file is reported and replaced by the defaults.
    pub fn with_config_file(config_file: &str) -> Self {
        let config = Self::load_config(config_file).unwrap_or_else(|e| {
            warn!("{}, using default settings", e);
            BalancerConfig::default()
        });
        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    pub fn load_config(config_file: &str) -> Result<BalancerConfig, ConfigError> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: BalancerConfig = serde_json::from_str(&content)?;
            parse_level(&config.log_level)?;
            Ok(config)
        } else {
            Ok(BalancerConfig::default())
        }
    }

    pub fn save_config(&self) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        info!("settings saved to {}", self.config_file);
        Ok(())
    }

    pub fn get_config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn set_log_level(&mut self, level: &str) -> Result<(), ConfigError> {
        self.config.log_level = parse_level(level)?;
        self.save_config()
    }

    /// Sets one of `show_explanation`, `show_oxidation_table`, `trace`.
    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<(), ConfigError> {
        *self.flag_mut(key)? = value;
        self.save_config()
    }

    fn flag_mut(&mut self, key: &str) -> Result<&mut bool, ConfigError> {
        match key {
            "show_explanation" => Ok(&mut self.config.show_explanation),
            "show_oxidation_table" => Ok(&mut self.config.show_oxidation_table),
            "trace" => Ok(&mut self.config.trace),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Updates several settings at once; nothing changes unless every key and value is valid.
    ///
    /// # Example
    /// ```rust
    /// use std::collections::HashMap;
    /// use RedoxBalancer::settings::ConfigManager;
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("settings.json");
    /// let mut manager = ConfigManager::with_config_file(path.to_str().unwrap());
    /// let mut updates = HashMap::new();
    /// updates.insert("log_level", "debug");
    /// updates.insert("trace", "true");
    /// manager.update(updates).unwrap();
    /// assert!(manager.get_config().trace);
    /// ```
    pub fn update(&mut self, updates: HashMap<&str, &str>) -> Result<(), ConfigError> {
        let mut updated = self.config.clone();
        for (key, value) in &updates {
            match *key {
                "log_level" => updated.log_level = parse_level(value)?,
                "show_explanation" | "show_oxidation_table" | "trace" => {
                    let flag: bool = value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                    match *key {
                        "show_explanation" => updated.show_explanation = flag,
                        "show_oxidation_table" => updated.show_oxidation_table = flag,
                        _ => updated.trace = flag,
                    }
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }
        self.config = updated;
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = BalancerConfig::default();
        self.save_config()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide configuration, created from `balancer_config.json` on first use
static GLOBAL_CONFIG_MANAGER: OnceLock<Mutex<ConfigManager>> = OnceLock::new();

fn get_config_manager() -> MutexGuard<'static, ConfigManager> {
    GLOBAL_CONFIG_MANAGER
        .get_or_init(|| Mutex::new(ConfigManager::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the process-wide manager, e.g. with one reading a `--config` file.
pub fn install_config_manager(manager: ConfigManager) {
    let cell = GLOBAL_CONFIG_MANAGER.get_or_init(|| Mutex::new(manager.clone()));
    *cell.lock().unwrap_or_else(PoisonError::into_inner) = manager;
}

pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&ConfigManager) -> R,
{
    let manager = get_config_manager();
    f(&manager)
}

pub fn with_config_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut ConfigManager) -> R,
{
    let mut manager = get_config_manager();
    f(&mut manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let manager = ConfigManager::with_config_file(path.to_str().unwrap());
        assert_eq!(manager.get_config(), &BalancerConfig::default());
        assert_eq!(manager.get_config().level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_config = NamedTempFile::new().unwrap();
        let path = temp_config.path().to_str().unwrap();
        let mut manager = ConfigManager::with_config_file(path);
        manager.set_flag("show_oxidation_table", true).unwrap();
        manager.set_log_level("DEBUG").unwrap();

        let reloaded = ConfigManager::with_config_file(path);
        assert!(reloaded.get_config().show_oxidation_table);
        assert_eq!(reloaded.get_config().log_level, "debug");
        assert_eq!(reloaded.get_config().level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config.write_all(br#"{"trace": true}"#).unwrap();
        let config = ConfigManager::load_config(temp_config.path().to_str().unwrap()).unwrap();
        assert!(config.trace);
        assert!(config.show_explanation);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_malformed_file() {
        let mut temp_config = NamedTempFile::new().unwrap();
        temp_config.write_all(b"{ not json").unwrap();
        let path = temp_config.path().to_str().unwrap();
        assert!(matches!(
            ConfigManager::load_config(path),
            Err(ConfigError::Json(_))
        ));
        let manager = ConfigManager::with_config_file(path);
        assert_eq!(manager.get_config(), &BalancerConfig::default());

        let mut bad_level = NamedTempFile::new().unwrap();
        bad_level.write_all(br#"{"log_level": "loud"}"#).unwrap();
        assert!(matches!(
            ConfigManager::load_config(bad_level.path().to_str().unwrap()),
            Err(ConfigError::UnknownLogLevel(_))
        ));
    }

    #[test]
    fn test_invalid_changes_are_rejected() {
        let temp_config = NamedTempFile::new().unwrap();
        let mut manager = ConfigManager::with_config_file(temp_config.path().to_str().unwrap());
        assert!(matches!(
            manager.set_log_level("loud"),
            Err(ConfigError::UnknownLogLevel(_))
        ));
        assert!(matches!(
            manager.set_flag("colour", true),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(manager.get_config(), &BalancerConfig::default());
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let temp_config = NamedTempFile::new().unwrap();
        let mut manager = ConfigManager::with_config_file(temp_config.path().to_str().unwrap());

        let mut updates = HashMap::new();
        updates.insert("trace", "true");
        updates.insert("show_explanation", "maybe");
        assert!(matches!(
            manager.update(updates),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(!manager.get_config().trace);

        let mut updates = HashMap::new();
        updates.insert("trace", "true");
        updates.insert("log_level", "warn");
        manager.update(updates).unwrap();
        assert!(manager.get_config().trace);
        assert_eq!(manager.get_config().level_filter(), LevelFilter::Warn);

        manager.reset_to_defaults().unwrap();
        assert_eq!(manager.get_config(), &BalancerConfig::default());
    }

    #[test]
    fn test_global_manager() {
        let temp_config = NamedTempFile::new().unwrap();
        let path = temp_config.path().to_str().unwrap().to_string();
        install_config_manager(ConfigManager::with_config_file(&path));
        with_config_mut(|manager| manager.set_flag("trace", true)).unwrap();
        assert!(with_config(|manager| manager.get_config().trace));
        assert_eq!(with_config(|manager| manager.config_file().to_string()), path);
    }
}
