// Rust guideline compliant 2026-10-12

//! Configuration management for Helpmate.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// Human-readable table format.
    #[default]
    Table,
    /// Plain text format.
    Plain,
}

/// Marketplace configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Platform commission taken from helper earnings (0-100).
    #[serde(default = "default_commission_percent")]
    pub commission_percent: f64,

    /// Whether lifecycle notifications are sent at all.
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,

    /// Starting reliability score for new helper profiles (0-100).
    #[serde(default = "default_reliability_score")]
    pub default_reliability_score: u8,

    /// Distance assumed when a job or helper location is unknown.
    #[serde(default = "default_distance_km")]
    pub default_distance_km: f64,

    /// Maximum chat message length in characters.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Default output format for commands.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Shared secret for payment gateway webhook signatures.
    ///
    /// Webhooks are rejected while no secret is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
}

fn default_commission_percent() -> f64 {
    15.0
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_reliability_score() -> u8 {
    50
}

fn default_distance_km() -> f64 {
    5.0
}

fn default_max_message_len() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commission_percent: default_commission_percent(),
            notifications_enabled: default_notifications_enabled(),
            default_reliability_score: default_reliability_score(),
            default_distance_km: default_distance_km(),
            max_message_len: default_max_message_len(),
            output_format: OutputFormat::default(),
            webhook_secret: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, expected: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Validation(format!("{} must be {}", name, expected))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Loads configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `.helpmate/config.toml`
    /// 3. Environment variables with `HELPMATE_` prefix
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the `.helpmate` directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let config_path = data_dir.join("config.toml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config = toml::from_str(&content)
                .map_err(|e| Error::Validation(format!("Invalid config file: {}", e)))?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `HELPMATE_COMMISSION_PERCENT`
    /// - `HELPMATE_NOTIFICATIONS_ENABLED` (true/false)
    /// - `HELPMATE_DEFAULT_RELIABILITY_SCORE`
    /// - `HELPMATE_DEFAULT_DISTANCE_KM`
    /// - `HELPMATE_MAX_MESSAGE_LEN`
    /// - `HELPMATE_OUTPUT_FORMAT` (json/table/plain)
    /// - `HELPMATE_WEBHOOK_SECRET`
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_parse("HELPMATE_COMMISSION_PERCENT", "a number 0-100")? {
            self.commission_percent = val;
        }
        if let Some(val) = env_parse("HELPMATE_NOTIFICATIONS_ENABLED", "true or false")? {
            self.notifications_enabled = val;
        }
        if let Some(val) = env_parse("HELPMATE_DEFAULT_RELIABILITY_SCORE", "a number 0-100")? {
            self.default_reliability_score = val;
        }
        if let Some(val) = env_parse("HELPMATE_DEFAULT_DISTANCE_KM", "a non-negative number")? {
            self.default_distance_km = val;
        }
        if let Some(val) = env_parse("HELPMATE_MAX_MESSAGE_LEN", "a positive number")? {
            self.max_message_len = val;
        }

        if let Ok(val) = std::env::var("HELPMATE_OUTPUT_FORMAT") {
            self.output_format = match val.as_str() {
                "json" => OutputFormat::Json,
                "table" => OutputFormat::Table,
                "plain" => OutputFormat::Plain,
                _ => {
                    return Err(Error::Validation(
                        "HELPMATE_OUTPUT_FORMAT must be json, table, or plain".to_string(),
                    ))
                }
            };
        }

        if let Ok(val) = std::env::var("HELPMATE_WEBHOOK_SECRET") {
            let val = val.trim();
            self.webhook_secret = (!val.is_empty()).then(|| val.to_string());
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - commission_percent is outside 0-100
    /// - default_reliability_score exceeds 100
    /// - default_distance_km is negative or not finite
    /// - max_message_len is zero
    /// - webhook_secret is set but empty
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.commission_percent) {
            return Err(Error::Validation(format!(
                "commission_percent must be 0-100, got {}",
                self.commission_percent
            )));
        }

        if self.default_reliability_score > 100 {
            return Err(Error::Validation(format!(
                "default_reliability_score must be 0-100, got {}",
                self.default_reliability_score
            )));
        }

        if !self.default_distance_km.is_finite() || self.default_distance_km < 0.0 {
            return Err(Error::Validation(format!(
                "default_distance_km must be non-negative, got {}",
                self.default_distance_km
            )));
        }

        if self.max_message_len == 0 {
            return Err(Error::Validation(
                "max_message_len must be greater than 0".to_string(),
            ));
        }

        if self.webhook_secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(Error::Validation(
                "webhook_secret must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the `.helpmate` directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be created or written
    /// - Serialization fails
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let config_path = data_dir.join("config.toml");
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Storage(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Environment variables are process-global; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 7] = [
        "HELPMATE_COMMISSION_PERCENT",
        "HELPMATE_NOTIFICATIONS_ENABLED",
        "HELPMATE_DEFAULT_RELIABILITY_SCORE",
        "HELPMATE_DEFAULT_DISTANCE_KM",
        "HELPMATE_MAX_MESSAGE_LEN",
        "HELPMATE_OUTPUT_FORMAT",
        "HELPMATE_WEBHOOK_SECRET",
    ];

    fn clear_all_env_vars() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.commission_percent, 15.0);
        assert!(config.notifications_enabled);
        assert_eq!(config.default_reliability_score, 50);
        assert_eq!(config.default_distance_km, 5.0);
        assert_eq!(config.max_message_len, 1000);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn test_config_load_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "commission_percent = 12.5\nmax_message_len = 280\noutput_format = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.commission_percent, 12.5);
        assert_eq!(config.max_message_len, 280);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.default_reliability_score, 50);
    }

    #[test]
    fn test_config_invalid_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "commission_percent = 140.0").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());

        std::fs::write(temp_dir.path().join("config.toml"), "max_message_len = 0").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_file_overridden_by_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "commission_percent = 10.0").unwrap();

        std::env::set_var("HELPMATE_COMMISSION_PERCENT", "20");
        std::env::set_var("HELPMATE_NOTIFICATIONS_ENABLED", "false");
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.commission_percent, 20.0);
        assert!(!config.notifications_enabled);

        clear_all_env_vars();
    }

    #[test]
    fn test_webhook_secret_from_file_and_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "webhook_secret = \"from-file\"").unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.webhook_secret.as_deref(), Some("from-file"));

        std::env::set_var("HELPMATE_WEBHOOK_SECRET", "from-env");
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.webhook_secret.as_deref(), Some("from-env"));
        clear_all_env_vars();

        std::fs::write(temp_dir.path().join("config.toml"), "webhook_secret = \"  \"").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_env_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("HELPMATE_DEFAULT_RELIABILITY_SCORE", "lots");
        assert!(Config::load(temp_dir.path()).is_err());
        clear_all_env_vars();

        std::env::set_var("HELPMATE_OUTPUT_FORMAT", "yaml");
        assert!(Config::load(temp_dir.path()).is_err());
        clear_all_env_vars();
    }

    #[test]
    fn test_config_save_and_load() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        let original = Config {
            commission_percent: 7.5,
            notifications_enabled: false,
            default_reliability_score: 60,
            default_distance_km: 3.0,
            max_message_len: 500,
            output_format: OutputFormat::Plain,
            webhook_secret: Some("whsec-1".to_string()),
        };
        original.save(temp_dir.path()).unwrap();
        let loaded = Config::load(temp_dir.path()).unwrap();
        assert_eq!(original, loaded);
    }
}
