use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub api: ApiSettings,
    #[serde(default)]
    #[validate(nested)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiSettings {
    #[validate(url)]
    pub base_url: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollingSettings {
    /// Queue polling period in seconds.
    #[serde(default = "default_poll_interval_secs")]
    #[validate(range(min = 1, max = 300))]
    pub interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 { 5 }

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with GMATCH_)
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with GMATCH__)
            // e.g., GMATCH__POLLING__INTERVAL_SECS -> polling.interval_secs
            .add_source(
                Environment::with_prefix("GMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        let settings: Settings = settings.try_deserialize().map_err(SettingsError::Load)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("GMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize().map_err(SettingsError::Load)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Shorthand environment overrides for the two values deployments set most:
/// GMATCH_API_URL for the API base and GMATCH_SESSION_TOKEN for the session.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("GMATCH_API_URL") {
        builder = builder.set_override("api.base_url", url)?;
    }
    if let Ok(token) = env::var("GMATCH_SESSION_TOKEN") {
        builder = builder.set_override("api.session_token", token)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_polling() {
        let polling = PollingSettings::default();
        assert_eq!(polling.interval_secs, 5);
        assert_eq!(polling.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_settings_parse_from_toml() {
        let raw = r#"
            [api]
            base_url = "http://localhost:8000/api/v1alpha1"

            [polling]
            interval_secs = 10
        "#;
        let settings: Settings = toml::from_str(raw).unwrap();
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.polling.interval(), Duration::from_secs(10));
        assert_eq!(settings.logging.level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let settings = Settings {
            api: ApiSettings {
                base_url: "not a url".to_string(),
                session_token: None,
                timeout_secs: 30,
            },
            polling: PollingSettings::default(),
            logging: LoggingSettings::default(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let settings = Settings {
            api: ApiSettings {
                base_url: "http://localhost:8000/api/v1alpha1".to_string(),
                session_token: None,
                timeout_secs: 30,
            },
            polling: PollingSettings { interval_secs: 0 },
            logging: LoggingSettings::default(),
        };
        assert!(settings.validate().is_err());
    }
}
