//! Application configuration.
//!
//! Configuration is layered: an optional TOML file first, then environment
//! variables prefixed with `AIRWATCH_` using `__` between nested keys.
//!
//! ```toml
//! settings_path = "airwatch-settings.json"
//!
//! [provider]
//! channel_id = "2943472"
//! api_key = "READ_API_KEY"
//!
//! [messaging]
//! account_sid = "ACXXXXXXXX"
//! auth_token = "auth-token"
//! from = "+15005550006"
//!
//! [session]
//! history_days = 7
//! viewport_width = 1280
//! ```
//!
//! The same keys as environment variables:
//!
//! ```bash
//! AIRWATCH_PROVIDER__CHANNEL_ID=2943472
//! AIRWATCH_PROVIDER__API_KEY=READ_API_KEY
//! AIRWATCH_MESSAGING__AUTH_TOKEN=auth-token
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use airwatch_adapters::thingspeak::{self, ThingSpeakAdapter};
use airwatch_adapters::twilio::{self, TwilioMessenger};
use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::DEFAULT_HISTORY_DAYS;
use crate::session::{SessionConfig, ViewportClass, POLL_INTERVAL};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AIRWATCH";

const DEFAULT_SETTINGS_PATH: &str = "airwatch-settings.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Telemetry provider; required unless readings are replayed from a file.
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
    /// Outbound messaging provider; alert messages are disabled without it.
    #[serde(default)]
    pub messaging: Option<MessagingConfig>,
    #[serde(default)]
    pub session: SessionSection,
    /// Where notification settings are persisted.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,
    pub channel_id: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_messaging_endpoint")]
    pub endpoint: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number.
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    /// Consumer width in pixels; unset means a wide layout.
    #[serde(default)]
    pub viewport_width: Option<u32>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            history_days: DEFAULT_HISTORY_DAYS,
            viewport_width: None,
        }
    }
}

fn default_provider_endpoint() -> String {
    thingspeak::DEFAULT_ENDPOINT.to_string()
}

fn default_messaging_endpoint() -> String {
    twilio::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_history_days() -> u32 {
    DEFAULT_HISTORY_DAYS
}

impl AppConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// Without an explicit path, `airwatch.toml` in the working directory is
    /// read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("airwatch").required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(env.prefix_separator("_").separator("__"))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path of the settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    /// Session configuration derived from the `[session]` section.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: POLL_INTERVAL,
            history_days: self.session.history_days,
            viewport: self
                .session
                .viewport_width
                .map(ViewportClass::from_width)
                .unwrap_or_default(),
        }
    }

    /// Build the telemetry adapter.
    ///
    /// Fails when the provider section or its credentials are missing.
    pub fn thingspeak_adapter(&self) -> Result<ThingSpeakAdapter> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            anyhow!(
                "No telemetry provider configured (set [provider] in the config file or {}_PROVIDER__CHANNEL_ID / {}_PROVIDER__API_KEY)",
                ENV_PREFIX,
                ENV_PREFIX
            )
        })?;
        if provider.api_key.trim().is_empty() {
            return Err(anyhow!("Provider API key is empty"));
        }

        ThingSpeakAdapter::builder()
            .endpoint(&provider.endpoint)
            .channel_id(&provider.channel_id)
            .api_key(&provider.api_key)
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()
            .context("Failed to create telemetry adapter")
    }

    /// Build the messenger, if messaging is configured.
    pub fn twilio_messenger(&self) -> Result<Option<TwilioMessenger>> {
        let Some(messaging) = &self.messaging else {
            return Ok(None);
        };

        let messenger = TwilioMessenger::builder()
            .endpoint(&messaging.endpoint)
            .credentials(&messaging.account_sid, &messaging.auth_token)
            .from_number(&messaging.from)
            .build()
            .context("Failed to create messenger")?;
        Ok(Some(messenger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = toml_file(
            r#"
            settings_path = "/tmp/airwatch.json"

            [provider]
            channel_id = "2943472"
            api_key = "READKEY"

            [session]
            history_days = 14
            viewport_width = 375
            "#,
        );

        let config = AppConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        let provider = config.provider.as_ref().unwrap();
        assert_eq!(provider.endpoint, "https://api.thingspeak.com");
        assert_eq!(provider.timeout_secs, 10);
        assert!(config.messaging.is_none());
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/airwatch.json"));

        let session = config.session_config();
        assert_eq!(session.history_days, 14);
        assert_eq!(session.viewport, ViewportClass::Narrow);
        assert_eq!(session.poll_interval, Duration::from_secs(5));

        let adapter = config.thingspeak_adapter().unwrap();
        assert_eq!(adapter.channel_id(), "2943472");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file(
            r#"
            [provider]
            channel_id = "1"
            api_key = "FILEKEY"
            "#,
        );

        let config = AppConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("AIRWATCH_PROVIDER__CHANNEL_ID", "2943472"),
                ("AIRWATCH_PROVIDER__TIMEOUT_SECS", "3"),
                ("AIRWATCH_SESSION__HISTORY_DAYS", "30"),
            ]),
        )
        .unwrap();

        let provider = config.provider.unwrap();
        assert_eq!(provider.channel_id, "2943472");
        assert_eq!(provider.api_key, "FILEKEY");
        assert_eq!(provider.timeout_secs, 3);
        assert_eq!(config.session.history_days, 30);
    }

    #[test]
    fn test_environment_values_stay_verbatim() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("AIRWATCH_PROVIDER__CHANNEL_ID", "0042"),
                ("AIRWATCH_PROVIDER__API_KEY", "0123456789"),
                ("AIRWATCH_MESSAGING__ACCOUNT_SID", "AC123"),
                ("AIRWATCH_MESSAGING__AUTH_TOKEN", "0123456789"),
                ("AIRWATCH_MESSAGING__FROM", "+15005550006"),
            ]),
        )
        .unwrap();

        let provider = config.provider.as_ref().unwrap();
        assert_eq!(provider.channel_id, "0042");
        assert_eq!(provider.api_key, "0123456789");

        let messaging = config.messaging.as_ref().unwrap();
        assert_eq!(messaging.auth_token, "0123456789");
        assert_eq!(messaging.from, "+15005550006");
        assert_eq!(
            config.twilio_messenger().unwrap().unwrap().from_number(),
            "+15005550006"
        );
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_with_env(None, no_env()).unwrap();
        assert!(config.provider.is_none());
        assert_eq!(config.session.history_days, 7);
        assert_eq!(config.session_config().viewport, ViewportClass::Wide);
        assert_eq!(config.settings_path(), PathBuf::from("airwatch-settings.json"));
        assert!(config.twilio_messenger().unwrap().is_none());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = AppConfig::default();
        let err = config.thingspeak_adapter().unwrap_err();
        assert!(err.to_string().contains("No telemetry provider configured"));

        let file = toml_file(
            r#"
            [provider]
            channel_id = "1"
            "#,
        );
        assert!(AppConfig::load_with_env(Some(file.path()), no_env()).is_err());
    }

    #[test]
    fn test_messaging_section() {
        let file = toml_file(
            r#"
            [messaging]
            account_sid = "AC123"
            auth_token = "secret"
            from = "+15005550006"
            "#,
        );

        let config = AppConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        let messenger = config.twilio_messenger().unwrap().unwrap();
        assert_eq!(messenger.from_number(), "+15005550006");
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/airwatch.toml")), no_env());
        assert!(result.is_err());
    }
}
