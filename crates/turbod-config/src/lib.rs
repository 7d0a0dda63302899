#![deny(unsafe_code)]

//! Configuration loading and validation for the turbod client bootstrap.
//!
//! Loads TOML configuration files and validates them. [`AppConfig`] is the
//! central configuration structure; it carries the options forwarded to the
//! daemon connector, the engine-to-wrapper entry point rule, and the log level
//! used by the command-line front end.
//!
//! The on-disk daemon layout (`turbod/<hash>/turbod.sock` and friends) is
//! deliberately *not* configurable: an existing daemon must be found at the
//! same place by every client.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Options handed to the daemon connector.
    #[serde(default)]
    pub client: ClientConfig,

    /// Which executable stands in as the daemon's client entry point.
    #[serde(default)]
    pub entry_point: EntryPointConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options forwarded verbatim to the connector on every connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Idle timeout, in seconds, a freshly spawned daemon is started with.
    #[serde(default = "default_server_timeout_secs")]
    pub server_timeout_secs: u64,

    /// Never spawn a daemon; fail if none is running.
    #[serde(default)]
    pub dont_start: bool,

    /// Never kill a daemon running a mismatched version.
    #[serde(default)]
    pub dont_kill: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_timeout_secs: default_server_timeout_secs(),
            dont_start: false,
            dont_kill: false,
        }
    }
}

fn default_server_timeout_secs() -> u64 {
    4 * 60 * 60 // 4 hours
}

/// Engine-to-wrapper redirection rule.
///
/// When the running executable is the internal engine binary, the daemon must
/// still be addressed through the public wrapper that sits next to it.
/// Single-binary deployments set `redirect = false`.
///
/// ## TOML Example
///
/// ```toml
/// [entry_point]
/// redirect = true
/// engine_name = "go-turbo"
/// wrapper_name = "turbo"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointConfig {
    /// Whether to redirect from the engine binary to the wrapper at all.
    #[serde(default = "default_redirect")]
    pub redirect: bool,

    /// File name of the internal engine binary, without platform suffix.
    #[serde(default = "default_engine_name")]
    pub engine_name: String,

    /// File name of the public wrapper binary, without platform suffix.
    #[serde(default = "default_wrapper_name")]
    pub wrapper_name: String,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            redirect: default_redirect(),
            engine_name: default_engine_name(),
            wrapper_name: default_wrapper_name(),
        }
    }
}

fn default_redirect() -> bool {
    true
}

fn default_engine_name() -> String {
    "go-turbo".to_string()
}

fn default_wrapper_name() -> String {
    "turbo".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.server_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "client.server_timeout_secs must be non-zero".to_string(),
            ));
        }

        let entry = &self.entry_point;
        for (field, name) in [
            ("engine_name", &entry.engine_name),
            ("wrapper_name", &entry.wrapper_name),
        ] {
            if name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "entry_point.{field} must not be empty"
                )));
            }
            if name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "entry_point.{field} must be a bare file name, got {name:?}"
                )));
            }
        }
        if entry.engine_name == entry.wrapper_name {
            return Err(ConfigError::Validation(format!(
                "entry_point.engine_name and entry_point.wrapper_name must differ, both are {:?}",
                entry.engine_name
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.client.server_timeout_secs, 14_400);
        assert!(!config.client.dont_start);
        assert!(!config.client.dont_kill);
        assert!(config.entry_point.redirect);
        assert_eq!(config.entry_point.engine_name, "go-turbo");
        assert_eq!(config.entry_point.wrapper_name, "turbo");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_config_validates() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.client.server_timeout_secs, 14_400);
        assert_eq!(config.entry_point.wrapper_name, "turbo");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [client]
            server_timeout_secs = 60
            dont_start = true
            dont_kill = true

            [entry_point]
            redirect = false
            engine_name = "engine"
            wrapper_name = "wrapper"

            [logging]
            level = "debug"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.client.server_timeout_secs, 60);
        assert!(config.client.dont_start);
        assert!(config.client.dont_kill);
        assert!(!config.entry_point.redirect);
        assert_eq!(config.entry_point.engine_name, "engine");
        assert_eq!(config.entry_point.wrapper_name, "wrapper");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let toml = r#"
            [client]
            server_timeout_secs = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_engine_name() {
        let toml = r#"
            [entry_point]
            engine_name = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_path_in_wrapper_name() {
        let toml = r#"
            [entry_point]
            wrapper_name = "bin/turbo"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("bare file name"));
    }

    #[test]
    fn test_validation_rejects_identical_names() {
        let toml = r#"
            [entry_point]
            engine_name = "turbo"
            wrapper_name = "turbo"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_level() {
        let toml = r#"
            [logging]
            level = "loud"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = AppConfig::parse(&text).unwrap();
        assert_eq!(parsed.client.server_timeout_secs, config.client.server_timeout_secs);
        assert_eq!(parsed.entry_point.engine_name, config.entry_point.engine_name);
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[test_log::test(tokio::test)]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("turbod.toml");
        tokio::fs::write(&path, b"[client]\nserver_timeout_secs = 30\ndont_kill = true\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.client.server_timeout_secs, 30);
        assert!(config.client.dont_kill);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/turbod.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    // ── Error display ─────────────────────────────────────────────────

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
