#![deny(unsafe_code)]

//! Configuration loading and validation for seedbox.
//!
//! Configuration comes from an optional TOML file, then environment
//! variables on top:
//!
//! ```toml
//! [daemon]
//! host = "http://localhost:9091"
//! username = "admin"
//! password = "secret"
//!
//! [exporter]
//! listen_port = 9190
//! torrent_metrics = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `TRANSMISSION_HOST` | `daemon.host` |
//! | `TRANSMISSION_USER` | `daemon.username` |
//! | `TRANSMISSION_PASSWORD` | `daemon.password` |
//! | `PORT` | `exporter.listen_port` |
//! | `LOG_LEVEL` | `logging.level` |
//! | `EXPORT_TORRENT_LEVEL_METRICS` | `exporter.torrent_metrics` (`"true"` enables) |

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub exporter: ExporterConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to reach the daemon's RPC endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Base URL of the daemon, e.g. `http://localhost:9091`.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,

    /// Endpoint path resolved against `host`.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// HTTP timeout for a single request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: String::new(),
            password: String::new(),
            rpc_path: default_rpc_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { REDACTED };
        f.debug_struct("DaemonConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &password)
            .field("rpc_path", &self.rpc_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl DaemonConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_host() -> String {
    "http://localhost:9091".to_string()
}

fn default_rpc_path() -> String {
    "transmission/rpc".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Metrics endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Export per-torrent series in addition to the session totals.
    #[serde(default)]
    pub torrent_metrics: bool,

    /// Upper bound on one scrape's daemon round trips, in seconds.
    #[serde(default = "default_scrape_timeout_secs")]
    pub scrape_timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            torrent_metrics: false,
            scrape_timeout_secs: default_scrape_timeout_secs(),
        }
    }
}

impl ExporterConfig {
    /// `addr:port` suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    9190
}

fn default_scrape_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` for human-readable lines, `json` for one object per event.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const REDACTED: &str = "[REDACTED]";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    /// Empty values are treated as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        if let Some(host) = get("TRANSMISSION_HOST") {
            self.daemon.host = host;
        }
        if let Some(user) = get("TRANSMISSION_USER") {
            self.daemon.username = user;
        }
        if let Some(password) = get("TRANSMISSION_PASSWORD") {
            self.daemon.password = password;
        }
        if let Some(port) = get("PORT") {
            self.exporter.listen_port = port.parse().map_err(|_| ConfigError::Env {
                var: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level.to_ascii_lowercase();
        }
        if let Some(flag) = get("EXPORT_TORRENT_LEVEL_METRICS") {
            self.exporter.torrent_metrics = flag == "true";
        }
        Ok(())
    }

    /// A copy safe to print: a non-empty password becomes `[REDACTED]`.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.daemon.password.is_empty() {
            copy.daemon.password = REDACTED.to_string();
        }
        copy
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.daemon.host.as_str();
        if host.is_empty() {
            return Err(ConfigError::Validation(
                "daemon.host must not be empty".to_string(),
            ));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "daemon.host must start with http:// or https://, got {host:?}"
            )));
        }
        if self.daemon.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "daemon.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.exporter.listen_port == 0 {
            return Err(ConfigError::Validation(
                "exporter.listen_port must be non-zero".to_string(),
            ));
        }
        if self.exporter.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "exporter.listen_addr must not be empty".to_string(),
            ));
        }
        if self.exporter.scrape_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "exporter.scrape_timeout_secs must be non-zero".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.format must be one of {:?}, got {:?}",
                LOG_FORMATS, self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.daemon.host, "http://localhost:9091");
        assert_eq!(config.daemon.rpc_path, "transmission/rpc");
        assert_eq!(config.exporter.listen_port, 9190);
        assert!(!config.exporter.torrent_metrics);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.exporter.bind_addr(), "0.0.0.0:9190");
        assert_eq!(config.exporter.scrape_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [daemon]
            host = "https://seedbox.lan:9091"
            username = "admin"
            password = "secret"
            request_timeout_secs = 10

            [exporter]
            listen_addr = "127.0.0.1"
            listen_port = 9000
            torrent_metrics = true

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.daemon.host, "https://seedbox.lan:9091");
        assert_eq!(config.daemon.password, "secret");
        assert_eq!(config.daemon.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.exporter.bind_addr(), "127.0.0.1:9000");
        assert!(config.exporter.torrent_metrics);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validation_rejects_bad_host() {
        let err = AppConfig::parse("[daemon]\nhost = \"localhost:9091\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        assert!(AppConfig::parse("[daemon]\nhost = \"\"").is_err());
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        assert!(AppConfig::parse("[exporter]\nlisten_port = 0").is_err());
        assert!(AppConfig::parse("[exporter]\nscrape_timeout_secs = 0").is_err());
        assert!(AppConfig::parse("[daemon]\nrequest_timeout_secs = 0").is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_log_settings() {
        assert!(AppConfig::parse("[logging]\nlevel = \"loud\"").is_err());
        assert!(AppConfig::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env(&[
                ("TRANSMISSION_HOST", "http://nas:9091"),
                ("TRANSMISSION_USER", "bob"),
                ("TRANSMISSION_PASSWORD", "pw"),
                ("PORT", "9200"),
                ("LOG_LEVEL", "DEBUG"),
                ("EXPORT_TORRENT_LEVEL_METRICS", "true"),
            ]))
            .unwrap();

        assert_eq!(config.daemon.host, "http://nas:9091");
        assert_eq!(config.daemon.username, "bob");
        assert_eq!(config.daemon.password, "pw");
        assert_eq!(config.exporter.listen_port, 9200);
        assert_eq!(config.logging.level, "debug");
        assert!(config.exporter.torrent_metrics);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_empty_values_are_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env(&[("TRANSMISSION_HOST", ""), ("PORT", "")]))
            .unwrap();
        assert_eq!(config.daemon.host, "http://localhost:9091");
        assert_eq!(config.exporter.listen_port, 9190);
    }

    #[test]
    fn test_env_torrent_metrics_requires_true() {
        let mut config = AppConfig::default();
        config.exporter.torrent_metrics = true;
        config
            .apply_env_from(env(&[("EXPORT_TORRENT_LEVEL_METRICS", "yes")]))
            .unwrap();
        assert!(!config.exporter.torrent_metrics);
    }

    #[test]
    fn test_env_bad_port() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_from(env(&[("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = AppConfig::default();
        config.daemon.password = "hunter2".to_string();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_redacted_copy_serializes_without_secret() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env(&[("TRANSMISSION_PASSWORD", "hunter2")]))
            .unwrap();

        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("password = \"[REDACTED]\""));
        assert_eq!(config.daemon.password, "hunter2");

        let empty = toml::to_string_pretty(&AppConfig::default().redacted()).unwrap();
        assert!(!empty.contains("password"));
    }

    #[test_log::test(tokio::test)]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seedbox.toml");
        tokio::fs::write(&path, "[exporter]\nlisten_port = 9300\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.exporter.listen_port, 9300);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
