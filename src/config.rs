//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::DatabaseConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,

    /// Run `migrate` when the server starts
    #[serde(default)]
    pub auto_migrate: bool,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("moodlog").join("moodlog.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./moodlog.db".to_string())
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout(),
            auto_migrate: false,
        }
    }
}

impl StorageConfig {
    /// Settings for opening the database
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.db_path)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl From<&ApiConfig> for crate::api::ApiConfig {
    fn from(config: &ApiConfig) -> Self {
        crate::api::ApiConfig::new(config.host.clone(), config.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn filter_directive(&self) -> String {
        format!("moodlog={},tower_http=debug", self.level)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("moodlog").join("config.toml")),
            Some(PathBuf::from("/etc/moodlog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MOODLOG_*` overrides from any variable source
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("MOODLOG_DB_PATH") {
            self.storage.db_path = path;
        }
        if let Some(auto) = var("MOODLOG_AUTO_MIGRATE") {
            match auto.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.storage.auto_migrate = true,
                "0" | "false" | "no" => self.storage.auto_migrate = false,
                other => tracing::warn!("Ignoring MOODLOG_AUTO_MIGRATE={:?}", other),
            }
        }

        if let Some(host) = var("MOODLOG_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("MOODLOG_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring MOODLOG_API_PORT={:?}", port),
            }
        }

        if let Some(level) = var("MOODLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MOODLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Moodlog Configuration
#
# Environment variables override these settings:
# - MOODLOG_DB_PATH
# - MOODLOG_AUTO_MIGRATE
# - MOODLOG_API_HOST
# - MOODLOG_API_PORT
# - MOODLOG_LOG_LEVEL
# - MOODLOG_LOG_FORMAT

[storage]
# SQLite database file
db_path = "./moodlog.db"

# How long a write waits for a locked database (ms)
busy_timeout_ms = 5000

# Apply pending migrations when the server starts
auto_migrate = false

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 4000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert!(!config.storage.auto_migrate);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.storage.db_path, "./moodlog.db");
        assert_eq!(crate::api::ApiConfig::from(&config.api).addr(), "127.0.0.1:4000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndb_path = \"/tmp/mood.db\"\nauto_migrate = true\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.db_path, "/tmp/mood.db");
        assert!(config.storage.auto_migrate);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[api\nport = ").unwrap();
        let bad = Config::load(&path).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MOODLOG_DB_PATH", "/data/m.db"),
            ("MOODLOG_AUTO_MIGRATE", "TRUE"),
            ("MOODLOG_API_PORT", "8123"),
            ("MOODLOG_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.db_path, "/data/m.db");
        assert!(config.storage.auto_migrate);
        assert_eq!(config.api.port, 8123);
        assert!(config.logging.is_json());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bad_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "MOODLOG_API_PORT").then(|| "lots".to_string()));
        assert_eq!(config.api.port, 4000);
    }

    #[test]
    fn test_database_config() {
        let mut storage = StorageConfig::default();
        storage.db_path = "/tmp/x.db".to_string();
        storage.busy_timeout_ms = 250;

        let db = storage.database_config();
        assert_eq!(db.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(db.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_filter_directive() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(logging.filter_directive(), "moodlog=debug,tower_http=debug");
    }
}
