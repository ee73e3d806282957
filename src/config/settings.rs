//! TOML-based configuration for sqlgate.
//!
//! Supports a config file (sqlgate.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.warehouse]
//! driver = "postgres"
//! connection_string = "postgres://${DB_USER}:${DB_PASS}@${DB_HOST}:5432/${DB_NAME}"
//! default_schema = "public"
//! fallback_snapshot = "./schema.json"
//!
//! [connections.offline]
//! driver = "snapshot"
//! connection_string = "./schema.json"
//!
//! [schema]
//! extraction_timeout_seconds = 30
//!
//! [retrieval]
//! max_tables = 5
//! max_context_chars = 12000
//!
//! [validation]
//! max_query_length = 10000
//! default_limit = 1000
//! strict_mode = false
//! dialect = "postgres"
//!
//! [logging]
//! level = "info"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::connection::{ConnectionConfig, ConnectionError, Driver};
use crate::validation::{SqlDialect, ValidatorOptions};

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{([^}]*)\}|(\w+))").unwrap());

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ConnectionError> for SettingsError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::MissingEnvVar(name) => Self::MissingEnvVar(name),
            ConnectionError::UnsupportedDriver(driver) => Self::UnsupportedDriver(driver),
            ConnectionError::InvalidConfig(msg) => Self::InvalidConfig(msg),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named schema connections.
    pub connections: HashMap<String, ConnectionSettings>,

    pub schema: SchemaSettings,

    pub retrieval: RetrievalSettings,

    pub validation: ValidationSettings,

    pub logging: LoggingSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Schema driver (postgres, snapshot).
    pub driver: String,

    /// Connection string or snapshot path (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Schema to introspect for this connection.
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Snapshot file served when the live source fails.
    #[serde(default)]
    pub fallback_snapshot: Option<String>,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Get the fallback snapshot path with environment variables expanded.
    pub fn resolved_fallback_snapshot(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.fallback_snapshot
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

impl From<&ConnectionConfig> for ConnectionSettings {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            driver: Driver::Postgres.as_str().to_string(),
            connection_string: config.to_connection_string(),
            default_schema: None,
            fallback_snapshot: None,
        }
    }
}

/// Schema extraction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Bound on one full extraction.
    pub extraction_timeout_seconds: u64,

    /// Schema used when a connection names none.
    pub default_schema: String,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            extraction_timeout_seconds: 30,
            default_schema: "public".to_string(),
        }
    }
}

impl SchemaSettings {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_seconds)
    }
}

/// Relevance retrieval settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Tables rendered into a schema context.
    pub max_tables: usize,

    /// Bound on the rendered context, in characters.
    pub max_context_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_tables: 5,
            max_context_chars: 12_000,
        }
    }
}

/// SQL validation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub max_query_length: usize,

    /// Row bound appended by the sanitizer.
    pub default_limit: u64,

    /// Allow only plain queries and allow-listed functions.
    pub strict_mode: bool,

    pub dialect: SqlDialect,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_query_length: 10_000,
            default_limit: 1000,
            strict_mode: false,
            dialect: SqlDialect::Postgres,
        }
    }
}

impl ValidationSettings {
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            max_query_length: self.max_query_length,
            strict_mode: self.strict_mode,
            dialect: self.dialect,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQLGATE_CONFIG`
    /// 2. `./sqlgate.toml`
    /// 3. `~/.config/sqlgate/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SQLGATE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sqlgate.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlgate").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, otherwise the
    /// first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections
            .iter()
            .min_by_key(|(name, _)| name.as_str())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve the connection to open.
    ///
    /// A name must be configured. Without one the default connection is
    /// used, and with no connections configured at all a postgres
    /// connection is built from the `DB_*` environment variables under the
    /// name `env`.
    pub fn resolve_connection(
        &self,
        name: Option<&str>,
    ) -> Result<(String, ConnectionSettings), SettingsError> {
        if let Some(name) = name {
            return Ok((name.to_string(), self.get_connection(name)?.clone()));
        }
        if let Some((name, connection)) = self.default_connection() {
            return Ok((name.to_string(), connection.clone()));
        }

        let config = ConnectionConfig::from_env()?;
        Ok(("env".to_string(), ConnectionSettings::from(&config)))
    }

    /// Schema to introspect for a connection.
    pub fn schema_for<'a>(&'a self, connection: &'a ConnectionSettings) -> &'a str {
        connection
            .default_schema
            .as_deref()
            .unwrap_or(self.schema.default_schema.as_str())
    }

    fn check(&self) -> Result<(), SettingsError> {
        if self.retrieval.max_tables == 0 {
            return Err(SettingsError::InvalidConfig(
                "retrieval.max_tables must be at least 1".to_string(),
            ));
        }
        if self.validation.max_query_length == 0 {
            return Err(SettingsError::InvalidConfig(
                "validation.max_query_length must be at least 1".to_string(),
            ));
        }
        for (name, connection) in &self.connections {
            connection.driver_type().map_err(|_| {
                SettingsError::UnsupportedDriver(format!("{} (connection '{name}')", connection.driver))
            })?;
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for caps in ENV_VAR.captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            continue;
        };
        let value = env::var(name.as_str())
            .map_err(|_| SettingsError::MissingEnvVar(name.as_str().to_string()))?;

        result.push_str(&s[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }

    result.push_str(&s[last..]);
    Ok(result)
}
