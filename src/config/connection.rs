//! Database connection configuration.
//!
//! Supports configuration via environment variables:
//! - `DB_HOST`: Database server hostname
//! - `DB_PORT`: Port (optional, defaults to 5432)
//! - `DB_NAME`: Database name
//! - `DB_USER`: Username
//! - `DB_PASS`: Password (optional)

use std::env;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the URL unreserved set is escaped in credentials.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: postgres, snapshot")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Supported schema drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Live PostgreSQL introspection
    Postgres,
    /// JSON schema snapshot on disk
    Snapshot,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "snapshot" | "json" => Ok(Driver::Snapshot),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::Snapshot => "snapshot",
        }
    }

    /// Get the default port for this driver.
    pub fn default_port(&self) -> u16 {
        match self {
            Driver::Postgres => 5432,
            Driver::Snapshot => 0, // Not applicable
        }
    }
}

/// PostgreSQL connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Driver::Postgres.default_port(),
            database: database.into(),
            username: username.into(),
            password: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `DB_HOST`, `DB_NAME`, `DB_USER`.
    /// Optional: `DB_PORT` (5432), `DB_PASS`.
    pub fn from_env() -> Result<Self, ConnectionError> {
        let host = required_var("DB_HOST")?;
        let database = required_var("DB_NAME")?;
        let username = required_var("DB_USER")?;

        let port = match env::var("DB_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| ConnectionError::InvalidConfig(format!("DB_PORT '{port}' is not a port")))?,
            Err(_) => Driver::Postgres.default_port(),
        };

        Ok(Self {
            host,
            port,
            database,
            username,
            password: env::var("DB_PASS").ok(),
        })
    }

    /// Render a `postgres://` URL.
    pub fn to_connection_string(&self) -> String {
        let credentials = match &self.password {
            Some(password) => format!(
                "{}:{}",
                encode_component(&self.username),
                encode_component(password)
            ),
            None => encode_component(&self.username),
        };
        format!(
            "postgres://{}@{}:{}/{}",
            credentials, self.host, self.port, self.database
        )
    }
}

fn required_var(name: &str) -> Result<String, ConnectionError> {
    env::var(name).map_err(|_| ConnectionError::MissingEnvVar(name.to_string()))
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, USERINFO).to_string()
}
