//! Configuration management for sqlscout.
//!
//! Connection and LLM settings are read from environment variables once at
//! startup and passed by value into the orchestrator; nothing in the core
//! reads ambient state.

use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Supported database kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Sqlite,
    Postgres,
}

impl DatabaseKind {
    /// Returns the kind as the string used in pipeline contexts and env vars.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Which database kind to connect to.
    pub kind: DatabaseKind,

    /// Path to the SQLite database file (sqlite only).
    pub db_path: Option<String>,

    /// PostgreSQL host.
    pub host: Option<String>,

    /// PostgreSQL port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// PostgreSQL database name.
    pub database: Option<String>,

    /// PostgreSQL user.
    pub user: Option<String>,

    /// PostgreSQL password.
    pub password: Option<String>,
}

fn default_port() -> u16 {
    5432
}

impl DatabaseConfig {
    /// Creates a sqlite configuration for the given file path.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            kind: DatabaseKind::Sqlite,
            db_path: Some(path.into()),
            port: default_port(),
            ..Self::default()
        }
    }

    /// Creates a postgres configuration from individual parameters.
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            kind: DatabaseKind::Postgres,
            db_path: None,
            host: Some(host.into()),
            port,
            database: Some(database.into()),
            user: Some(user.into()),
            password: Some(password.into()),
        }
    }

    /// Reads the configuration from environment variables.
    ///
    /// `DB_TYPE` selects the kind (defaults to `sqlite`). SQLite uses
    /// `SQLITE_DB_PATH`; Postgres uses `POSTGRES_HOST` (default `localhost`),
    /// `POSTGRES_PORT` (default 5432), `POSTGRES_DB`, `POSTGRES_USER` and
    /// `POSTGRES_PASSWORD`. Callers apply overrides and then [`validate`].
    ///
    /// [`validate`]: Self::validate
    pub fn from_env() -> Result<Self> {
        let db_type = std::env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let kind = DatabaseKind::parse(&db_type).ok_or_else(|| {
            ScoutError::config(format!(
                "Invalid DB_TYPE: '{db_type}'. Valid options: ['sqlite', 'postgres']"
            ))
        })?;

        let port = match std::env::var("POSTGRES_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ScoutError::config(format!("Invalid POSTGRES_PORT: '{raw}'")))?,
            Err(_) => default_port(),
        };

        Ok(Self {
            kind,
            db_path: std::env::var("SQLITE_DB_PATH").ok(),
            host: Some(std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string())),
            port,
            database: std::env::var("POSTGRES_DB").ok(),
            user: std::env::var("POSTGRES_USER").ok(),
            password: std::env::var("POSTGRES_PASSWORD").ok(),
        })
    }

    /// Validates that the parameters required by the configured kind are set.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            DatabaseKind::Sqlite => {
                if self.db_path.as_deref().map_or(true, str::is_empty) {
                    return Err(ScoutError::config(
                        "SQLITE_DB_PATH is required when DB_TYPE is 'sqlite'",
                    ));
                }
            }
            DatabaseKind::Postgres => {
                let missing = [
                    ("POSTGRES_DB", &self.database),
                    ("POSTGRES_USER", &self.user),
                    ("POSTGRES_PASSWORD", &self.password),
                ]
                .iter()
                .any(|(_, value)| value.as_deref().map_or(true, str::is_empty));

                if missing {
                    return Err(ScoutError::config(
                        "POSTGRES_DB, POSTGRES_USER, and POSTGRES_PASSWORD are required \
                         when DB_TYPE is 'postgres'",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds the keyword/value PostgreSQL connection string.
    ///
    /// Format: `host=<h> port=<p> dbname=<d> user=<u> password=<pw>`.
    pub fn postgres_connection_string(&self) -> Result<String> {
        let database = self
            .database
            .as_deref()
            .ok_or_else(|| ScoutError::config("Database name is required"))?;
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| ScoutError::config("Database user is required"))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| ScoutError::config("Database password is required"))?;
        let host = self.host.as_deref().unwrap_or("localhost");

        Ok(format!(
            "host={host} port={} dbname={database} user={user} password={password}",
            self.port
        ))
    }

    /// Returns the connection parameters as pipeline context keys.
    ///
    /// Produces `db_type`, `db_path` and `conn_string` entries; the parameter
    /// the configured kind does not use is null.
    pub fn stage_inputs(&self) -> Result<Map<String, Value>> {
        let mut inputs = Map::new();
        inputs.insert("db_type".to_string(), Value::from(self.kind.as_str()));

        match self.kind {
            DatabaseKind::Sqlite => {
                inputs.insert("db_path".to_string(), Value::from(self.db_path.clone()));
                inputs.insert("conn_string".to_string(), Value::Null);
            }
            DatabaseKind::Postgres => {
                inputs.insert("db_path".to_string(), Value::Null);
                inputs.insert(
                    "conn_string".to_string(),
                    Value::from(self.postgres_connection_string()?),
                );
            }
        }

        Ok(inputs)
    }

    /// Returns a display-safe string (no password) for logging.
    pub fn display_string(&self) -> String {
        match self.kind {
            DatabaseKind::Sqlite => {
                format!("sqlite @ {}", self.db_path.as_deref().unwrap_or("unknown"))
            }
            DatabaseKind::Postgres => format!(
                "{} @ {}:{}",
                self.database.as_deref().unwrap_or("unknown"),
                self.host.as_deref().unwrap_or("localhost"),
                self.port
            ),
        }
    }
}

/// LLM backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai" or "mock".
    pub provider: String,

    /// Model name (e.g., "gpt-4o-mini").
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl LlmConfig {
    /// Reads the LLM configuration from `LLM_PROVIDER` and `LLM_MODEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("LLM_PROVIDER").unwrap_or(defaults.provider),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(DatabaseKind::parse("sqlite"), Some(DatabaseKind::Sqlite));
        assert_eq!(DatabaseKind::parse("Postgres"), Some(DatabaseKind::Postgres));
        assert_eq!(
            DatabaseKind::parse("postgresql"),
            Some(DatabaseKind::Postgres)
        );
        assert_eq!(DatabaseKind::parse("mysql"), None);
    }

    #[test]
    fn test_sqlite_config_validates() {
        let config = DatabaseConfig::sqlite("/tmp/test.db");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sqlite_config_requires_path() {
        let config = DatabaseConfig {
            kind: DatabaseKind::Sqlite,
            ..DatabaseConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SQLITE_DB_PATH"));
    }

    #[test]
    fn test_postgres_config_requires_credentials() {
        let config = DatabaseConfig {
            kind: DatabaseKind::Postgres,
            host: Some("localhost".to_string()),
            database: Some("testdb".to_string()),
            ..DatabaseConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("POSTGRES_USER"));
    }

    #[test]
    fn test_postgres_connection_string_format() {
        let config = DatabaseConfig::postgres("dbhost", 5433, "scout", "alice", "secret");
        assert_eq!(
            config.postgres_connection_string().unwrap(),
            "host=dbhost port=5433 dbname=scout user=alice password=secret"
        );
    }

    #[test]
    fn test_sqlite_stage_inputs() {
        let config = DatabaseConfig::sqlite("/tmp/test.db");
        let inputs = config.stage_inputs().unwrap();
        assert_eq!(inputs["db_type"], "sqlite");
        assert_eq!(inputs["db_path"], "/tmp/test.db");
        assert!(inputs["conn_string"].is_null());
    }

    #[test]
    fn test_postgres_stage_inputs() {
        let config = DatabaseConfig::postgres("localhost", 5432, "scout", "alice", "secret");
        let inputs = config.stage_inputs().unwrap();
        assert_eq!(inputs["db_type"], "postgres");
        assert!(inputs["db_path"].is_null());
        assert!(inputs["conn_string"]
            .as_str()
            .unwrap()
            .starts_with("host=localhost"));
    }

    #[test]
    fn test_display_string_hides_password() {
        let config = DatabaseConfig::postgres("localhost", 5432, "scout", "alice", "secret");
        let display = config.display_string();
        assert!(display.contains("scout"));
        assert!(!display.contains("secret"));
    }
}
