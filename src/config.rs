use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "DiagNexus";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Chat-completions model used for report structuring.
pub const MODEL_ID: &str = "gpt-4o-mini";

pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "diagnexus_ingest=info,diagnexus_lib=info,warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credential string that never shows up in Debug output.
#[derive(Clone, PartialEq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: Secret,
    pub name: String,
    pub port: u16,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatastoreConfig {
    Postgres(DatabaseConfig),
    /// Embedded store, selected by `SQLITE_PATH`.
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Deployment base URL, e.g. `https://<resource>.openai.azure.com/openai/deployments/<name>`.
    pub endpoint: String,
    pub api_key: Secret,
    pub api_version: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub datastore: DatastoreConfig,
    pub model: ModelConfig,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    /// Load `.env` (when present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let datastore = match get("SQLITE_PATH") {
            Some(path) => DatastoreConfig::Sqlite(PathBuf::from(path)),
            None => DatastoreConfig::Postgres(DatabaseConfig {
                host: require("DB_HOST")?,
                user: require("DB_USER")?,
                password: Secret::new(require("DB_PASS")?),
                name: require("DB_NAME")?,
                port: parse_or("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?,
                max_connections: parse_or(
                    "DB_MAX_CONNECTIONS",
                    get("DB_MAX_CONNECTIONS"),
                    DEFAULT_DB_MAX_CONNECTIONS,
                )?,
            }),
        };

        let model = ModelConfig {
            endpoint: require("AZURE_OPENAI_ENDPOINT")?,
            api_key: Secret::new(require("AZURE_OPENAI_API_KEY")?),
            api_version: get("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            model: MODEL_ID.to_string(),
        };

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            user: require("SMTP_USER")?,
            password: Secret::new(require("SMTP_PASS")?),
        };

        Ok(Self {
            datastore,
            model,
            smtp,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DB_HOST", "db.internal"),
            ("DB_USER", "ingest"),
            ("DB_PASS", "hunter2"),
            ("DB_NAME", "diagnexus"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/openai/deployments/gpt-4o-mini"),
            ("AZURE_OPENAI_API_KEY", "key-123"),
            ("SMTP_USER", "reports@example.com"),
            ("SMTP_PASS", "app-password"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_applied_when_optional_vars_absent() {
        let config = load(&base_env()).unwrap();
        let DatastoreConfig::Postgres(db) = &config.datastore else {
            panic!("expected postgres datastore");
        };
        assert_eq!(db.port, DEFAULT_DB_PORT);
        assert_eq!(db.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.model.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.model.model, MODEL_ID);
        assert_eq!(config.smtp.host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn sqlite_path_selects_embedded_store() {
        let mut env = base_env();
        env.remove("DB_HOST");
        env.insert("SQLITE_PATH", "/tmp/reports.db");
        let config = load(&env).unwrap();
        assert_eq!(
            config.datastore,
            DatastoreConfig::Sqlite(PathBuf::from("/tmp/reports.db"))
        );
    }

    #[test]
    fn missing_required_var_is_reported_by_name() {
        let mut env = base_env();
        env.remove("SMTP_USER");
        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("SMTP_USER"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut env = base_env();
        env.insert("AZURE_OPENAI_API_KEY", "   ");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Missing("AZURE_OPENAI_API_KEY")
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut env = base_env();
        env.insert("DB_PORT", "five");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "DB_PORT", .. })
        ));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = load(&base_env()).unwrap();
        let debug = format!("{:?}", config.smtp);
        assert!(!debug.contains("app-password"));
        assert!(debug.contains("Secret(***)"));
    }
}
