//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Balance ledger tuning.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LedgerConfig {
    /// How many times a balance-mutating unit of work is attempted when it
    /// loses a race on a party's balance version.
    #[serde(default = "default_max_issue_attempts")]
    pub max_issue_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_issue_attempts: default_max_issue_attempts(),
        }
    }
}

fn default_max_issue_attempts() -> u32 {
    3
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `VOYRA__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("VOYRA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("VOYRA__DATABASE__URL", Some("postgres://localhost/voyra_test")),
                ("VOYRA__SERVER__PORT", Some("9090")),
                ("VOYRA__LEDGER__MAX_ISSUE_ATTEMPTS", Some("5")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/voyra_test");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.max_issue_attempts, 5);
            },
        );
    }

    #[test]
    fn test_ledger_defaults_when_absent() {
        temp_env::with_vars(
            [
                ("VOYRA__DATABASE__URL", Some("sqlite::memory:")),
                ("VOYRA__SERVER__HOST", Some("127.0.0.1")),
                ("VOYRA__LEDGER__MAX_ISSUE_ATTEMPTS", None),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.ledger.max_issue_attempts, 3);
                assert_eq!(config.server.host, "127.0.0.1");
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("VOYRA__DATABASE__URL", None::<&str>),
                ("VOYRA__SERVER__PORT", Some("8080")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
