use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use validator::Validate;

// Default constants
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://sample.db";
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_ROW_LIMIT: usize = 200;

#[derive(Debug, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,
    #[serde(default)]
    #[validate(nested)]
    pub query: QuerySettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    #[validate(length(min = 1))]
    pub listen_addr: String,

    #[serde(default = "default_database_url")]
    #[validate(length(min = 1))]
    pub database_url: String,

    #[serde(default = "default_pool_size")]
    #[validate(range(min = 1))]
    pub pool_size: usize,

    #[serde(default)]
    pub auth: AuthSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_url: default_database_url(),
            pool_size: default_pool_size(),
            auth: AuthSettings::default(),
        }
    }
}

/// Access control settings. When `token` is unset the gateway runs in open
/// mode and every request is authorized.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AuthSettings {
    #[serde(default)]
    pub token: Option<SecretString>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct QuerySettings {
    /// Row cap injected into statements that do not carry their own
    /// `LIMIT`/`TOP` clause.
    #[serde(default = "default_row_limit")]
    #[validate(range(min = 1))]
    pub default_limit: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: default_row_limit(),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_row_limit() -> usize {
    DEFAULT_ROW_LIMIT
}

impl AppConfig {
    /// Load configuration from an optional file, overlaid with environment
    /// variables. `SQLGATE_SERVER__DATABASE_URL` maps to `server.database_url`,
    /// `SQLGATE_QUERY__DEFAULT_LIMIT` to `query.default_limit`, etc.
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        let builder = builder.add_source(
            config::Environment::with_prefix("SQLGATE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(app_config)
    }
}
