//! Application configuration schemas.
//!
//! Configuration is layered with the `config` crate: `config/default`,
//! then `config/{env}`, then `COASTLINE__SECTION__KEY` environment
//! variables. The hosted backend's conventional variables
//! (`NEXT_PUBLIC_SUPABASE_URL`, `NEXT_PUBLIC_SUPABASE_ANON_KEY`,
//! `TRANSLATOR_API_URL`, `TRANSLATOR_API_KEY`) fill any value left empty.

pub mod app;
pub mod auth;
pub mod logging;
pub mod notifications;
pub mod storage;
pub mod translation;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::logging::LoggingConfig;
use self::notifications::NotificationsConfig;
use self::storage::{StorageConfig, UploadsConfig};
use self::translation::TranslationConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Data store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload widget limits.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Notification center settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Periodic task settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Translation API settings.
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Provider: `"postgres"` or `"memory"`.
    #[serde(default = "default_database_provider")]
    pub provider: String,
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Apply bundled migrations at startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: default_database_provider(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            run_migrations: false,
        }
    }
}

impl AppConfig {
    /// Load configuration for the given environment name.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COASTLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.apply_env_fallbacks(|name| std::env::var(name).ok());
        Ok(loaded)
    }

    /// Fill empty values from the backend's conventional variables.
    pub fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.storage.supabase_url.is_empty() {
            if let Some(url) = get("NEXT_PUBLIC_SUPABASE_URL") {
                self.storage.supabase_url = url.trim_end_matches('/').to_string();
            }
        }
        if self.storage.supabase_key.is_empty() {
            if let Some(key) = get("NEXT_PUBLIC_SUPABASE_ANON_KEY") {
                self.storage.supabase_key = key;
            }
        }
        if self.auth.jwt_secret.is_empty() {
            if let Some(secret) = get("SUPABASE_JWT_SECRET") {
                self.auth.jwt_secret = secret;
            }
        }
        if self.database.url.is_empty() {
            if let Some(url) = get("DATABASE_URL") {
                self.database.url = url;
            }
        }
        if self.translation.url.is_none() {
            self.translation.url = get("TRANSLATOR_API_URL");
        }
        if self.translation.api_key.is_none() {
            self.translation.api_key = get("TRANSLATOR_API_KEY");
        }
    }

    /// Check cross-field requirements that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.database.provider.as_str() {
            "postgres" if self.database.url.is_empty() => {
                return Err(AppError::configuration(
                    "database.url is required for the postgres provider",
                ));
            }
            "postgres" | "memory" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown database provider '{other}'"
                )));
            }
        }

        match self.storage.provider.as_str() {
            "supabase"
                if self.storage.supabase_url.is_empty() || self.storage.supabase_key.is_empty() =>
            {
                return Err(AppError::configuration(
                    "storage.supabase_url and storage.supabase_key are required for the supabase provider",
                ));
            }
            "supabase" | "local" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider '{other}'"
                )));
            }
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if self.worker.approval_poll_seconds == 0 {
            return Err(AppError::configuration(
                "worker.approval_poll_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_database_provider() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
