//! Application configuration, loaded once at startup.
//!
//! Settings come from the process environment; a `.env` key/value file is
//! read into it by `main` before this module runs.

use std::env;
use std::path::PathBuf;

use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub logging: LoggingConfig,
}

/// Logging sink configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `info,blog_server=debug`.
    pub level: String,
    /// Log destination; stdout when unset.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL")
                    .unwrap_or_else(|_| "info,blog_server=debug,quill_infra=debug".to_string()),
                file: env::var("LOG_FILE").ok().map(PathBuf::from),
            },
        }
    }
}
