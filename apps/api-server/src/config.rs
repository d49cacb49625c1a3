//! Application configuration loaded from environment variables.

use std::env;

use quire_core::PutMode;
use quire_editor::DEFAULT_CHARACTER_LIMIT;
use quire_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub put_mode: PutMode,
    /// Advisory limit shown by the post editor.
    pub character_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            put_mode: PutMode::default(),
            character_limit: DEFAULT_CHARACTER_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

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
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database,
            put_mode: env::var("PUT_MODE")
                .ok()
                .map(|raw| Self::parse_put_mode(&raw))
                .unwrap_or(defaults.put_mode),
            character_limit: env::var("EDITOR_CHARACTER_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.character_limit),
        }
    }

    fn parse_put_mode(raw: &str) -> PutMode {
        raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring PUT_MODE: {}. Falling back to upsert.", e);
            PutMode::default()
        })
    }
}
