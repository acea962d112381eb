//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PARLANCE_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use parlance::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod ai;
mod database;
mod error;
mod files;
mod redis;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use files::FilesConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the Parlance service API.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (rate limiting); optional
    pub redis: Option<RedisConfig>,

    /// AI provider configuration (suggestions, transcription, speech)
    #[serde(default)]
    pub ai: AiConfig,

    /// Signed file URL configuration
    pub files: FilesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PARLANCE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PARLANCE__SERVER__PORT=5001` -> `server.port = 5001`
    /// - `PARLANCE__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PARLANCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL formats
    /// - Pool size constraints
    /// - Signing key presence and signature lifetime bounds
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.ai.validate()?;
        self.files.validate()?;
        Ok(())
    }
}
