//! Configuration management for the relationship engine.
//!
//! Composes the database connection settings (environment-driven) with the
//! engine tuning knobs (config.toml-driven) into one [`AppConfig`] the
//! hosting application loads at startup.

/// Database configuration and connection management
pub mod database;

/// Engine tuning configuration loading from config.toml
pub mod engine;

use crate::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database URL the store adapter connects to
    pub database_url: String,
    /// Engine tuning knobs
    pub engine: engine::EngineConfig,
}

/// Loads the complete application configuration.
///
/// Reads `.env` if present (environment variables set externally win), takes
/// the database URL from `DATABASE_URL`, and loads `[engine]` tuning from
/// `config.toml`. A missing config file is not an error; defaults apply.
///
/// # Errors
/// Returns an error if a config file exists but cannot be parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let database_url = database::get_database_url();

    let engine = if std::path::Path::new("config.toml").exists() {
        engine::load_default_config()?.engine
    } else {
        info!("No config.toml found, using engine defaults");
        engine::EngineConfig::default()
    };

    Ok(AppConfig {
        database_url,
        engine,
    })
}

/// Initializes the global tracing subscriber with an env-filterable format
/// layer. Intended for hosting binaries; calling it twice panics, so tests
/// use their own `try_init`-based setup instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
