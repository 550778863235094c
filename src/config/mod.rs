//! Application configuration.
//!
//! Values come from the environment (optionally via a `.env` file loaded by the binary) and
//! from a TOML settings file whose location is itself configurable.

use crate::errors::Result;
use std::path::PathBuf;
use tracing::info;

/// Database configuration and connection management
pub mod database;

/// List sizes and seed data from config.toml
pub mod settings;

/// Default location of the persisted session
pub const DEFAULT_SESSION_PATH: &str = "data/session.json";

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Everything the binary needs to start
#[derive(Debug)]
pub struct AppConfig {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `SESSION_PATH`
    pub session_path: PathBuf,
    /// `BOND_PORTAL_CONFIG`
    pub config_path: PathBuf,
    /// Parsed contents of the settings file
    pub settings: settings::Settings,
}

fn env_or(key: &str, default: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) => Ok(value),
        Err(std::env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Reads the environment and the settings file it points to.
///
/// A missing settings file is not an error; a malformed one is.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config_path = PathBuf::from(env_or("BOND_PORTAL_CONFIG", DEFAULT_CONFIG_PATH)?);
    let settings = settings::load_settings_or_default(&config_path)?;
    let config = AppConfig {
        database_url: env_or("DATABASE_URL", database::DEFAULT_DATABASE_URL)?,
        session_path: PathBuf::from(env_or("SESSION_PATH", DEFAULT_SESSION_PATH)?),
        config_path,
        settings,
    };
    info!(
        "Configuration loaded from {:?} ({} opportunity seeds)",
        config.config_path,
        config.settings.opportunities.len()
    );
    Ok(config)
}
