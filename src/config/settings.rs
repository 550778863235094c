//! Settings loading from config.toml
//!
//! The file sets the page size of each list and, optionally, the investment opportunities used
//! to seed an empty database. Every key is optional: missing `[lists]` entries fall back to the
//! catalog defaults and a missing `[[opportunities]]` array seeds nothing.

use crate::{
    entities::{OpportunityStatus, RiskLevel},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Page sizes per list
    #[serde(default)]
    pub lists: ListsConfig,
    /// Offerings to list when the opportunities table is empty
    #[serde(default)]
    pub opportunities: Vec<OpportunitySeed>,
}

/// Page size of every list in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    pub users: u64,
    pub transactions: u64,
    pub opportunities: u64,
    pub admin_posts: u64,
    pub blog: u64,
    pub webinars: u64,
    pub documents: u64,
    pub projects: u64,
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            users: 10,
            transactions: 10,
            opportunities: 12,
            admin_posts: 10,
            blog: 12,
            webinars: 12,
            documents: 10,
            projects: 12,
        }
    }
}

/// Configuration for a single seeded offering
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunitySeed {
    pub title: String,
    pub issuer: String,
    /// Annual coupon rate in percent
    pub rate: f64,
    pub min_investment: f64,
    pub max_investment: f64,
    #[serde(default)]
    pub current_funding: f64,
    pub status: OpportunityStatus,
    pub risk_level: RiskLevel,
    pub term_months: i32,
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A seeded opportunity is missing a field or uses an unknown status/risk level
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `path`, or the defaults when the file does not exist.
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    if !path.as_ref().exists() {
        tracing::warn!(
            "Config file {:?} not found, using default settings",
            path.as_ref()
        );
        return Ok(Settings::default());
    }
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            [lists]
            users = 25
            blog = 6

            [[opportunities]]
            title = "Harbour Expansion Bond"
            issuer = "Port Authority"
            rate = 6.5
            min_investment = 1000.0
            max_investment = 2000000.0
            status = "active"
            risk_level = "low"
            term_months = 36
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.lists.users, 25);
        assert_eq!(settings.lists.blog, 6);
        // Unset sizes keep their defaults
        assert_eq!(settings.lists.opportunities, 12);
        assert_eq!(settings.lists.documents, 10);

        assert_eq!(settings.opportunities.len(), 1);
        let seed = &settings.opportunities[0];
        assert_eq!(seed.status, OpportunityStatus::Active);
        assert_eq!(seed.risk_level, RiskLevel::Low);
        assert_eq!(seed.current_funding, 0.0);
    }

    #[test]
    fn test_unknown_status_is_a_config_error() {
        let toml_str = r#"
            [[opportunities]]
            title = "Bad"
            issuer = "Nobody"
            rate = 1.0
            min_investment = 1.0
            max_investment = 2.0
            status = "open"
            risk_level = "low"
            term_months = 12
        "#;
        assert!(matches!(parse_settings(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.lists, ListsConfig::default());
        assert!(settings.opportunities.is_empty());

        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[lists]\nprojects = 4").unwrap();
        assert_eq!(load_settings_or_default(&path).unwrap().lists.projects, 4);
    }
}
