//! Application configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/fintwin/config/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Sections missing from an override file take their embedded values, so an
//! override only needs to name what it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::UserProfile;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Settings for advisor requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Sampling temperature
    pub temperature: f32,
    /// Most recent conversation entries sent with each prompt
    pub max_history: usize,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_history: 20,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Currency symbol for rendering amounts
    pub currency: String,
    /// Profile every session starts from
    pub profile: UserProfile,
    pub advisor: AdvisorSettings,
    /// Where the config was read from (None = embedded defaults)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Parse the embedded default configuration
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Load configuration (explicit path, then data dir override, then embedded)
    ///
    /// An explicit path that does not exist is an error; a missing data dir
    /// override silently falls back to the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return load_file(path);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                return load_file(&default_path);
            }
        }

        debug!("Using embedded default configuration");
        Self::embedded()
    }

    /// Render this configuration back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintwin").join("config").join("config.toml"))
}

fn load_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let mut config = parse_config(&content)?;
    config.source = Some(path.to_path_buf());
    debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    currency: Option<String>,
    profile: Option<UserProfile>,
    advisor: Option<RawAdvisor>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    temperature: Option<f32>,
    max_history: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let profile = match raw.profile {
        Some(profile) => profile,
        None => embedded_profile()?,
    };
    profile.validate()?;

    let mut advisor = AdvisorSettings::default();
    if let Some(raw_advisor) = raw.advisor {
        if let Some(temperature) = raw_advisor.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::Config(format!(
                    "advisor.temperature must be between 0 and 2, got {}",
                    temperature
                )));
            }
            advisor.temperature = temperature;
        }
        if let Some(max_history) = raw_advisor.max_history {
            advisor.max_history = max_history;
        }
    }

    Ok(AppConfig {
        currency: raw.currency.unwrap_or_else(|| "₹".to_string()),
        profile,
        advisor,
        source: None,
    })
}

fn embedded_profile() -> Result<UserProfile> {
    let raw: RawConfig = toml::from_str(DEFAULT_CONFIG)
        .map_err(|e| Error::Config(format!("Invalid embedded config: {}", e)))?;
    raw.profile
        .ok_or_else(|| Error::Config("Embedded config has no [profile] section".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskAppetite;

    #[test]
    fn test_parse_default_config() {
        let config = AppConfig::embedded().unwrap();
        assert_eq!(config.currency, "₹");
        assert_eq!(config.profile.name, "Rahul Sharma");
        assert_eq!(config.profile.goal.target_amount, 60000);
        assert_eq!(config.profile.expenses.other, 5000);
        assert_eq!(config.profile.risk_appetite, RiskAppetite::Low);
        assert!((config.advisor.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.advisor.max_history, 20);
        assert!(config.source.is_none());
    }

    #[test]
    fn test_partial_override_keeps_embedded_profile() {
        let config = parse_config("currency = \"$\"\n[advisor]\nmax_history = 4\n").unwrap();
        assert_eq!(config.currency, "$");
        assert_eq!(config.advisor.max_history, 4);
        assert!((config.advisor.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.profile.goal.name, "Laptop");
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let result = parse_config("[advisor]\ntemperature = 5.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(parse_config("currency = ").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::embedded().unwrap();
        config.profile.current_savings = 1234;
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.profile.current_savings, 1234);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
