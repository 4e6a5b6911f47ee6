//! Rate source configuration.
//!
//! Values come from, lowest to highest priority: built-in defaults, a TOML file,
//! and `BR_FINANCE_*` environment variables.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rates::RateSet;

pub const SELIC_URL: &str =
    "https://api.bcb.gov.br/dados/serie/bcdata.sgs.432/dados/ultimos/1?formato=json";
pub const DOLLAR_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

pub const ENV_SELIC_URL: &str = "BR_FINANCE_SELIC_URL";
pub const ENV_DOLLAR_URL: &str = "BR_FINANCE_DOLLAR_URL";
pub const ENV_TIMEOUT_SECS: &str = "BR_FINANCE_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the rate source starts from and where it refreshes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Rates used until (and whenever) a refresh fails.
    pub defaults: RateSet,
    /// BCB SGS series 432 (Selic target).
    pub selic_url: String,
    /// USD quote endpoint; must return `{"rates": {"BRL": ...}}`.
    pub dollar_url: String,
    /// Per request timeout.
    pub timeout_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            defaults: RateSet::default(),
            selic_url: SELIC_URL.to_string(),
            dollar_url: DOLLAR_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RatesConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RatesConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BR_FINANCE_*` overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SELIC_URL) {
            self.selic_url = url;
        }
        if let Some(url) = lookup(ENV_DOLLAR_URL) {
            self.dollar_url = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::EnvError(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {timeout:?}"
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }

        for (name, url) in [("selic_url", &self.selic_url), ("dollar_url", &self.dollar_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }

        let defaults = &self.defaults;
        for (name, value) in [
            ("selic", defaults.selic),
            ("cdi", defaults.cdi),
            ("ipca", defaults.ipca),
            ("dollar", defaults.dollar),
            ("savings", defaults.savings),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::Invalid(format!("default {name} rate cannot be negative")));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
