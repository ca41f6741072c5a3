//! Named environment presets

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for one target environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub base_url: String,
    pub api_base_url: String,
    pub database_url: String,
    /// Page timeout in milliseconds
    pub timeout: u64,
    pub retry_count: u32,
    pub parallel_workers: u32,
    pub headless: bool,
    pub video: bool,
    pub trace: bool,
}

impl EnvironmentConfig {
    pub const NAMES: [&'static str; 4] = ["dev", "staging", "prod", "local"];

    pub fn dev() -> Self {
        Self {
            name: "dev".to_string(),
            base_url: "https://practicetestautomation.com".to_string(),
            api_base_url: String::new(),
            database_url: String::new(),
            timeout: 30_000,
            retry_count: 2,
            parallel_workers: 1,
            headless: true,
            video: false,
            trace: false,
        }
    }

    pub fn staging() -> Self {
        Self {
            name: "staging".to_string(),
            base_url: "https://staging.practicetestautomation.com".to_string(),
            timeout: 45_000,
            retry_count: 3,
            parallel_workers: 2,
            video: true,
            trace: true,
            ..Self::dev()
        }
    }

    pub fn prod() -> Self {
        Self {
            name: "prod".to_string(),
            timeout: 60_000,
            retry_count: 3,
            video: true,
            trace: true,
            ..Self::dev()
        }
    }

    pub fn local() -> Self {
        Self {
            name: "local".to_string(),
            base_url: "http://localhost:3000".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            database_url: "sqlite:///test.db".to_string(),
            timeout: 15_000,
            retry_count: 1,
            parallel_workers: 1,
            headless: false,
            video: false,
            trace: false,
        }
    }

    /// Look up a preset by name
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "dev" => Ok(Self::dev()),
            "staging" => Ok(Self::staging()),
            "prod" => Ok(Self::prod()),
            "local" => Ok(Self::local()),
            other => Err(Error::UnknownEnvironment {
                name: other.to_string(),
                available: Self::NAMES.join(", "),
            }),
        }
    }

    /// Every preset, in declaration order
    pub fn all() -> Vec<Self> {
        vec![Self::dev(), Self::staging(), Self::prod(), Self::local()]
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_presets() {
        for name in EnvironmentConfig::NAMES {
            assert_eq!(EnvironmentConfig::named(name).unwrap().name, name);
        }
        assert_eq!(EnvironmentConfig::all().len(), 4);
    }

    #[test]
    fn test_staging_values() {
        let staging = EnvironmentConfig::staging();
        assert_eq!(staging.timeout(), Duration::from_secs(45));
        assert_eq!(staging.parallel_workers, 2);
        assert!(staging.trace);
    }

    #[test]
    fn test_local_runs_headed() {
        let local = EnvironmentConfig::local();
        assert!(!local.headless);
        assert_eq!(local.database_url, "sqlite:///test.db");
    }

    #[test]
    fn test_unknown_environment_lists_available() {
        let err = EnvironmentConfig::named("qa").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("qa"));
        assert!(message.contains("dev, staging, prod, local"));
    }
}
