use crate::domain::policy::ConflictPolicy;
use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Domain configuration loaded from files and environment
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub enabled: bool,
    pub main: DomainSettings,
    #[serde(default)]
    pub domains: HashMap<String, DomainSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DomainSettings {
    pub base_url: String,
    #[serde(default)]
    pub headers: Vec<HeaderSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeaderSettings {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub policy: ConflictPolicy,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("enabled", true)?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("DOMAIN_REWRITE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load settings from a single file; the format follows the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder()
            .set_default("enabled", true)?
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
