//! Deep filter settings.
//!
//! [`DeepFilterConfig::load()`] reads the `[deepfilter]` section of
//! `config/config.toml`, overridden by `DEEPGUARD__DEEPFILTER__*`
//! environment variables. A missing file or section yields the defaults.

use crate::filter::DeepFilterOptions;
use crate::naming::SnakeCaseNaming;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "DEEPGUARD";
const SECTION: &str = "deepfilter";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct DeepFilterConfig {
    /// Treat `*` in string values as a LIKE wildcard
    #[serde(default)]
    pub wildcards: bool,
    /// Prefix prepended to every derived table name
    #[serde(default)]
    pub table_prefix: String,
    /// Use singular table names (`person` instead of `people`)
    #[serde(default)]
    pub singular_table: bool,
}

impl DeepFilterConfig {
    /// Load the settings from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env_source());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder().add_source(env_source()).build().map_err(|env_err| {
                    ConfigError::Message(format!(
                        "failed to load configuration: {err}; env-only fallback: {env_err}"
                    ))
                })?
            }
        };

        Self::from_settings(&settings)
    }

    /// Parse settings from a TOML document holding a `[deepfilter]` table
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<DeepFilterConfig>(SECTION) {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "deep filter configuration could not be loaded: {e}"
            ))),
        }
    }

    pub fn options(&self) -> DeepFilterOptions {
        DeepFilterOptions::default().wildcards(self.wildcards)
    }

    /// Naming strategy described by these settings
    pub fn naming(&self) -> SnakeCaseNaming {
        let naming = SnakeCaseNaming::new().with_table_prefix(self.table_prefix.clone());
        if self.singular_table {
            naming.singular()
        } else {
            naming
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}
