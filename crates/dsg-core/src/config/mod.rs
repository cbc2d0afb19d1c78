//! Layered generator configuration.
//!
//! A base TOML file, an optional per-environment overlay and `DSG__*`
//! environment variables are merged by the `config` crate into
//! [`GeneratorConfig`].

pub mod generation;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};

pub use self::generation::GenerationConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::plugin::PluginConfig;

use crate::result::AppResult;

/// Every section is optional, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub plugins: PluginConfig,
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
}

impl GeneratorConfig {
    /// Merge `path`, then `config/{env}`, then `DSG__` variables
    /// (`DSG__PLUGINS__CONCURRENT_LOADING=false`). Missing files are skipped.
    pub fn load(path: &str, env: &str) -> AppResult<Self> {
        tracing::debug!(%path, %env, "Loading configuration");

        let overlay = format!("config/{env}");
        let merged = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("DSG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(merged.try_deserialize()?)
    }

    /// Parse a single in-memory TOML document, without overlays.
    pub fn from_toml_str(source: &str) -> AppResult<Self> {
        let parsed = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(parsed.try_deserialize()?)
    }
}
