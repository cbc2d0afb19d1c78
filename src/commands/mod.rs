//! Command line surface of `dsg`.

pub mod events;
pub mod installations;
pub mod registry;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use dsg_core::config::GeneratorConfig;
use dsg_core::AppResult;
use dsg_plugin::{ModuleResolver, PluginManager, ResolverChain, StaticResolver};

use crate::output::OutputFormat;

/// Inspect the plugin pipeline of the data service generator
#[derive(Debug, Parser)]
#[command(name = "dsg", version, about)]
pub struct Cli {
    /// Base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay merged on top, read from `config/{env}.toml`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the hook registry from the configured installations
    Registry,
    /// List the event catalog
    Events,
    /// List the configured plugin installations
    Installations,
}

impl Cli {
    pub async fn execute(&self, config: GeneratorConfig) -> AppResult<()> {
        match &self.command {
            Commands::Registry => registry::execute(&config, self.format).await,
            Commands::Events => events::execute(self.format),
            Commands::Installations => installations::execute(&config, self.format),
        }
    }
}

/// Compiled-in plugin modules.
pub fn builtin_resolver() -> StaticResolver {
    StaticResolver::new().with_package(plugin_db_postgres::PACKAGE_NAME, plugin_db_postgres::module())
}

/// Resolver used by the binary: compiled-in plugins first, then shared
/// libraries when built with the `dynamic` feature.
pub fn resolver() -> Arc<dyn ModuleResolver> {
    let chain = ResolverChain::new().with(Arc::new(builtin_resolver()));

    #[cfg(feature = "dynamic")]
    // SAFETY: shared libraries are only looked up under the configured
    // installation and local plugin directories.
    let chain = chain.with(Arc::new(unsafe { dsg_plugin::loader::DylibResolver::new() }));

    Arc::new(chain)
}

pub fn plugin_manager(config: &GeneratorConfig) -> PluginManager {
    PluginManager::from_config(resolver(), &config.plugins)
}
