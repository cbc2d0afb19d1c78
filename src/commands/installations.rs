//! `dsg installations`: list configured plugin installations.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use dsg_core::config::GeneratorConfig;
use dsg_core::AppResult;
use dsg_plugin::PluginLoader;

use crate::output::{self, OutputFormat};

#[derive(Serialize, Tabled)]
struct InstallationRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Plugin")]
    plugin: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "Resolves")]
    request: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Execute the installations command
pub fn execute(config: &GeneratorConfig, format: OutputFormat) -> AppResult<()> {
    let loader = PluginLoader::from_config(Arc::new(super::builtin_resolver()), &config.plugins);

    let rows: Vec<InstallationRow> = config
        .plugins
        .installations
        .iter()
        .enumerate()
        .map(|(position, installation)| {
            let request = loader.request_for(installation);
            InstallationRow {
                position,
                plugin: installation.display_name().to_string(),
                version: installation.version.clone().unwrap_or_else(|| "-".to_string()),
                enabled: installation.enabled,
                path: request
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                request: request.to_string(),
            }
        })
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Table => output::print_table("Installations", &rows),
    }

    Ok(())
}
