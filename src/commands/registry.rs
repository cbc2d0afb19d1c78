//! `dsg registry`: build and report the hook registry.

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use dsg_core::config::GeneratorConfig;
use dsg_core::AppResult;
use dsg_plugin::hooks::registry::RegistrySummary;
use dsg_plugin::manager::PluginStatus;

use crate::output::{self, OutputFormat};

#[derive(Tabled)]
struct HookRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

#[derive(Tabled)]
struct PluginRow {
    #[tabled(rename = "Plugin")]
    plugin: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Hooks")]
    hooks: usize,
}

#[derive(Serialize)]
struct RegistryReport<'a> {
    registry: &'a RegistrySummary,
    plugins: &'a [PluginStatus],
    diagnostics: Vec<String>,
}

/// Execute the registry command
pub async fn execute(config: &GeneratorConfig, format: OutputFormat) -> AppResult<()> {
    let installations = &config.plugins.installations;
    info!(installations = installations.len(), "Building hook registry");

    let (registry, report) = super::plugin_manager(config)
        .build_hook_registry(installations)
        .await;
    let summary = registry.summary();
    let diagnostics: Vec<String> = report.diagnostics.iter().map(ToString::to_string).collect();

    match format {
        OutputFormat::Json => output::print_json(&RegistryReport {
            registry: &summary,
            plugins: &report.plugins,
            diagnostics,
        }),
        OutputFormat::Table => {
            let hooks: Vec<HookRow> = summary
                .events
                .iter()
                .map(|event| HookRow {
                    event: event.event.clone(),
                    before: output::join(&event.before),
                    after: output::join(&event.after),
                })
                .collect();
            let plugins: Vec<PluginRow> = report
                .plugins
                .iter()
                .map(|status| PluginRow {
                    plugin: status.plugin.clone(),
                    state: status.state.to_string(),
                    hooks: status.hooks,
                })
                .collect();

            output::print_table("Hooks", &hooks);
            println!();
            output::print_table("Plugins", &plugins);
            for diagnostic in &diagnostics {
                output::print_warning(diagnostic);
            }
        }
    }

    Ok(())
}
