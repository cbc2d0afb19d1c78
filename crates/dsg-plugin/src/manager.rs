//! Plugin manager: builds the hook registry for a generation run.
//!
//! Loads every installation, instantiates each resolved module, and folds
//! the valid registrations into a [`HookRegistry`] in installation order.
//! Per-plugin failures never escape; they are collected in a [`LoadReport`].

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use dsg_core::config::PluginConfig;
use dsg_core::types::PluginInstallation;

use crate::error::PluginError;
use crate::hooks::registry::HookRegistry;
use crate::instantiator::{Validation, instantiate};
use crate::loader::{LoadOutcome, PluginLoader};
use crate::resolver::ModuleResolver;

/// How far one installation got through loading and instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Registered at least one callable hook.
    Registered,
    /// Loaded but registered no callable hook, including plugins without a
    /// `register` capability.
    NoHooks,
    /// Disabled in its installation.
    Disabled,
    /// Module could not be resolved.
    LoadFailed,
    /// Module resolved but its entry point or registration was malformed.
    Malformed,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Registered => "registered",
            Self::NoHooks => "no_hooks",
            Self::Disabled => "disabled",
            Self::LoadFailed => "load_failed",
            Self::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Status of one installation after registry construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginStatus {
    /// Plugin display name.
    pub plugin: String,
    /// Outcome.
    pub state: PluginState,
    /// Number of callable hooks contributed.
    pub hooks: usize,
}

/// Diagnostics collected while building a registry.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// One status per installation, in installation order.
    pub plugins: Vec<PluginStatus>,
    /// Recovered construction-time errors, in installation order.
    pub diagnostics: Vec<PluginError>,
}

impl LoadReport {
    /// Returns the status of the named plugin, if it was installed.
    pub fn status(&self, plugin: &str) -> Option<&PluginStatus> {
        self.plugins.iter().find(|status| status.plugin == plugin)
    }

    /// Returns whether any diagnostic was recorded.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Builds hook registries from plugin installations.
#[derive(Debug, Clone)]
pub struct PluginManager {
    loader: PluginLoader,
}

impl PluginManager {
    /// Creates a manager with default loader settings.
    pub fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            loader: PluginLoader::new(resolver),
        }
    }

    /// Creates a manager from the plugin configuration section.
    pub fn from_config(resolver: Arc<dyn ModuleResolver>, config: &PluginConfig) -> Self {
        Self {
            loader: PluginLoader::from_config(resolver, config),
        }
    }

    /// Creates a manager around a configured loader.
    pub fn with_loader(loader: PluginLoader) -> Self {
        Self { loader }
    }

    /// Returns the loader.
    pub fn loader(&self) -> &PluginLoader {
        &self.loader
    }

    /// Builds the registry for `installations`, in their given order.
    ///
    /// Never fails: installations that cannot be loaded or instantiated
    /// contribute nothing and are reported in the returned [`LoadReport`].
    pub async fn build_hook_registry(
        &self,
        installations: &[PluginInstallation],
    ) -> (HookRegistry, LoadReport) {
        let outcomes = self.loader.load_all(installations).await;

        let mut report = LoadReport::default();
        let mut registrations = Vec::with_capacity(outcomes.len());
        let mut setup_only = 0usize;

        for outcome in outcomes {
            match outcome {
                LoadOutcome::Loaded(loaded) => {
                    match instantiate(&loaded.plugin, loaded.module.as_ref()) {
                        Validation::Valid(mut registration) => {
                            let hooks = registration
                                .events
                                .iter()
                                .map(|(_, pair)| {
                                    usize::from(pair.before.is_some())
                                        + usize::from(pair.after.is_some())
                                })
                                .sum();
                            report.plugins.push(PluginStatus {
                                plugin: loaded.plugin.to_string(),
                                state: if hooks > 0 {
                                    PluginState::Registered
                                } else {
                                    PluginState::NoHooks
                                },
                                hooks,
                            });
                            report.diagnostics.append(&mut registration.dropped);
                            registrations.push(registration);
                        }
                        Validation::SetupOnly(err) => {
                            report.plugins.push(PluginStatus {
                                plugin: loaded.plugin.to_string(),
                                state: PluginState::NoHooks,
                                hooks: 0,
                            });
                            report.diagnostics.push(err);
                            setup_only += 1;
                        }
                        Validation::Invalid(err) => {
                            report.plugins.push(PluginStatus {
                                plugin: loaded.plugin.to_string(),
                                state: PluginState::Malformed,
                                hooks: 0,
                            });
                            report.diagnostics.push(err);
                        }
                    }
                }
                LoadOutcome::Skipped { plugin } => report.plugins.push(PluginStatus {
                    plugin,
                    state: PluginState::Disabled,
                    hooks: 0,
                }),
                LoadOutcome::Failed(err) => {
                    report.plugins.push(PluginStatus {
                        plugin: err.plugin().unwrap_or_default().to_string(),
                        state: PluginState::LoadFailed,
                        hooks: 0,
                    });
                    report.diagnostics.push(err);
                }
            }
        }

        let registry = HookRegistry::build(registrations);

        let problems = report.diagnostics.len() - setup_only;
        if problems > 0 {
            warn!(
                diagnostics = problems,
                "Some plugins contributed no hooks or dropped hooks"
            );
        }
        info!(
            plugins = installations.len(),
            events = registry.events().count(),
            hooks = registry.hook_count(),
            "Plugins registered"
        );

        (registry, report)
    }
}

/// Builds the hook registry for `installations`.
///
/// Packages are resolved by name, rooted under `installation_dir` when one
/// is given; local plugins resolve relative to the working directory.
pub async fn build_hook_registry(
    resolver: Arc<dyn ModuleResolver>,
    installations: &[PluginInstallation],
    installation_dir: Option<&Path>,
) -> HookRegistry {
    let loader =
        PluginLoader::new(resolver).installation_dir(installation_dir.map(Path::to_path_buf));
    let (registry, _) = PluginManager::with_loader(loader)
        .build_hook_registry(installations)
        .await;
    registry
}
