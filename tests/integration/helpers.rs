//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use dsg_core::types::PluginInstallation;
use dsg_plugin::exports::{PluginEntry, PluginModule, RegistrationValue};
use dsg_plugin::{GenerationContext, HookRegistry, ModuleRequest, ModuleResolver, PluginManager, ResolveError};
use dsg_plugin::manager::LoadReport;

type RegisterFn = dyn Fn() -> Option<RegistrationValue> + Send + Sync;

/// Module whose default export registers whatever the closure returns.
pub struct FnModule {
    register: Arc<RegisterFn>,
}

struct FnEntry(Arc<RegisterFn>);

impl PluginEntry for FnEntry {
    fn register(&self) -> Option<RegistrationValue> {
        (self.0)()
    }
}

impl PluginModule for FnModule {
    fn default_export(&self) -> Option<Box<dyn PluginEntry>> {
        Some(Box::new(FnEntry(self.register.clone())))
    }
}

/// Creates a module from a registration closure.
pub fn module<F>(register: F) -> Arc<dyn PluginModule>
where
    F: Fn() -> Option<RegistrationValue> + Send + Sync + 'static,
{
    Arc::new(FnModule {
        register: Arc::new(register),
    })
}

/// Fake resolver serving packages after a simulated load latency.
#[derive(Default)]
pub struct LatencyResolver {
    packages: HashMap<String, (Duration, Arc<dyn PluginModule>)>,
}

impl LatencyResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `module` for `name` after `millis` milliseconds.
    pub fn with(mut self, name: &str, millis: u64, module: Arc<dyn PluginModule>) -> Self {
        self.packages
            .insert(name.to_string(), (Duration::from_millis(millis), module));
        self
    }
}

#[async_trait]
impl ModuleResolver for LatencyResolver {
    async fn resolve(&self, request: &ModuleRequest) -> Result<Arc<dyn PluginModule>, ResolveError> {
        let target = request.target();
        let (delay, module) = self
            .packages
            .get(&target)
            .ok_or_else(|| ResolveError::NotFound(target.clone()))?;
        tokio::time::sleep(*delay).await;
        Ok(module.clone())
    }
}

/// Installations of the named packages, in order.
pub fn installations(names: &[&str]) -> Vec<PluginInstallation> {
    names
        .iter()
        .map(|name| PluginInstallation::package(*name))
        .collect()
}

/// Builds a registry with a fresh manager.
pub async fn build(
    resolver: Arc<dyn ModuleResolver>,
    installations: &[PluginInstallation],
) -> (HookRegistry, LoadReport) {
    PluginManager::new(resolver)
        .build_hook_registry(installations)
        .await
}

/// Generation context for tests.
pub fn context() -> GenerationContext {
    GenerationContext::builder("integration-app").build()
}

/// Shared, ordered record of what ran.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    /// Records a step.
    pub fn push(&self, step: impl Into<String>) {
        self.0.lock().unwrap().push(step.into());
    }

    /// Returns the recorded steps.
    pub fn steps(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
