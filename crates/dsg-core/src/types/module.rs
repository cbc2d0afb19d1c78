//! Generated source artifacts.

use serde::{Deserialize, Serialize};

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedModule {
    /// Path relative to the output root.
    pub path: String,
    /// File contents.
    pub code: String,
}

impl GeneratedModule {
    /// Creates a module.
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

/// Ordered set of generated files produced by one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedModules(pub Vec<GeneratedModule>);

impl GeneratedModules {
    /// Creates an empty module set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, replacing any existing module at the same path.
    pub fn set(&mut self, module: GeneratedModule) {
        match self.0.iter_mut().find(|m| m.path == module.path) {
            Some(existing) => *existing = module,
            None => self.0.push(module),
        }
    }

    /// Returns the module at `path`.
    pub fn get(&self, path: &str) -> Option<&GeneratedModule> {
        self.0.iter().find(|m| m.path == path)
    }

    /// Returns the number of modules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no modules were generated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the modules in order.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedModule> {
        self.0.iter()
    }
}

impl From<Vec<GeneratedModule>> for GeneratedModules {
    fn from(modules: Vec<GeneratedModule>) -> Self {
        Self(modules)
    }
}
