//! Plugin installation descriptors.

use serde::{Deserialize, Serialize};

/// One installed plugin, as supplied by the caller before registry
/// construction. Position in the input list is the installation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInstallation {
    /// Installation identifier.
    #[serde(default)]
    pub id: String,
    /// Catalog identifier of the plugin.
    #[serde(default, alias = "pluginid", alias = "plugin_id")]
    pub plugin_id: String,
    /// Published package identifier.
    #[serde(default)]
    pub npm: String,
    /// Disabled installations are skipped by the loader.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Installed version. Informational only.
    #[serde(default)]
    pub version: Option<String>,
    /// Resolution settings.
    #[serde(default)]
    pub settings: PluginSettings,
    /// Free-form plugin configuration readable from hooks.
    #[serde(default)]
    pub configurations: serde_json::Map<String, serde_json::Value>,
}

/// Installation settings that select how the plugin module is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    /// Resolve from a local path instead of a published package.
    #[serde(default)]
    pub local: bool,
    /// Destination path of a local plugin, relative to the local base directory.
    #[serde(default, alias = "destpath", alias = "dest_path")]
    pub dest_path: Option<String>,
    /// Remaining plugin-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Where a plugin module comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// A published package, resolved by name.
    Package(String),
    /// A local module, resolved from a destination path.
    Local {
        /// Path relative to the local base directory.
        dest_path: String,
    },
}

impl PluginInstallation {
    /// Creates an enabled installation of a published package.
    pub fn package(npm: impl Into<String>) -> Self {
        let npm = npm.into();
        Self {
            id: npm.clone(),
            plugin_id: npm.clone(),
            npm,
            enabled: true,
            version: None,
            settings: PluginSettings::default(),
            configurations: serde_json::Map::new(),
        }
    }

    /// Creates an enabled installation of a local plugin.
    pub fn local(npm: impl Into<String>, dest_path: impl Into<String>) -> Self {
        let mut installation = Self::package(npm);
        installation.settings.local = true;
        installation.settings.dest_path = Some(dest_path.into());
        installation
    }

    /// Returns whether this installation resolves from a local path.
    pub fn is_local(&self) -> bool {
        self.settings.local
    }

    /// Returns the resolution source of this installation.
    ///
    /// A local installation without a destination path falls back to
    /// resolving its package name.
    pub fn source(&self) -> PluginSource {
        match (self.settings.local, &self.settings.dest_path) {
            (true, Some(dest_path)) => PluginSource::Local {
                dest_path: dest_path.clone(),
            },
            _ => PluginSource::Package(self.npm.clone()),
        }
    }

    /// Name used to attribute diagnostics and hooks to this plugin.
    pub fn display_name(&self) -> &str {
        if !self.npm.is_empty() {
            return &self.npm;
        }
        self.settings
            .dest_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.id)
    }
}

fn default_true() -> bool {
    true
}
