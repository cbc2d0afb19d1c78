//! `[plugins]` section.

use serde::{Deserialize, Serialize};

use crate::types::installation::PluginInstallation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Directory holding published plugin packages, one sub-directory per
    /// package name. Packages resolve by name alone when unset.
    pub installation_dir: Option<String>,
    /// Local plugin destination paths are joined onto this directory.
    pub local_base_dir: String,
    /// Resolve modules concurrently. Hook order follows `installations`
    /// either way.
    pub concurrent_loading: bool,
    pub installations: Vec<PluginInstallation>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            installation_dir: None,
            local_base_dir: ".".into(),
            concurrent_loading: true,
            installations: Vec::new(),
        }
    }
}
