//! Generated application settings.

use serde::{Deserialize, Serialize};

/// Settings describing the application being generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Application name, used for package names and service identifiers.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Output directory of the generated server.
    #[serde(default = "default_server_dir")]
    pub server_dir: String,
    /// Output directory of the generated admin UI.
    #[serde(default = "default_admin_dir")]
    pub admin_dir: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            server_dir: default_server_dir(),
            admin_dir: default_admin_dir(),
        }
    }
}

fn default_app_name() -> String {
    "sample-service".to_string()
}

fn default_server_dir() -> String {
    "server".to_string()
}

fn default_admin_dir() -> String {
    "admin-ui".to_string()
}
