//! PostgreSQL database plugin for the data service generator.
//!
//! Configures the generated server for PostgreSQL: connection variables in
//! `.env`, a `db` service in the development docker-compose file, the Prisma
//! datasource, and the driver dependency in `package.json`.

pub mod hooks;
pub mod plugin;
pub mod settings;

use std::sync::Arc;

use dsg_plugin::exports::{DefaultExport, PluginModule};

pub use plugin::PostgresPlugin;
pub use settings::PostgresSettings;

/// Published package identifier of this plugin.
pub const PACKAGE_NAME: &str = "@dsg/plugin-db-postgres";

/// Returns the plugin module, for registration with a resolver.
pub fn module() -> Arc<dyn PluginModule> {
    DefaultExport::<PostgresPlugin>::module()
}
