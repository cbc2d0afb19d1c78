//! Generation context: the ambient project state available to hooks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use dsg_core::config::GenerationConfig;
use dsg_core::types::{Entity, PluginInstallation, PluginSettings};

/// Context passed to every hook invocation.
///
/// Immutable for the duration of a generation run and cheap to clone, so
/// asynchronous hooks can move a copy into their futures.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    app_name: String,
    server_dir: String,
    admin_dir: String,
    entities: Vec<Entity>,
    installations: Vec<PluginInstallation>,
}

impl GenerationContext {
    /// Starts building a context for the named application.
    pub fn builder(app_name: impl Into<String>) -> GenerationContextBuilder {
        GenerationContextBuilder {
            app_name: app_name.into(),
            server_dir: "server".to_string(),
            admin_dir: "admin-ui".to_string(),
            entities: Vec::new(),
            installations: Vec::new(),
        }
    }

    /// Builds a context from the generation settings of the configuration.
    pub fn from_config(
        config: &GenerationConfig,
        installations: Vec<PluginInstallation>,
    ) -> Self {
        Self::builder(config.app_name.clone())
            .server_dir(config.server_dir.clone())
            .admin_dir(config.admin_dir.clone())
            .installations(installations)
            .build()
    }

    /// Identifier of this generation run, for log correlation.
    pub fn run_id(&self) -> Uuid {
        self.inner.run_id
    }

    /// When this generation run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Name of the generated application.
    pub fn app_name(&self) -> &str {
        &self.inner.app_name
    }

    /// Output directory of the generated server.
    pub fn server_dir(&self) -> &str {
        &self.inner.server_dir
    }

    /// Output directory of the generated admin UI.
    pub fn admin_dir(&self) -> &str {
        &self.inner.admin_dir
    }

    /// Entities of the generated application.
    pub fn entities(&self) -> &[Entity] {
        &self.inner.entities
    }

    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.inner.entities.iter().find(|e| e.name == name)
    }

    /// Installed plugins, in installation order.
    pub fn installations(&self) -> &[PluginInstallation] {
        &self.inner.installations
    }

    /// Returns the installation of the plugin published as `npm`.
    ///
    /// Plugins use this to read their own settings and configurations.
    pub fn plugin_installation(&self, npm: &str) -> Option<&PluginInstallation> {
        self.inner.installations.iter().find(|i| i.npm == npm)
    }

    /// Returns the settings of the plugin published as `npm`.
    pub fn plugin_settings(&self, npm: &str) -> Option<&PluginSettings> {
        self.plugin_installation(npm).map(|i| &i.settings)
    }
}

/// Builder for [`GenerationContext`].
#[derive(Debug)]
pub struct GenerationContextBuilder {
    app_name: String,
    server_dir: String,
    admin_dir: String,
    entities: Vec<Entity>,
    installations: Vec<PluginInstallation>,
}

impl GenerationContextBuilder {
    /// Sets the server output directory.
    pub fn server_dir(mut self, dir: impl Into<String>) -> Self {
        self.server_dir = dir.into();
        self
    }

    /// Sets the admin UI output directory.
    pub fn admin_dir(mut self, dir: impl Into<String>) -> Self {
        self.admin_dir = dir.into();
        self
    }

    /// Sets the entity list.
    pub fn entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// Sets the plugin installations.
    pub fn installations(mut self, installations: Vec<PluginInstallation>) -> Self {
        self.installations = installations;
        self
    }

    /// Finishes the context, stamping a fresh run identifier.
    pub fn build(self) -> GenerationContext {
        GenerationContext {
            inner: Arc::new(ContextInner {
                run_id: Uuid::now_v7(),
                started_at: Utc::now(),
                app_name: self.app_name,
                server_dir: self.server_dir,
                admin_dir: self.admin_dir,
                entities: self.entities,
                installations: self.installations,
            }),
        }
    }
}
