//! Event context catalog: the typed `before` payload of every event.
//!
//! Each shape is bound to exactly one [`EventName`] through [`EventShape`].
//! Hooks see the payload wrapped in an [`EventContext`] envelope and must
//! return a value that still decodes into the same shape.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dsg_core::types::{Entity, EntityField, PrismaClientGenerator, PrismaDataSource};

use super::definitions::EventName;

/// Envelope passed to `before` hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext<T> {
    /// The event-specific payload.
    pub before: T,
}

impl<T> EventContext<T> {
    /// Wraps a payload.
    pub fn new(before: T) -> Self {
        Self { before }
    }

    /// Unwraps the payload.
    pub fn into_inner(self) -> T {
        self.before
    }
}

/// A before-payload shape bound to a single event.
pub trait EventShape: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The event this shape belongs to.
    const EVENT: EventName;
}

/// Template placeholder name to replacement value.
pub type TemplateMapping = serde_json::Map<String, Value>;

/// Ordered list of single-entry variable name to value maps.
pub type VariableDictionary = Vec<BTreeMap<String, String>>;

/// An identifier node of a template AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// Identifier text.
    pub name: String,
}

impl Identifier {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A parsed template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Template path.
    pub path: String,
    /// Template source.
    pub code: String,
}

macro_rules! bind_event {
    ($shape:ty => $event:expr) => {
        impl EventShape for $shape {
            const EVENT: EventName = $event;
        }
    };
}

macro_rules! empty_event {
    ($(#[$meta:meta])* $name:ident => $event:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {}

        bind_event!($name => $event);
    };
}

/// Before payload of `createEntityService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityServiceBefore {
    pub entity_name: String,
    pub template_mapping: TemplateMapping,
    pub password_fields: Vec<EntityField>,
    pub service_id: Identifier,
    pub service_base_id: Identifier,
    pub template: TemplateFile,
}
bind_event!(CreateEntityServiceBefore => EventName::CreateEntityService);

/// Before payload of `createEntityServiceBase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityServiceBaseBefore {
    pub entity_name: String,
    pub entity: Entity,
    pub template_mapping: TemplateMapping,
    pub password_fields: Vec<EntityField>,
    pub service_id: Identifier,
    pub service_base_id: Identifier,
    pub delegate_id: Identifier,
    pub template: TemplateFile,
}
bind_event!(CreateEntityServiceBaseBefore => EventName::CreateEntityServiceBase);

/// Before payload of `createEntityController`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityControllerBefore {
    pub template_path: String,
    pub entity_name: String,
    pub entity_service_module: String,
    pub template_mapping: TemplateMapping,
    pub controller_base_id: Identifier,
    pub service_id: Identifier,
}
bind_event!(CreateEntityControllerBefore => EventName::CreateEntityController);

/// Before payload of `createEntityControllerBase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityControllerBaseBefore {
    pub base_template_path: String,
    pub entity: Entity,
    pub entity_name: String,
    pub entity_type: String,
    pub entity_service_module: String,
    pub template_mapping: TemplateMapping,
    pub controller_base_id: Identifier,
    pub service_id: Identifier,
}
bind_event!(CreateEntityControllerBaseBefore => EventName::CreateEntityControllerBase);

/// Before payload of `createAuthModules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthModulesBefore {
    /// Source directory the auth modules are generated into.
    pub src_dir: String,
}
bind_event!(CreateAuthModulesBefore => EventName::CreateAuthModules);

empty_event!(
    /// Before payload of `createAdminModules`.
    CreateAdminModulesBefore => EventName::CreateAdminModules
);

/// Before payload of `createServerDotEnv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerDotEnvBefore {
    pub env_variables: VariableDictionary,
}
bind_event!(CreateServerDotEnvBefore => EventName::CreateServerDotEnv);

impl CreateServerDotEnvBefore {
    /// Appends a variable, keeping declaration order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env_variables
            .push(BTreeMap::from([(name.into(), value.into())]));
    }

    /// Returns the last value declared for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.env_variables
            .iter()
            .rev()
            .find_map(|entry| entry.get(name))
            .map(String::as_str)
    }

    /// Renders the variables in `.env` syntax.
    pub fn render(&self) -> String {
        self.env_variables
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(name, value)| format!("{name}={value}\n"))
            .collect()
    }
}

/// Before payload of `createServerDockerCompose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerDockerComposeBefore {
    pub file_content: String,
    pub update_properties: Vec<serde_json::Map<String, Value>>,
    pub output_file_name: String,
}
bind_event!(CreateServerDockerComposeBefore => EventName::CreateServerDockerCompose);

/// Before payload of `createServerDockerComposeDB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerDockerComposeDbBefore {
    pub file_content: String,
    pub update_properties: Vec<serde_json::Map<String, Value>>,
    pub output_file_name: String,
}
bind_event!(CreateServerDockerComposeDbBefore => EventName::CreateServerDockerComposeDb);

/// Before payload of `createPrismaSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrismaSchemaBefore {
    pub entities: Vec<Entity>,
    pub data_source: PrismaDataSource,
    pub client_generator: PrismaClientGenerator,
}
bind_event!(CreatePrismaSchemaBefore => EventName::CreatePrismaSchema);

/// Before payload of `createServerPackageJson`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerPackageJsonBefore {
    pub update_values: serde_json::Map<String, Value>,
}
bind_event!(CreateServerPackageJsonBefore => EventName::CreateServerPackageJson);

empty_event!(
    /// Before payload of `createMessageBroker`.
    CreateMessageBrokerBefore => EventName::CreateMessageBroker
);
empty_event!(
    /// Before payload of `createMessageBrokerTopicsEnum`.
    CreateMessageBrokerTopicsEnumBefore => EventName::CreateMessageBrokerTopicsEnum
);
empty_event!(
    /// Before payload of `createMessageBrokerNestJSModule`.
    CreateMessageBrokerNestJsModuleBefore => EventName::CreateMessageBrokerNestJsModule
);
empty_event!(
    /// Before payload of `createMessageBrokerClientOptionsFactory`.
    CreateMessageBrokerClientOptionsFactoryBefore => EventName::CreateMessageBrokerClientOptionsFactory
);
empty_event!(
    /// Before payload of `createMessageBrokerService`.
    CreateMessageBrokerServiceBefore => EventName::CreateMessageBrokerService
);
empty_event!(
    /// Before payload of `createMessageBrokerServiceBase`.
    CreateMessageBrokerServiceBaseBefore => EventName::CreateMessageBrokerServiceBase
);
