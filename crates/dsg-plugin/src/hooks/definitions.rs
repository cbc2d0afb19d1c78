//! Event names, hook phases, and the hook function type.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::context::GenerationContext;
use crate::error::{HookError, HookResult};

/// Enumeration of all generation events plugins may hook into.
///
/// The wire identifiers returned by [`EventName::as_str`] are a versioned
/// contract: new events are appended, existing names never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    // ── Entity service ──
    #[serde(rename = "createEntityService")]
    CreateEntityService,
    #[serde(rename = "createEntityServiceBase")]
    CreateEntityServiceBase,

    // ── Entity controller ──
    #[serde(rename = "createEntityController")]
    CreateEntityController,
    #[serde(rename = "createEntityControllerBase")]
    CreateEntityControllerBase,

    // ── Modules ──
    #[serde(rename = "createAuthModules")]
    CreateAuthModules,
    #[serde(rename = "createAdminModules")]
    CreateAdminModules,

    // ── Server files ──
    #[serde(rename = "createServerDotEnv")]
    CreateServerDotEnv,
    #[serde(rename = "createServerDockerCompose")]
    CreateServerDockerCompose,
    #[serde(rename = "createServerDockerComposeDB")]
    CreateServerDockerComposeDb,
    #[serde(rename = "createPrismaSchema")]
    CreatePrismaSchema,
    #[serde(rename = "createServerPackageJson")]
    CreateServerPackageJson,

    // ── Message broker ──
    #[serde(rename = "createMessageBroker")]
    CreateMessageBroker,
    #[serde(rename = "createMessageBrokerTopicsEnum")]
    CreateMessageBrokerTopicsEnum,
    #[serde(rename = "createMessageBrokerNestJSModule")]
    CreateMessageBrokerNestJsModule,
    #[serde(rename = "createMessageBrokerClientOptionsFactory")]
    CreateMessageBrokerClientOptionsFactory,
    #[serde(rename = "createMessageBrokerService")]
    CreateMessageBrokerService,
    #[serde(rename = "createMessageBrokerServiceBase")]
    CreateMessageBrokerServiceBase,
}

impl EventName {
    /// Every event in the catalog, in catalog order.
    pub const ALL: [EventName; 17] = [
        Self::CreateEntityService,
        Self::CreateEntityServiceBase,
        Self::CreateEntityController,
        Self::CreateEntityControllerBase,
        Self::CreateAuthModules,
        Self::CreateAdminModules,
        Self::CreateServerDotEnv,
        Self::CreateServerDockerCompose,
        Self::CreateServerDockerComposeDb,
        Self::CreatePrismaSchema,
        Self::CreateServerPackageJson,
        Self::CreateMessageBroker,
        Self::CreateMessageBrokerTopicsEnum,
        Self::CreateMessageBrokerNestJsModule,
        Self::CreateMessageBrokerClientOptionsFactory,
        Self::CreateMessageBrokerService,
        Self::CreateMessageBrokerServiceBase,
    ];

    /// Returns the wire identifier of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateEntityService => "createEntityService",
            Self::CreateEntityServiceBase => "createEntityServiceBase",
            Self::CreateEntityController => "createEntityController",
            Self::CreateEntityControllerBase => "createEntityControllerBase",
            Self::CreateAuthModules => "createAuthModules",
            Self::CreateAdminModules => "createAdminModules",
            Self::CreateServerDotEnv => "createServerDotEnv",
            Self::CreateServerDockerCompose => "createServerDockerCompose",
            Self::CreateServerDockerComposeDb => "createServerDockerComposeDB",
            Self::CreatePrismaSchema => "createPrismaSchema",
            Self::CreateServerPackageJson => "createServerPackageJson",
            Self::CreateMessageBroker => "createMessageBroker",
            Self::CreateMessageBrokerTopicsEnum => "createMessageBrokerTopicsEnum",
            Self::CreateMessageBrokerNestJsModule => "createMessageBrokerNestJSModule",
            Self::CreateMessageBrokerClientOptionsFactory => {
                "createMessageBrokerClientOptionsFactory"
            }
            Self::CreateMessageBrokerService => "createMessageBrokerService",
            Self::CreateMessageBrokerServiceBase => "createMessageBrokerServiceBase",
        }
    }

    /// Returns the field names of this event's before payload.
    pub fn before_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CreateEntityService => &[
                "entityName",
                "templateMapping",
                "passwordFields",
                "serviceId",
                "serviceBaseId",
                "template",
            ],
            Self::CreateEntityServiceBase => &[
                "entityName",
                "entity",
                "templateMapping",
                "passwordFields",
                "serviceId",
                "serviceBaseId",
                "delegateId",
                "template",
            ],
            Self::CreateEntityController => &[
                "templatePath",
                "entityName",
                "entityServiceModule",
                "templateMapping",
                "controllerBaseId",
                "serviceId",
            ],
            Self::CreateEntityControllerBase => &[
                "baseTemplatePath",
                "entity",
                "entityName",
                "entityType",
                "entityServiceModule",
                "templateMapping",
                "controllerBaseId",
                "serviceId",
            ],
            Self::CreateAuthModules => &["srcDir"],
            Self::CreateServerDotEnv => &["envVariables"],
            Self::CreateServerDockerCompose | Self::CreateServerDockerComposeDb => {
                &["fileContent", "updateProperties", "outputFileName"]
            }
            Self::CreatePrismaSchema => &["entities", "dataSource", "clientGenerator"],
            Self::CreateServerPackageJson => &["updateValues"],
            Self::CreateAdminModules
            | Self::CreateMessageBroker
            | Self::CreateMessageBrokerTopicsEnum
            | Self::CreateMessageBrokerNestJsModule
            | Self::CreateMessageBrokerClientOptionsFactory
            | Self::CreateMessageBrokerService
            | Self::CreateMessageBrokerServiceBase => &[],
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error returned when parsing an identifier that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event '{0}'")]
pub struct UnknownEvent(pub String);

impl FromStr for EventName {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|event| event.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// The two hook phases surrounding a stage's own generation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
    /// Runs before the stage, transforming its input payload.
    Before,
    /// Runs after the stage, transforming its generated artifact.
    After,
}

impl HookPhase {
    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous hook function over an untyped payload.
pub type SyncHookFn = dyn Fn(&GenerationContext, Value) -> HookResult<Value> + Send + Sync;

/// Asynchronous hook function over an untyped payload.
pub type AsyncHookFn =
    dyn Fn(&GenerationContext, Value) -> BoxFuture<'static, HookResult<Value>> + Send + Sync;

/// A hook function, in one of the two accepted callable shapes.
///
/// Hooks receive the current accumulator and return its replacement.
#[derive(Clone)]
pub enum Hook {
    /// Runs to completion on the calling task.
    Sync(Arc<SyncHookFn>),
    /// Suspends the calling task until the returned future resolves.
    Async(Arc<AsyncHookFn>),
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Hook::Sync(<fn>)"),
            Self::Async(_) => f.write_str("Hook::Async(<fn>)"),
        }
    }
}

impl Hook {
    /// Wraps a synchronous function over untyped payloads.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&GenerationContext, Value) -> HookResult<Value> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wraps an asynchronous function over untyped payloads.
    pub fn asynchronous<F, Fut>(f: F) -> Self
    where
        F: Fn(&GenerationContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<Value>> + Send + 'static,
    {
        Self::Async(Arc::new(
            move |ctx: &GenerationContext, input: Value| -> BoxFuture<'static, HookResult<Value>> {
                Box::pin(f(ctx, input))
            },
        ))
    }

    /// Wraps a synchronous function over a typed payload.
    ///
    /// The payload is decoded before the call and encoded after it, so a
    /// previous hook that broke the shape surfaces as an error here.
    pub fn sync_typed<T, F>(f: F) -> Self
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&GenerationContext, T) -> HookResult<T> + Send + Sync + 'static,
    {
        Self::sync(move |ctx: &GenerationContext, input: Value| {
            let typed: T = serde_json::from_value(input)?;
            let output = f(ctx, typed)?;
            Ok(serde_json::to_value(output)?)
        })
    }

    /// Wraps an asynchronous function over a typed payload.
    pub fn async_typed<T, F, Fut>(f: F) -> Self
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn(&GenerationContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<T>> + Send + 'static,
    {
        Self::asynchronous(move |ctx: &GenerationContext, input: Value| {
            let pending = serde_json::from_value::<T>(input).map(|typed| f(ctx, typed));
            async move {
                let output = pending?.await?;
                Ok(serde_json::to_value(output)?)
            }
        })
    }

    /// Returns whether this hook suspends the calling task.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Invokes the hook with the current accumulator.
    ///
    /// A panic inside the hook is caught and reported as a [`HookError`].
    pub async fn call(&self, ctx: &GenerationContext, input: Value) -> HookResult<Value> {
        match self {
            Self::Sync(f) => std::panic::catch_unwind(AssertUnwindSafe(|| f(ctx, input)))
                .unwrap_or_else(|payload| Err(HookError::panicked(payload))),
            Self::Async(f) => {
                let future = match std::panic::catch_unwind(AssertUnwindSafe(|| f(ctx, input))) {
                    Ok(future) => future,
                    Err(payload) => return Err(HookError::panicked(payload)),
                };
                AssertUnwindSafe(future)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(HookError::panicked(payload)))
            }
        }
    }
}

/// A hook together with the plugin that registered it.
#[derive(Debug, Clone)]
pub struct HookEntry {
    /// Display name of the owning plugin.
    pub plugin: Arc<str>,
    /// The hook function.
    pub hook: Hook,
}

impl HookEntry {
    /// Creates an entry.
    pub fn new(plugin: impl Into<Arc<str>>, hook: Hook) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
        }
    }
}
