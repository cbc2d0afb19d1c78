//! Hook dispatcher: drives the before/base/after pipeline of one stage.
//!
//! For each phase:
//! - Hooks are called in registry order, each receiving the accumulator
//!   produced by the previous one.
//! - An empty hook list leaves the accumulator unchanged.
//! - A failing, panicking, or shape-breaking hook aborts the stage; no
//!   later hook, base logic, or after phase runs.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::context::GenerationContext;
use crate::error::{HookError, PluginError};

use super::catalog::{EventContext, EventShape};
use super::definitions::HookPhase;
use super::registry::HookRegistry;

/// Runs registered hooks around a stage executor's base logic.
#[derive(Debug, Clone, Copy)]
pub struct HookDispatcher<'a> {
    /// Registry consulted for every event.
    registry: &'a HookRegistry,
    /// Execution context handed to every hook.
    context: &'a GenerationContext,
}

impl<'a> HookDispatcher<'a> {
    /// Creates a dispatcher over a built registry.
    pub fn new(registry: &'a HookRegistry, context: &'a GenerationContext) -> Self {
        Self { registry, context }
    }

    /// Runs the full pipeline for the event bound to `T`.
    ///
    /// `base` receives the accumulated before payload and produces the
    /// stage's artifact, which the after hooks then transform.
    pub async fn run_stage<T, A, F, Fut, E>(&self, before: T, base: F) -> Result<A, PluginError>
    where
        T: EventShape,
        A: Serialize + DeserializeOwned,
        F: FnOnce(EventContext<T>) -> Fut,
        Fut: Future<Output = Result<A, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let params = self.run_before(before).await?;

        let artifact = base(params).await.map_err(|e| {
            let source = e.into();
            error!(event = %T::EVENT, error = %source, "Stage base logic failed");
            PluginError::Stage {
                event: T::EVENT.to_string(),
                message: source.to_string(),
                source: Some(source),
            }
        })?;

        self.run_after::<T, A>(artifact).await
    }

    /// Runs the `before` hooks of the event bound to `T`.
    pub async fn run_before<T: EventShape>(
        &self,
        before: T,
    ) -> Result<EventContext<T>, PluginError> {
        let params = EventContext::new(before);
        if self.registry.get(T::EVENT).before.is_empty() {
            return Ok(params);
        }

        let input = encode(T::EVENT.as_str(), &params)?;
        let output = self
            .reduce(T::EVENT.as_str(), HookPhase::Before, input, |value| {
                EventContext::<T>::deserialize(value).map(drop)
            })
            .await?;

        decode(T::EVENT.as_str(), output)
    }

    /// Runs the `after` hooks of the event bound to `T` over an artifact.
    pub async fn run_after<T, A>(&self, artifact: A) -> Result<A, PluginError>
    where
        T: EventShape,
        A: Serialize + DeserializeOwned,
    {
        if self.registry.get(T::EVENT).after.is_empty() {
            return Ok(artifact);
        }

        let input = encode(T::EVENT.as_str(), &artifact)?;
        let output = self
            .reduce(T::EVENT.as_str(), HookPhase::After, input, |value| {
                A::deserialize(value).map(drop)
            })
            .await?;

        decode(T::EVENT.as_str(), output)
    }

    /// Runs one phase of any event over an untyped payload.
    ///
    /// Used for events outside the catalog; no shape checking is applied.
    pub async fn dispatch(
        &self,
        event: &str,
        phase: HookPhase,
        input: Value,
    ) -> Result<Value, PluginError> {
        self.reduce(event, phase, input, |_| Ok(())).await
    }

    async fn reduce<C>(
        &self,
        event: &str,
        phase: HookPhase,
        input: Value,
        check: C,
    ) -> Result<Value, PluginError>
    where
        C: Fn(&Value) -> Result<(), serde_json::Error>,
    {
        let hooks = self.registry.get(event).phase(phase);
        if hooks.is_empty() {
            return Ok(input);
        }

        debug!(
            event = %event,
            phase = %phase,
            hook_count = hooks.len(),
            "Dispatching hooks"
        );

        let mut accumulator = input;
        for entry in hooks {
            let result = entry
                .hook
                .call(self.context, accumulator)
                .await
                .and_then(|output| {
                    check(&output).map_err(HookError::from)?;
                    Ok(output)
                });

            accumulator = match result {
                Ok(output) => output,
                Err(source) => {
                    error!(
                        event = %event,
                        phase = %phase,
                        plugin = %entry.plugin,
                        error = %source,
                        "Hook failed, aborting stage"
                    );
                    return Err(PluginError::HookExecution {
                        event: event.to_string(),
                        phase,
                        plugin: entry.plugin.to_string(),
                        source,
                    });
                }
            };

            debug!(event = %event, phase = %phase, plugin = %entry.plugin, "Hook completed");
        }

        Ok(accumulator)
    }

    /// Returns the registry this dispatcher reads from.
    pub fn registry(&self) -> &'a HookRegistry {
        self.registry
    }

    /// Returns the execution context handed to hooks.
    pub fn context(&self) -> &'a GenerationContext {
        self.context
    }
}

fn encode<T: Serialize>(event: &str, value: &T) -> Result<Value, PluginError> {
    serde_json::to_value(value).map_err(|e| PluginError::Stage {
        event: event.to_string(),
        message: format!("payload could not be encoded: {e}"),
        source: Some(Box::new(e)),
    })
}

fn decode<T: DeserializeOwned>(event: &str, value: Value) -> Result<T, PluginError> {
    serde_json::from_value(value).map_err(|e| PluginError::Stage {
        event: event.to_string(),
        message: format!("payload could not be decoded: {e}"),
        source: Some(Box::new(e)),
    })
}
