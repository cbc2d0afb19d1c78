//! Plugin instantiation and registration validation.
//!
//! Turns a loaded module into a validated [`EventRegistration`], or into an
//! [`Validation::Invalid`] result naming why the plugin contributes nothing.
//! Plugins without a `register` capability are [`Validation::SetupOnly`].
//! Malformed input never panics or propagates; it is reported as data.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{PluginError, panic_message};
use crate::exports::{HookValue, PluginModule, RegistrationValue};
use crate::hooks::definitions::{Hook, HookPhase};

/// The callable hooks one plugin registered for one event.
#[derive(Debug, Clone, Default)]
pub struct EventHookPair {
    /// Callable `before` member, if any.
    pub before: Option<Hook>,
    /// Callable `after` member, if any.
    pub after: Option<Hook>,
}

/// Validated registrations of one plugin.
#[derive(Debug)]
pub struct EventRegistration {
    /// Display name of the plugin.
    pub plugin: Arc<str>,
    /// Event name → callable hooks, in the plugin's declaration order.
    pub events: Vec<(String, EventHookPair)>,
    /// Members dropped because they were not callable.
    pub dropped: Vec<PluginError>,
}

/// Outcome of instantiating one plugin.
#[derive(Debug)]
pub enum Validation {
    /// The plugin produced a well-formed registration.
    Valid(EventRegistration),
    /// The plugin contributes nothing.
    Invalid(PluginError),
    /// The plugin has no `register` capability. It contributes nothing but
    /// is not malformed.
    SetupOnly(PluginError),
}

impl Validation {
    /// Returns the registration when valid.
    pub fn registration(self) -> Option<EventRegistration> {
        match self {
            Self::Valid(registration) => Some(registration),
            Self::Invalid(_) | Self::SetupOnly(_) => None,
        }
    }
}

/// Constructs the module's default export and validates its registrations.
pub fn instantiate(plugin: &str, module: &dyn PluginModule) -> Validation {
    let shape_error = |reason: String| {
        warn!(plugin = %plugin, reason = %reason, "Plugin skipped");
        Validation::Invalid(PluginError::Shape {
            plugin: plugin.to_string(),
            reason,
        })
    };

    let entry = match std::panic::catch_unwind(AssertUnwindSafe(|| module.default_export())) {
        Ok(Some(entry)) => entry,
        Ok(None) => return shape_error("module has no default export".to_string()),
        Err(payload) => {
            return shape_error(format!(
                "constructor panicked: {}",
                panic_message(payload.as_ref())
            ));
        }
    };

    let declared = match std::panic::catch_unwind(AssertUnwindSafe(|| entry.register())) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(plugin = %plugin, "Plugin has no register capability");
            return Validation::SetupOnly(PluginError::Shape {
                plugin: plugin.to_string(),
                reason: "plugin has no register capability".to_string(),
            });
        }
        Err(payload) => {
            return shape_error(format!(
                "register panicked: {}",
                panic_message(payload.as_ref())
            ));
        }
    };

    validate_registration(plugin, declared)
}

/// Validates a raw registration value.
///
/// Only a keyed mapping is accepted. Within it, only callable members are
/// kept; each non-callable member is dropped and recorded. When the same
/// event is declared twice, the later declaration wins.
pub fn validate_registration(plugin: &str, value: RegistrationValue) -> Validation {
    let entries = match value {
        RegistrationValue::Map(entries) => entries,
        other => {
            let reason = format!("register returned a {} instead of a map", other.kind());
            warn!(plugin = %plugin, reason = %reason, "Plugin skipped");
            return Validation::Invalid(PluginError::Shape {
                plugin: plugin.to_string(),
                reason,
            });
        }
    };

    let mut events: Vec<(String, EventHookPair)> = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();

    for (event, members) in entries {
        let pair = EventHookPair {
            before: callable(plugin, &event, HookPhase::Before, members.before, &mut dropped),
            after: callable(plugin, &event, HookPhase::After, members.after, &mut dropped),
        };

        match events.iter_mut().find(|(name, _)| *name == event) {
            Some((_, existing)) => *existing = pair,
            None => events.push((event, pair)),
        }
    }

    Validation::Valid(EventRegistration {
        plugin: plugin.into(),
        events,
        dropped,
    })
}

fn callable(
    plugin: &str,
    event: &str,
    phase: HookPhase,
    value: HookValue,
    dropped: &mut Vec<PluginError>,
) -> Option<Hook> {
    match value {
        HookValue::Callable(hook) => Some(hook),
        HookValue::Missing => None,
        HookValue::Invalid(_) => {
            debug!(plugin = %plugin, event = %event, phase = %phase, "Dropping non-callable hook");
            dropped.push(PluginError::HookShape {
                plugin: plugin.to_string(),
                event: event.to_string(),
                phase,
            });
            None
        }
    }
}
