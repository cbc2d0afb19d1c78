//! Hook registry: the merged, ordered mapping from event name to hooks.
//!
//! The registry is built once per generation run from the registrations of
//! all successfully instantiated plugins and is read-only afterwards. Hook
//! order within each list is the installation order of the owning plugins.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::definitions::{EventName, HookEntry, HookPhase};
use crate::instantiator::EventRegistration;

/// The `before` and `after` hook lists of one event.
#[derive(Debug, Clone, Default)]
pub struct EventHooks {
    /// Hooks run before the stage, in installation order.
    pub before: Vec<HookEntry>,
    /// Hooks run after the stage, in installation order.
    pub after: Vec<HookEntry>,
}

impl EventHooks {
    /// Returns the hooks of one phase.
    pub fn phase(&self, phase: HookPhase) -> &[HookEntry] {
        match phase {
            HookPhase::Before => &self.before,
            HookPhase::After => &self.after,
        }
    }

    /// Returns whether neither phase has hooks.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

static NO_HOOKS: EventHooks = EventHooks {
    before: Vec::new(),
    after: Vec::new(),
};

/// Immutable registry of hooks keyed by event name.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    /// Event name → hook lists.
    events: HashMap<String, EventHooks>,
    /// Event names in first-registration order.
    order: Vec<String>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds ordered registrations into a registry.
    ///
    /// Registrations must already be in installation order; hooks are
    /// appended as encountered and never reordered or deduplicated.
    pub fn build<I>(registrations: I) -> Self
    where
        I: IntoIterator<Item = EventRegistration>,
    {
        let mut registry = Self::new();
        for registration in registrations {
            registry.merge(registration);
        }

        info!(
            events = registry.order.len(),
            hooks = registry.hook_count(),
            "Hook registry built"
        );

        registry
    }

    fn merge(&mut self, registration: EventRegistration) {
        let plugin = registration.plugin;

        for (event, pair) in registration.events {
            if pair.before.is_none() && pair.after.is_none() {
                continue;
            }

            if !self.events.contains_key(&event) {
                if event.parse::<EventName>().is_err() {
                    debug!(plugin = %plugin, event = %event, "Hook registered for an event outside the catalog");
                }
                self.order.push(event.clone());
            }
            let hooks = self.events.entry(event.clone()).or_default();

            if let Some(hook) = pair.before {
                hooks.before.push(HookEntry::new(plugin.clone(), hook));
            }
            if let Some(hook) = pair.after {
                hooks.after.push(HookEntry::new(plugin.clone(), hook));
            }

            debug!(plugin = %plugin, event = %event, "Hooks registered");
        }
    }

    /// Returns the hooks registered for `event`, or empty lists.
    pub fn get(&self, event: impl AsRef<str>) -> &EventHooks {
        self.events.get(event.as_ref()).unwrap_or(&NO_HOOKS)
    }

    /// Returns whether any hook is registered for `event`.
    pub fn contains(&self, event: impl AsRef<str>) -> bool {
        self.events.contains_key(event.as_ref())
    }

    /// Returns registered event names in first-registration order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the total number of hooks across all events and phases.
    pub fn hook_count(&self) -> usize {
        self.events
            .values()
            .map(|hooks| hooks.before.len() + hooks.after.len())
            .sum()
    }

    /// Returns whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the owning plugins of every hook, per event and phase.
    pub fn summary(&self) -> RegistrySummary {
        let owners = |entries: &[HookEntry]| {
            entries
                .iter()
                .map(|entry| entry.plugin.to_string())
                .collect::<Vec<_>>()
        };

        RegistrySummary {
            events: self
                .order
                .iter()
                .map(|event| {
                    let hooks = self.get(event);
                    EventSummary {
                        event: event.clone(),
                        before: owners(&hooks.before),
                        after: owners(&hooks.after),
                    }
                })
                .collect(),
        }
    }
}

/// Plugin ownership of the hooks of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Event name.
    pub event: String,
    /// Owners of the `before` hooks, in execution order.
    pub before: Vec<String>,
    /// Owners of the `after` hooks, in execution order.
    pub after: Vec<String>,
}

/// Ownership view of a whole registry, comparable across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    /// Per-event ownership, in first-registration order.
    pub events: Vec<EventSummary>,
}
