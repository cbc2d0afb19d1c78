//! Plugin module exports and the raw registration shapes plugins return.
//!
//! A resolved module may or may not export a constructible default entry;
//! an entry may or may not declare registrations; a declared registration
//! may be any shape. The instantiator turns these loosely typed exports
//! into validated [`EventRegistration`](crate::instantiator::EventRegistration)s.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::hooks::definitions::{EventName, Hook};

/// A resolved plugin module.
pub trait PluginModule: Send + Sync {
    /// Constructs the module's default export.
    ///
    /// Returns `None` when the module has no default export.
    fn default_export(&self) -> Option<Box<dyn PluginEntry>>;
}

/// A constructed plugin instance.
pub trait PluginEntry: Send {
    /// Declares the plugin's event registrations.
    ///
    /// Returns `None` when the plugin has no `register` capability, e.g.
    /// plugins that only perform setup when constructed.
    fn register(&self) -> Option<RegistrationValue> {
        None
    }
}

/// Raw value returned from a plugin's `register` capability.
pub enum RegistrationValue {
    /// A keyed mapping from event name to hook members. The only valid shape.
    Map(Vec<(String, EventHooksValue)>),
    /// A sequence of values.
    List(Vec<RegistrationValue>),
    /// A callable.
    Function(Hook),
    /// Any other plain data.
    Data(Value),
}

impl RegistrationValue {
    /// Returns a short name of this value's shape for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::List(_) => "list",
            Self::Function(_) => "function",
            Self::Data(Value::Null) => "null",
            Self::Data(Value::Bool(_)) => "boolean",
            Self::Data(Value::Number(_)) => "number",
            Self::Data(Value::String(_)) => "string",
            Self::Data(Value::Array(_)) => "array",
            Self::Data(Value::Object(_)) => "data object",
        }
    }
}

impl fmt::Debug for RegistrationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(entries) => f
                .debug_list()
                .entries(entries.iter().map(|(event, _)| event))
                .finish(),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

/// The members a plugin declared for one event.
#[derive(Debug, Default)]
pub struct EventHooksValue {
    /// Declared `before` member.
    pub before: HookValue,
    /// Declared `after` member.
    pub after: HookValue,
}

/// One declared hook member.
#[derive(Debug, Default)]
pub enum HookValue {
    /// Nothing was declared.
    #[default]
    Missing,
    /// A callable hook.
    Callable(Hook),
    /// A non-callable value; dropped during instantiation.
    Invalid(Value),
}

impl From<Hook> for HookValue {
    fn from(hook: Hook) -> Self {
        Self::Callable(hook)
    }
}

/// Builds a well-formed registration map for compiled-in plugins.
#[derive(Debug, Default)]
pub struct RegistrationBuilder {
    /// Accumulated entries, in declaration order.
    entries: Vec<(String, EventHooksValue)>,
}

impl RegistrationBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `before` hook for an event.
    pub fn before(self, event: EventName, hook: Hook) -> Self {
        self.on_before(event.as_str(), hook)
    }

    /// Registers an `after` hook for an event.
    pub fn after(self, event: EventName, hook: Hook) -> Self {
        self.on_after(event.as_str(), hook)
    }

    /// Registers a `before` hook under a raw event name.
    pub fn on_before(mut self, event: &str, hook: Hook) -> Self {
        self.slot(event).before = HookValue::Callable(hook);
        self
    }

    /// Registers an `after` hook under a raw event name.
    pub fn on_after(mut self, event: &str, hook: Hook) -> Self {
        self.slot(event).after = HookValue::Callable(hook);
        self
    }

    fn slot(&mut self, event: &str) -> &mut EventHooksValue {
        let index = match self.entries.iter().position(|(name, _)| name == event) {
            Some(index) => index,
            None => {
                self.entries
                    .push((event.to_string(), EventHooksValue::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Finishes the registration.
    pub fn build(self) -> RegistrationValue {
        RegistrationValue::Map(self.entries)
    }
}

/// Module whose default export is a `Default`-constructible entry type.
pub struct DefaultExport<P>(PhantomData<fn() -> P>);

impl<P> DefaultExport<P>
where
    P: PluginEntry + Default + 'static,
{
    /// Creates the module.
    pub fn new() -> Self {
        Self(PhantomData)
    }

    /// Creates the module behind a shared trait object.
    pub fn module() -> Arc<dyn PluginModule> {
        Arc::new(Self::new())
    }
}

impl<P> Default for DefaultExport<P>
where
    P: PluginEntry + Default + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for DefaultExport<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DefaultExport")
            .field(&std::any::type_name::<P>())
            .finish()
    }
}

impl<P> PluginModule for DefaultExport<P>
where
    P: PluginEntry + Default + 'static,
{
    fn default_export(&self) -> Option<Box<dyn PluginEntry>> {
        Some(Box::new(P::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Empty;

    impl PluginEntry for Empty {}

    #[test]
    fn test_builder_merges_phases_per_event() {
        let value = RegistrationBuilder::new()
            .before(EventName::CreatePrismaSchema, Hook::sync(|_, v| Ok(v)))
            .after(EventName::CreateServerDotEnv, Hook::sync(|_, v| Ok(v)))
            .after(EventName::CreatePrismaSchema, Hook::sync(|_, v| Ok(v)))
            .build();

        let RegistrationValue::Map(entries) = value else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "createPrismaSchema");
        assert!(matches!(entries[0].1.before, HookValue::Callable(_)));
        assert!(matches!(entries[0].1.after, HookValue::Callable(_)));
        assert!(matches!(entries[1].1.before, HookValue::Missing));
    }

    #[test]
    fn test_default_export_constructs_entry() {
        let module = DefaultExport::<Empty>::module();
        let entry = module.default_export().expect("entry");
        assert!(entry.register().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RegistrationValue::Data(Value::Null).kind(), "null");
        assert_eq!(RegistrationValue::List(Vec::new()).kind(), "list");
        assert_eq!(
            RegistrationValue::Function(Hook::sync(|_, v| Ok(v))).kind(),
            "function"
        );
    }
}
