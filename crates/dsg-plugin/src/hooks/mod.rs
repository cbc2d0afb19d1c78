//! Hook system: event catalog, registry, and dispatcher.

pub mod catalog;
pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use catalog::{EventContext, EventShape};
pub use definitions::{EventName, Hook, HookEntry, HookPhase};
pub use dispatcher::HookDispatcher;
pub use registry::{EventHooks, HookRegistry};
