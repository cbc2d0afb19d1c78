//! # dsg-plugin
//!
//! Plugin pipeline for the data service generator. Provides:
//!
//! - Module resolution behind the [`ModuleResolver`] capability
//! - An order-preserving loader that isolates per-plugin failures
//! - Plugin instantiation with tolerant registration validation
//! - The immutable [`HookRegistry`] keyed by event name
//! - The typed event context catalog
//! - The before/base/after invocation pipeline driven by stage executors
//! - Optional dynamic loading via `libloading` (feature `dynamic`)

pub mod api;
pub mod error;
pub mod exports;
pub mod hooks;
pub mod instantiator;
pub mod loader;
pub mod manager;
pub mod prelude;
pub mod resolver;

pub use api::context::GenerationContext;
pub use error::{HookError, HookResult, PluginError, ResolveError};
pub use exports::{DefaultExport, PluginEntry, PluginModule, RegistrationBuilder};
pub use hooks::catalog::{EventContext, EventShape};
pub use hooks::definitions::{EventName, Hook, HookEntry, HookPhase};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::{EventHooks, HookRegistry};
pub use loader::PluginLoader;
pub use manager::{LoadReport, PluginManager, build_hook_registry};
pub use resolver::{ModuleRequest, ModuleResolver, ResolverChain, StaticResolver};
