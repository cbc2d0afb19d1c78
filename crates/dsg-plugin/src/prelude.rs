//! Prelude for plugin authors.

pub use crate::api::context::GenerationContext;
pub use crate::error::{HookError, HookResult};
pub use crate::exports::{DefaultExport, PluginEntry, PluginModule, RegistrationBuilder, RegistrationValue};
pub use crate::hooks::catalog::*;
pub use crate::hooks::definitions::{EventName, Hook, HookPhase};

pub use dsg_core::types::{GeneratedModule, GeneratedModules};
