//! Plugin API: the execution context exposed to hook functions.

pub mod context;

pub use context::{GenerationContext, GenerationContextBuilder};
