//! Plugin pipeline errors.
//!
//! Construction-time errors (`Load`, `Shape`, `HookShape`) are recovered
//! locally: the offending plugin, or just the offending hook, contributes
//! nothing and the error is kept as a diagnostic. Invocation-time errors
//! (`HookExecution`, `Stage`) abort the current stage.

use std::any::Any;

use thiserror::Error;

use dsg_core::error::{AppError, ErrorKind};

use crate::hooks::definitions::HookPhase;

/// Error returned by a hook function.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    /// Human-readable failure description.
    message: String,
    /// Optional underlying cause.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Creates a hook error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a hook error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a hook error from a caught panic payload.
    pub fn panicked(payload: Box<dyn Any + Send>) -> Self {
        Self::new(format!("hook panicked: {}", panic_message(payload.as_ref())))
    }

    /// Returns the failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(format!("payload does not match the event shape: {err}"), err)
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result type returned by hook functions.
pub type HookResult<T> = Result<T, HookError>;

/// Failure reported by a [`ModuleResolver`](crate::resolver::ModuleResolver).
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Nothing is installed under the requested identifier or path.
    #[error("module '{0}' not found")]
    NotFound(String),
    /// The module exists but could not be loaded.
    #[error("module '{target}' failed to load: {reason}")]
    Failed {
        /// Requested identifier or path.
        target: String,
        /// Failure description.
        reason: String,
    },
}

/// Errors produced while building the hook registry or invoking hooks.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin module could not be resolved.
    #[error("plugin '{plugin}' could not be loaded: {reason}")]
    Load {
        /// Plugin display name.
        plugin: String,
        /// Failure description.
        reason: String,
    },

    /// The plugin has no constructible entry point, no `register`
    /// capability, or a registration that is not a keyed mapping.
    #[error("plugin '{plugin}' is malformed: {reason}")]
    Shape {
        /// Plugin display name.
        plugin: String,
        /// Failure description.
        reason: String,
    },

    /// A registered hook member is not callable and was dropped.
    #[error("plugin '{plugin}' registered a non-callable {phase} hook for event '{event}'")]
    HookShape {
        /// Plugin display name.
        plugin: String,
        /// Event name the member was registered under.
        event: String,
        /// Phase of the dropped member.
        phase: HookPhase,
    },

    /// A hook failed, panicked, or returned a payload of the wrong shape.
    #[error("{phase} hook of plugin '{plugin}' failed during event '{event}': {source}")]
    HookExecution {
        /// Event being executed.
        event: String,
        /// Phase the hook belongs to.
        phase: HookPhase,
        /// Plugin that owns the hook.
        plugin: String,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },

    /// The stage executor's own generation logic failed.
    #[error("stage '{event}' failed: {message}")]
    Stage {
        /// Event being executed.
        event: String,
        /// Failure description.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PluginError {
    /// Returns the plugin this error is attributed to, if any.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Load { plugin, .. }
            | Self::Shape { plugin, .. }
            | Self::HookShape { plugin, .. }
            | Self::HookExecution { plugin, .. } => Some(plugin),
            Self::Stage { .. } => None,
        }
    }

    /// Returns the event this error is attributed to, if any.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::HookShape { event, .. }
            | Self::HookExecution { event, .. }
            | Self::Stage { event, .. } => Some(event),
            Self::Load { .. } | Self::Shape { .. } => None,
        }
    }

    /// Returns whether the error is fatal to the stage being executed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HookExecution { .. } | Self::Stage { .. })
    }
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        let kind = match &err {
            PluginError::Stage { .. } => ErrorKind::Generation,
            _ => ErrorKind::Plugin,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
