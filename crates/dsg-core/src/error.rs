//! Error type shared by the generator crates.
//!
//! Library crates keep their own error enums and convert into [`AppError`]
//! at the point where they cross into the binary.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Configuration could not be read or did not deserialize.
    Configuration,
    /// A plugin failed to load, register, or run.
    Plugin,
    /// A generation stage failed outside of any plugin.
    Generation,
    /// JSON encoding or decoding failed.
    Serialization,
    /// File system access failed.
    Io,
}

impl ErrorKind {
    /// Stable code printed in front of the message.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION",
            Self::Plugin => "PLUGIN",
            Self::Generation => "GENERATION",
            Self::Serialization => "SERIALIZATION",
            Self::Io => "IO",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type BoxedCause = Box<dyn StdError + Send + Sync>;

/// Error returned from the CLI boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<BoxedCause>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap `cause` so it stays reachable through [`StdError::source`].
    pub fn with_source<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut err = Self::new(kind, message);
        err.source = Some(Box::new(cause));
        err
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Plugin, message)
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generation, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        let message = format!("invalid JSON: {err}");
        Self::with_source(ErrorKind::Serialization, message, err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let message = err.to_string();
        Self::with_source(ErrorKind::Io, message, err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        let message = format!("unreadable configuration: {err}");
        Self::with_source(ErrorKind::Configuration, message, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_prefixed_with_kind_code() {
        let err = AppError::plugin("hook failed");
        assert_eq!(err.to_string(), "PLUGIN: hook failed");
    }

    #[test]
    fn test_io_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AppError::from(io);
        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.message, "missing");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::Generation).unwrap();
        assert_eq!(json, "\"GENERATION\"");
    }
}
