//! Result alias used at the application boundary.

use crate::error::AppError;

/// Result of configuration loading and CLI commands.
pub type AppResult<T> = Result<T, AppError>;
