//! Convenience result type alias for CoastlineVibe.

use crate::error::AppError;

/// A specialized `Result` type for CoastlineVibe operations.
pub type AppResult<T> = Result<T, AppError>;
