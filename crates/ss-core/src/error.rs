//! # AppError
//!
//! Centralized error handling for the StyleSync facade.
//! Nothing here is fatal: every variant ends as a visible message or a
//! best-effort fallback.

use thiserror::Error;

/// The primary error type for all facade operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network or backend failure. Reads, creates and image uploads recover
    /// from it through the fallback chain; other verbs surface it.
    #[error("remote backend unavailable: {0}")]
    RemoteUnavailable(String),

    /// Resource not found (e.g., Board, Profile)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Input rejected before any network call (e.g., missing item name)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The backend rejected an update or delete. Never retried.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// Random outfit requested for an empty (filtered) wardrobe
    #[error("no items found to create outfit")]
    NoItems,

    /// Authentication failure (bad credentials, unknown session)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Decoding or local persistence failure
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound(entity.into(), id.into())
    }

    /// Wraps a port failure for a verb that has no fallback.
    pub fn operation(context: &str, err: anyhow::Error) -> Self {
        Self::OperationFailed(format!("{context}: {err:#}"))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("malformed record: {err}"))
    }
}

/// A specialized Result type for StyleSync logic.
pub type Result<T> = std::result::Result<T, AppError>;
