//! # AppError
//!
//! Centralized error handling for the video platform.
//! Every variant carries the human-readable message shown to clients and
//! maps onto exactly one HTTP status.

use thiserror::Error;

/// The primary error type for all vt-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A supplied identifier is not a well-formed id.
    #[error("{0}")]
    InvalidIdentifier(String),

    /// A required field is missing or blank after trimming.
    #[error("{0}")]
    ValidationFailed(String),

    /// No authenticated actor on the request.
    #[error("{0}")]
    Unauthorized(String),

    /// The target does not exist, or the actor does not own it.
    /// The two cases are intentionally indistinguishable.
    #[error("{0}")]
    NotFound(String),

    /// The database or the media host failed.
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidIdentifier(_) | AppError::ValidationFailed(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::Upstream(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidIdentifier(m)
            | AppError::ValidationFailed(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::Upstream(m) => m,
        }
    }
}

/// Converts an adapter failure into `AppError::Upstream` with a fixed public
/// message, logging the underlying cause.
pub fn upstream(message: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
    move |err| {
        tracing::error!(error = %err, "{message}");
        AppError::Upstream(message.to_string())
    }
}

/// A specialized Result type for platform logic.
pub type Result<T> = std::result::Result<T, AppError>;
