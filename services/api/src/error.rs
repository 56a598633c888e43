//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the mapping
//! of core errors onto HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use study_assistant_core::{PortError, ValidationError};
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to run the embedded database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error half of every handler's return type.
pub type HandlerError = (StatusCode, String);

/// Rejected input is reported back verbatim.
pub fn validation_rejection(e: ValidationError) -> HandlerError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Maps a port failure to a single user-facing message. `action` names what the
/// user was trying to do, e.g. "generate the quiz".
pub fn port_rejection(e: PortError, action: &str) -> HandlerError {
    error!("Failed to {}: {}", action, e);
    match e {
        PortError::Provider(_) | PortError::MalformedResponse(_) => (
            StatusCode::BAD_GATEWAY,
            format!("Failed to {}. Please try again.", action),
        ),
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, what),
        PortError::Persistence(_) | PortError::Corrupt(_) | PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to {}.", action),
        ),
    }
}
