/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised directly by handlers with an explicit status code, such as the
 * router's JSON 404.
 *
 * ## Workspace Errors
 *
 * Failures of the workspace, channel, member and message operations. Their status
 * codes come from `WorkspaceError::status_code`.
 *
 * ## Shared Errors
 *
 * Validation and serialization failures detected before storage access.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::workspaces::WorkspaceError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use xfteam::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::NOT_FOUND, "Not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Workspace, channel, member or message operation failure
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Workspace` - `WorkspaceError::status_code`
    /// - `SharedError` - 400 for validation, 500 for serialization
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Workspace(err) => err.status_code(),
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Get the error message sent to the client.
    ///
    /// Storage failures are reported generically; their details only go to
    /// the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Workspace(WorkspaceError::Store(_)) => "Internal server error".to_string(),
            Self::Workspace(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
        }
    }
}
