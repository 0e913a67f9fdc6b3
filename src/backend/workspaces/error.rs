/**
 * Workspace Error Types
 *
 * Failures of the workspace, channel, member and message operations. The variants
 * are checked in a fixed order by `join`: `Unauthorized`, `NotFound`,
 * `InvalidJoinCode`, `AlreadyMember`.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No caller identity, or the caller lacks the required membership
    #[error("Unauthorized")]
    Unauthorized,

    /// The named record does not exist (or is being removed)
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid join code")]
    InvalidJoinCode,

    #[error("User is already a member of this workspace")]
    AlreadyMember,

    /// Rejected input, such as an empty name
    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkspaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidJoinCode => StatusCode::BAD_REQUEST,
            Self::AlreadyMember => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(WorkspaceError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(WorkspaceError::NotFound("Workspace").to_string(), "Workspace not found");
        assert_eq!(WorkspaceError::InvalidJoinCode.to_string(), "Invalid join code");
        assert_eq!(
            WorkspaceError::AlreadyMember.to_string(),
            "User is already a member of this workspace"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WorkspaceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WorkspaceError::NotFound("Channel").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(WorkspaceError::InvalidJoinCode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WorkspaceError::AlreadyMember.status_code(), StatusCode::CONFLICT);

        let validation: WorkspaceError = SharedError::validation("name", "Name cannot be empty").into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let store: WorkspaceError = StoreError::Unavailable("down".into()).into();
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
