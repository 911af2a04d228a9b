//! Error types for the request pipeline.

use parapet_guard::AccessError;
use parapet_types::SubjectType;
use parapet_visibility::VisibilityError;
use thiserror::Error;

/// Failures reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A unique field already holds this value.
    #[error("{subject_type} with {field} '{value}' already exists")]
    Conflict {
        subject_type: SubjectType,
        field: &'static str,
        value: String,
    },

    /// The record vanished between load and write.
    #[error("{subject_type} {id} no longer exists")]
    Missing { subject_type: SubjectType, id: String },

    /// Storage failure.
    #[error("internal repository error: {0}")]
    Internal(String),
}

impl RepositoryError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Failure of an audit collaborator. Never aborts a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("audit sink unavailable: {0}")]
pub struct AuditError(pub String);

/// Error returned by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Visibility(#[from] VisibilityError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// HTTP status the transport layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Access(err) => err.status_code(),
            Self::Repository(RepositoryError::Conflict { .. }) => 409,
            Self::Repository(RepositoryError::Missing { .. }) => 404,
            Self::Visibility(_) | Self::Repository(RepositoryError::Internal(_)) => 500,
        }
    }

    /// Returns the access outcome, if this is one.
    pub fn as_access(&self) -> Option<&AccessError> {
        match self {
            Self::Access(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let forbidden: ServiceError = AccessError::forbidden("no").into();
        assert_eq!(forbidden.status_code(), 403);
        assert!(forbidden.as_access().is_some());

        let conflict: ServiceError = RepositoryError::Conflict {
            subject_type: SubjectType::USER,
            field: "email",
            value: "a@test.com".to_string(),
        }
        .into();
        assert_eq!(conflict.status_code(), 409);
        assert_eq!(
            conflict.to_string(),
            "User with email 'a@test.com' already exists"
        );

        let internal: ServiceError = RepositoryError::internal("lock poisoned").into();
        assert_eq!(internal.status_code(), 500);
        assert!(internal.as_access().is_none());
    }
}
