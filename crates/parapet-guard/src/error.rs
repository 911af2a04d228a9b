//! Access outcomes surfaced to the transport layer.

use std::fmt::Display;

use parapet_types::SubjectType;
use thiserror::Error;

/// The three failure kinds of the authorization core.
///
/// None of them is retryable; each aborts the current request without
/// partial data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No valid principal could be established.
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A principal exists but a policy check rejected it.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The subject instance does not exist.
    #[error("{subject_type} {id} not found")]
    NotFound { subject_type: SubjectType, id: String },
}

impl AccessError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(subject_type: SubjectType, id: impl Display) -> Self {
        Self::NotFound {
            subject_type,
            id: id.to_string(),
        }
    }

    /// HTTP status the transport layer reports for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, AccessError>;
