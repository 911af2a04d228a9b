//! Interfaces to the systems around the access layer.
//!
//! The access layer never issues queries or talks to the network itself;
//! it only consumes what these collaborators return.

use parapet_guard::AccessError;
use parapet_types::{Document, DocumentId, Principal, Role, User, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, RepositoryError};

/// Resolves a bearer token to the principal of a request.
pub trait Authenticator: Send + Sync {
    /// Fails with [`AccessError::Unauthorized`] for unknown tokens.
    fn authenticate(&self, token: &str) -> Result<Principal, AccessError>;
}

/// Fields supplied when registering a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub salary: Option<i64>,
    pub phone_number: Option<String>,
    pub national_id: Option<String>,
}

/// Fields supplied when creating a document. The owner is always the
/// creating principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
}

/// A partial document update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub trait UserRepository: Send + Sync {
    /// Stores a new user. Emails are unique.
    fn create(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Returns whether a user was removed.
    fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;
}

pub trait DocumentRepository: Send + Sync {
    fn create(&self, owner_id: UserId, new_doc: NewDocument) -> Result<Document, RepositoryError>;

    /// Loads a document joined with its owner's profile.
    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;

    fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Document, RepositoryError>;

    /// Returns whether a document was removed.
    fn delete(&self, id: DocumentId) -> Result<bool, RepositoryError>;
}

/// Security-relevant events reported to the audit collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    UserRegistered {
        user_id: UserId,
        email: String,
        role: Role,
        has_pii: bool,
    },
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}
