//! In-memory collaborators for tests and demos.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use parapet_guard::AccessError;
use parapet_types::{Document, DocumentId, Principal, SubjectType, User, UserId};
use tracing::info;

use crate::collaborators::{
    AuditEvent, AuditSink, Authenticator, DocumentPatch, DocumentRepository, NewDocument, NewUser,
    UserRepository,
};
use crate::error::{AuditError, RepositoryError};

#[derive(Debug, Default)]
struct StoreInner {
    users: BTreeMap<UserId, User>,
    documents: BTreeMap<DocumentId, Document>,
    last_user_id: u64,
    last_document_id: u64,
}

/// A user and document store held in memory.
///
/// Cloning shares the underlying data. Ids are assigned sequentially from
/// 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed user, keeping its id.
    pub fn seed_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut inner = self.write()?;
        inner.last_user_id = inner.last_user_id.max(user.id.as_u64());
        inner.users.insert(user.id, user);
        Ok(())
    }

    /// Inserts a fully formed document, keeping its id. Any joined owner is
    /// dropped; it is re-joined on load.
    pub fn seed_document(&self, mut document: Document) -> Result<(), RepositoryError> {
        let mut inner = self.write()?;
        inner.last_document_id = inner.last_document_id.max(document.id.as_u64());
        document.owner = None;
        inner.documents.insert(document.id, document);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreInner>, RepositoryError> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::internal("lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>, RepositoryError> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::internal("lock poisoned"))
    }
}

impl UserRepository for MemoryStore {
    fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.write()?;

        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(RepositoryError::Conflict {
                subject_type: SubjectType::USER,
                field: "email",
                value: new_user.email,
            });
        }

        inner.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.last_user_id),
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            salary: new_user.salary,
            phone_number: new_user.phone_number,
            national_id: new_user.national_id,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.users.remove(&id).is_some())
    }
}

impl DocumentRepository for MemoryStore {
    fn create(&self, owner_id: UserId, new_doc: NewDocument) -> Result<Document, RepositoryError> {
        let mut inner = self.write()?;
        inner.last_document_id += 1;
        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(inner.last_document_id),
            title: new_doc.title,
            content: new_doc.content,
            owner_id,
            owner: None,
            created_at: now,
            updated_at: now,
        };
        inner.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let inner = self.read()?;
        Ok(inner.documents.get(&id).map(|doc| Document {
            owner: inner.users.get(&doc.owner_id).cloned(),
            ..doc.clone()
        }))
    }

    fn update(&self, id: DocumentId, patch: DocumentPatch) -> Result<Document, RepositoryError> {
        let mut inner = self.write()?;
        let document = inner
            .documents
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::Missing {
                subject_type: SubjectType::DOCUMENT,
                id: id.to_string(),
            })?;

        if let Some(title) = patch.title {
            document.title = title;
        }
        if let Some(content) = patch.content {
            document.content = content;
        }
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    fn delete(&self, id: DocumentId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.documents.remove(&id).is_some())
    }
}

/// Authenticates fixed bearer tokens.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: RwLock<HashMap<String, Principal>>,
}

impl StaticTokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `token` authenticate as `principal`, replacing any previous
    /// holder.
    pub fn issue(&self, token: impl Into<String>, principal: Principal) -> Result<(), AccessError> {
        self.tokens
            .write()
            .map_err(|_| AccessError::unauthorized("token table unavailable"))?
            .insert(token.into(), principal);
        Ok(())
    }

    pub fn revoke(&self, token: &str) -> Result<bool, AccessError> {
        Ok(self
            .tokens
            .write()
            .map_err(|_| AccessError::unauthorized("token table unavailable"))?
            .remove(token)
            .is_some())
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Principal, AccessError> {
        if token.is_empty() {
            return Err(AccessError::unauthorized("Missing bearer token"));
        }

        self.tokens
            .read()
            .map_err(|_| AccessError::unauthorized("token table unavailable"))?
            .get(token)
            .cloned()
            .ok_or_else(|| AccessError::unauthorized("Invalid bearer token"))
    }
}

/// Collects audit events for later inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|_| AuditError("lock poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

/// Writes audit events to the `parapet::audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        match &event {
            AuditEvent::UserRegistered {
                user_id,
                email,
                role,
                has_pii,
            } => info!(
                target: "parapet::audit",
                user_id = %user_id,
                email = %email,
                role = %role,
                has_pii = *has_pii,
                "User registered"
            ),
        }
        Ok(())
    }
}

/// The in-memory collaborators wired together.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub store: MemoryStore,
    pub audit: Arc<MemoryAuditSink>,
    pub tokens: Arc<StaticTokenAuthenticator>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}
