//! # Parapet
//!
//! Attribute-based access control for a users and documents API.
//!
//! Every request passes through three layers driven by one ability model:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                             Parapet                            │
//! │  ┌──────────┐   ┌─────────────┐   ┌──────────┐   ┌───────────┐ │
//! │  │ Ability  │ → │ Static gate │ → │ Instance │ → │  Field    │ │
//! │  │ (build)  │   │ (type-level)│   │  check   │   │  filter   │ │
//! │  └──────────┘   └─────────────┘   └──────────┘   └───────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authentication, persistence and auditing are collaborators behind the
//! traits in [`collaborators`]; [`memory`] has in-memory versions.
//!
//! # Quick Start
//!
//! ```
//! use parapet::{DocumentPatch, NewDocument, Parapet, ParapetConfig, Principal, Role};
//! use parapet::memory::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//! backend.tokens.issue("alice", Principal::new(1, Role::User, "alice@test.com"))?;
//! backend.tokens.issue("bob", Principal::new(2, Role::User, "bob@test.com"))?;
//!
//! let app = Parapet::from_memory(&ParapetConfig::default(), &backend);
//!
//! let alice = app.context(Some("alice"))?;
//! let doc = app.documents().create(&alice, NewDocument {
//!     title: "Plan".into(),
//!     content: "...".into(),
//! })?;
//! let id = parapet::DocumentId::new(doc["id"].as_u64().unwrap_or_default());
//!
//! let bob = app.context(Some("bob"))?;
//! let err = app.documents().update(&bob, id, DocumentPatch::default()).unwrap_err();
//! assert_eq!(err.status_code(), 403);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

pub mod collaborators;
pub mod context;
mod error;
pub mod memory;
pub mod services;
pub mod telemetry;

pub use collaborators::{
    AuditEvent, AuditSink, Authenticator, DocumentPatch, DocumentRepository, NewDocument, NewUser,
    UserRepository,
};
pub use context::{Enforcement, RequestContext};
pub use error::{AuditError, RepositoryError, Result, ServiceError};
pub use services::{DocumentsService, UsersService};

pub use parapet_ability::{AbilityBuilder, AbilityModel, Condition, Decision, Grant, build};
pub use parapet_config::{ConfigLoader, EnforcementConfig, LogFormat, LoggingConfig, ParapetConfig};
pub use parapet_guard::{AccessError, InstanceGuard, PolicyHandler, Requires, StaticPolicyGate};
pub use parapet_types::{
    Action, AttributeMap, Attributes, Document, DocumentId, Principal, Record, Role, SubjectType,
    User, UserId, Value,
};
pub use parapet_visibility::{GroupSet, Ownership, VisibilityFilter, VisibilityGroup};

use memory::MemoryBackend;

/// The request pipeline wired to its collaborators.
pub struct Parapet {
    authenticator: Arc<dyn Authenticator>,
    users: UsersService,
    documents: DocumentsService,
}

impl Parapet {
    pub fn new(
        config: &ParapetConfig,
        authenticator: Arc<dyn Authenticator>,
        users: Arc<dyn UserRepository>,
        documents: Arc<dyn DocumentRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let enforcement = Enforcement::from_config(&config.enforcement);
        Self {
            authenticator,
            users: UsersService::new(users, audit, enforcement),
            documents: DocumentsService::new(documents, enforcement),
        }
    }

    /// Wires the pipeline to in-memory collaborators sharing `backend`'s
    /// data.
    pub fn from_memory(config: &ParapetConfig, backend: &MemoryBackend) -> Self {
        let store = Arc::new(backend.store.clone());
        Self::new(
            config,
            backend.tokens.clone(),
            store.clone(),
            store,
            backend.audit.clone(),
        )
    }

    /// Authenticates the request's bearer token and builds its ability
    /// model.
    pub fn context(&self, token: Option<&str>) -> std::result::Result<RequestContext, AccessError> {
        RequestContext::authenticate(self.authenticator.as_ref(), token)
    }

    pub fn users(&self) -> &UsersService {
        &self.users
    }

    pub fn documents(&self) -> &DocumentsService {
        &self.documents
    }
}
