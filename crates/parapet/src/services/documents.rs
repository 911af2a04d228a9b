use std::sync::Arc;

use parapet_guard::{AccessError, StaticPolicyGate};
use parapet_types::{Action, Document, DocumentId, SubjectType};
use serde_json::Value as Json;
use tracing::debug;

use crate::collaborators::{DocumentPatch, DocumentRepository, NewDocument};
use crate::context::{Enforcement, RequestContext};
use crate::error::Result;

/// Document endpoints.
///
/// Only creation has a static gate. Reading, updating and deleting depend
/// on ownership, which the instance check decides after the load.
pub struct DocumentsService {
    documents: Arc<dyn DocumentRepository>,
    enforcement: Enforcement,
    create_gate: StaticPolicyGate,
}

impl DocumentsService {
    pub fn new(documents: Arc<dyn DocumentRepository>, enforcement: Enforcement) -> Self {
        Self {
            documents,
            create_gate: enforcement.gate(Action::CREATE, SubjectType::DOCUMENT),
            enforcement,
        }
    }

    /// Creates a document owned by the caller.
    pub fn create(&self, ctx: &RequestContext, new_doc: NewDocument) -> Result<Json> {
        self.create_gate.authorize(ctx.principal(), ctx.ability())?;

        let document = self.documents.create(ctx.principal().id, new_doc)?;
        debug!(document = %document.id, owner = %document.owner_id, "Document created");
        self.respond(ctx, &document)
    }

    pub fn get(&self, ctx: &RequestContext, id: DocumentId) -> Result<Json> {
        let document = self.load_checked(ctx, id, &Action::READ)?;
        self.respond(ctx, &document)
    }

    pub fn update(&self, ctx: &RequestContext, id: DocumentId, patch: DocumentPatch) -> Result<Json> {
        let current = self.load_checked(ctx, id, &Action::UPDATE)?;

        let mut updated = self.documents.update(id, patch)?;
        if updated.owner.is_none() {
            updated.owner = current.owner;
        }
        self.respond(ctx, &updated)
    }

    pub fn remove(&self, ctx: &RequestContext, id: DocumentId) -> Result<()> {
        self.load_checked(ctx, id, &Action::DELETE)?;

        if !self.documents.delete(id)? {
            return Err(AccessError::not_found(SubjectType::DOCUMENT, id).into());
        }
        debug!(document = %id, by = %ctx.principal().id, "Document deleted");
        Ok(())
    }

    /// Loads a document and runs the instance check for `action`.
    fn load_checked(&self, ctx: &RequestContext, id: DocumentId, action: &Action) -> Result<Document> {
        let document = self
            .documents
            .find_by_id(id)?
            .ok_or_else(|| AccessError::not_found(SubjectType::DOCUMENT, id))?;

        self.enforcement.instance().assert_can(
            ctx.principal(),
            ctx.ability(),
            action,
            &SubjectType::DOCUMENT,
            &document,
        )?;
        Ok(document)
    }

    fn respond(&self, ctx: &RequestContext, document: &Document) -> Result<Json> {
        Ok(self
            .enforcement
            .filter()
            .filter_record(ctx.principal(), document)?)
    }
}
