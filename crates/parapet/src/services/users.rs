use std::sync::Arc;

use parapet_guard::{AccessError, StaticPolicyGate};
use parapet_types::{Action, SubjectType, User, UserId};
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::collaborators::{AuditEvent, AuditSink, NewUser, UserRepository};
use crate::context::{Enforcement, RequestContext};
use crate::error::Result;

/// User profile endpoints.
pub struct UsersService {
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditSink>,
    enforcement: Enforcement,
    list_gate: StaticPolicyGate,
    remove_gate: StaticPolicyGate,
}

impl UsersService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditSink>,
        enforcement: Enforcement,
    ) -> Self {
        Self {
            users,
            audit,
            list_gate: enforcement.gate(Action::AGGREGATE, SubjectType::USER),
            remove_gate: enforcement.gate(Action::DELETE, SubjectType::USER),
            enforcement,
        }
    }

    /// Lists every profile, each filtered for the caller independently.
    pub fn list(&self, ctx: &RequestContext) -> Result<Vec<Json>> {
        self.list_gate.authorize(ctx.principal(), ctx.ability())?;

        let users = self.users.find_all()?;
        Ok(self
            .enforcement
            .filter()
            .filter_records(ctx.principal(), &users)?)
    }

    /// Returns one profile.
    pub fn get(&self, ctx: &RequestContext, id: UserId) -> Result<Json> {
        let user = self.load(id)?;
        self.enforcement.instance().assert_can(
            ctx.principal(),
            ctx.ability(),
            &Action::READ,
            &SubjectType::USER,
            &user,
        )?;

        Ok(self.enforcement.filter().filter_record(ctx.principal(), &user)?)
    }

    /// Deletes a profile.
    pub fn remove(&self, ctx: &RequestContext, id: UserId) -> Result<()> {
        self.remove_gate.authorize(ctx.principal(), ctx.ability())?;

        let user = self.load(id)?;
        self.enforcement.instance().assert_can(
            ctx.principal(),
            ctx.ability(),
            &Action::DELETE,
            &SubjectType::USER,
            &user,
        )?;

        if !self.users.delete(id)? {
            return Err(AccessError::not_found(SubjectType::USER, id).into());
        }
        debug!(user = %id, by = %ctx.principal().id, "User deleted");
        Ok(())
    }

    /// Stores a new account and reports it to the audit sink.
    ///
    /// Unauthenticated. A failing audit sink is logged and otherwise
    /// ignored.
    pub fn register(&self, new_user: NewUser) -> Result<User> {
        let user = self.users.create(new_user)?;

        let event = AuditEvent::UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            has_pii: user.has_pii(),
        };
        if let Err(err) = self.audit.record(event) {
            warn!(user = %user.id, error = %err, "Failed to record registration audit event");
        }

        Ok(user)
    }

    fn load(&self, id: UserId) -> Result<User> {
        self.users
            .find_by_id(id)?
            .ok_or_else(|| AccessError::not_found(SubjectType::USER, id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuditError, ServiceError};
    use crate::memory::{MemoryAuditSink, MemoryStore};
    use parapet_types::{Principal, Role};

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn record(&self, _event: AuditEvent) -> std::result::Result<(), AuditError> {
            Err(AuditError("offline".to_string()))
        }
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            role,
            ..Default::default()
        }
    }

    fn service(audit: Arc<dyn AuditSink>) -> (UsersService, MemoryStore) {
        let store = MemoryStore::new();
        let service = UsersService::new(
            Arc::new(store.clone()),
            audit,
            Enforcement::without_audit(),
        );
        (service, store)
    }

    fn ctx(id: u64, role: Role) -> RequestContext {
        RequestContext::new(Principal::new(id, role, format!("{id}@test.com")))
    }

    #[test]
    fn test_register_records_audit_event() {
        let sink = Arc::new(MemoryAuditSink::new());
        let (service, _) = service(sink.clone());

        let user = service
            .register(NewUser {
                salary: Some(10),
                ..new_user("a@test.com", Role::User)
            })
            .unwrap();

        assert_eq!(
            sink.events(),
            vec![AuditEvent::UserRegistered {
                user_id: user.id,
                email: "a@test.com".to_string(),
                role: Role::User,
                has_pii: true,
            }]
        );
    }

    #[test]
    fn test_register_survives_audit_failure() {
        let (service, store) = service(Arc::new(BrokenSink));

        let user = service.register(new_user("a@test.com", Role::User)).unwrap();
        assert!(store.find_by_email("a@test.com").unwrap().is_some());
        assert_eq!(user.id, UserId::new(1));
    }

    #[test]
    fn test_list_requires_aggregate() {
        let (service, _) = service(Arc::new(MemoryAuditSink::new()));
        service.register(new_user("a@test.com", Role::User)).unwrap();

        let err = service.list(&ctx(1, Role::User)).unwrap_err();
        assert_eq!(err.status_code(), 403);

        let listed = service.list(&ctx(50, Role::Manager)).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found_for_everyone() {
        let (service, _) = service(Arc::new(MemoryAuditSink::new()));

        for role in [Role::User, Role::Manager, Role::Admin] {
            let err = service.get(&ctx(1, role), UserId::new(42)).unwrap_err();
            assert!(matches!(err, ServiceError::Access(ref e) if e.is_not_found()));
        }
    }

    #[test]
    fn test_user_reads_only_own_profile() {
        let (service, _) = service(Arc::new(MemoryAuditSink::new()));
        let me = service.register(new_user("me@test.com", Role::User)).unwrap();
        let other = service.register(new_user("o@test.com", Role::User)).unwrap();
        let ctx = ctx(me.id.as_u64(), Role::User);

        assert!(service.get(&ctx, me.id).is_ok());
        assert_eq!(service.get(&ctx, other.id).unwrap_err().status_code(), 403);
    }

    #[test]
    fn test_only_admin_removes_users() {
        let (service, store) = service(Arc::new(MemoryAuditSink::new()));
        let victim = service.register(new_user("v@test.com", Role::User)).unwrap();

        let err = service
            .remove(&ctx(victim.id.as_u64(), Role::User), victim.id)
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            service
                .remove(&ctx(2, Role::Manager), victim.id)
                .unwrap_err()
                .status_code(),
            403
        );

        service.remove(&ctx(99, Role::Admin), victim.id).unwrap();
        assert!(store.find_all().unwrap().is_empty());

        let err = service.remove(&ctx(99, Role::Admin), victim.id).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
