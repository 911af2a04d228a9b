//! Static policy gate.
//!
//! Runs before a handler touches any data, so it can only decide at the
//! level of subject types. Ownership conditions are left to the instance
//! check once the record is loaded.

use std::borrow::Cow;
use std::fmt;

use parapet_ability::{AbilityModel, build};
use parapet_types::{Action, Principal, SubjectType};
use tracing::{info, warn};

use crate::error::{AccessError, Result};

/// One predicate declared on an endpoint.
pub trait PolicyHandler: Send + Sync {
    /// Returns whether `ability` satisfies this predicate.
    fn handle(&self, ability: &AbilityModel) -> bool;

    /// Short label for logs and error messages.
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed("custom policy")
    }
}

impl<F> PolicyHandler for F
where
    F: Fn(&AbilityModel) -> bool + Send + Sync,
{
    fn handle(&self, ability: &AbilityModel) -> bool {
        self(ability)
    }
}

/// Requires an unconditional `action` on `subject_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requires {
    pub action: Action,
    pub subject_type: SubjectType,
}

impl Requires {
    pub fn new(action: Action, subject_type: SubjectType) -> Self {
        Self {
            action,
            subject_type,
        }
    }
}

impl PolicyHandler for Requires {
    fn handle(&self, ability: &AbilityModel) -> bool {
        ability.can(&self.action, &self.subject_type, None)
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} {}", self.action, self.subject_type))
    }
}

/// The set of predicates attached to one endpoint.
///
/// Every predicate must pass; the first failing one rejects the request.
pub struct StaticPolicyGate {
    handlers: Vec<Box<dyn PolicyHandler>>,

    /// Whether to log gate decisions.
    audit_enabled: bool,
}

impl Default for StaticPolicyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StaticPolicyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policies: Vec<Cow<'_, str>> = self.handlers.iter().map(|h| h.describe()).collect();
        f.debug_struct("StaticPolicyGate")
            .field("policies", &policies)
            .field("audit_enabled", &self.audit_enabled)
            .finish()
    }
}

impl StaticPolicyGate {
    /// Creates a gate with no predicates. It still rejects requests that
    /// carry no principal.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            audit_enabled: true,
        }
    }

    /// Adds a type-level `action` on `subject_type` predicate.
    pub fn require(self, action: Action, subject_type: SubjectType) -> Self {
        self.with_handler(Requires::new(action, subject_type))
    }

    /// Adds an arbitrary predicate.
    pub fn with_handler(mut self, handler: impl PolicyHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Disables decision logging (for testing).
    pub fn without_audit(self) -> Self {
        self.with_audit(false)
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Builds the principal's ability model and runs every predicate
    /// against it.
    ///
    /// A missing principal is `Forbidden`: authentication is expected to
    /// have rejected the request already, so reaching the gate without one
    /// is a policy failure rather than a credentials problem.
    pub fn check(&self, principal: Option<&Principal>) -> Result<AbilityModel> {
        let Some(principal) = principal else {
            if self.audit_enabled {
                warn!("Request reached policy gate without a principal");
            }
            return Err(AccessError::forbidden("No principal on request"));
        };

        let ability = build(principal);
        self.authorize(principal, &ability)?;
        Ok(ability)
    }

    /// Runs every predicate against an already built ability model.
    pub fn authorize(&self, principal: &Principal, ability: &AbilityModel) -> Result<()> {
        for handler in &self.handlers {
            if !handler.handle(ability) {
                let policy = handler.describe();
                if self.audit_enabled {
                    warn!(
                        principal = %principal.id,
                        role = %principal.role,
                        policy = %policy,
                        "Policy gate denied request"
                    );
                }
                return Err(AccessError::forbidden(format!(
                    "Policy '{policy}' not satisfied"
                )));
            }
        }

        if self.audit_enabled {
            info!(
                principal = %principal.id,
                role = %principal.role,
                policies = self.handlers.len(),
                "Policy gate passed"
            );
        }

        Ok(())
    }
}
