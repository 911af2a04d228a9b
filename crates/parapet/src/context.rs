//! Per-request authorization state.

use parapet_ability::{AbilityModel, build};
use parapet_config::EnforcementConfig;
use parapet_guard::{AccessError, InstanceGuard, StaticPolicyGate};
use parapet_types::{Action, Principal, SubjectType};
use parapet_visibility::VisibilityFilter;

use crate::collaborators::Authenticator;

/// The authenticated principal of one request and the ability model built
/// for it.
///
/// Built once per request and borrowed by every gate, instance check and
/// filter that runs while serving it. Never cached across requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
    ability: AbilityModel,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        let ability = build(&principal);
        Self { principal, ability }
    }

    /// Authenticates a bearer token. A missing token is `Unauthorized`.
    pub fn authenticate(
        authenticator: &dyn Authenticator,
        token: Option<&str>,
    ) -> Result<Self, AccessError> {
        let token = token.ok_or_else(|| AccessError::unauthorized("Missing bearer token"))?;
        authenticator.authenticate(token).map(Self::new)
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn ability(&self) -> &AbilityModel {
        &self.ability
    }
}

/// Enforcement components configured once and shared by every service.
#[derive(Debug, Clone, Copy)]
pub struct Enforcement {
    audit_decisions: bool,
    instance: InstanceGuard,
    filter: VisibilityFilter,
}

impl Default for Enforcement {
    fn default() -> Self {
        Self::from_config(&EnforcementConfig::default())
    }
}

impl Enforcement {
    pub fn from_config(config: &EnforcementConfig) -> Self {
        Self {
            audit_decisions: config.audit_decisions,
            instance: InstanceGuard::new().with_audit(config.audit_decisions),
            filter: VisibilityFilter::new().with_stripped_field_logging(config.log_stripped_fields),
        }
    }

    /// Disables decision logging (for testing).
    pub fn without_audit() -> Self {
        Self::from_config(&EnforcementConfig {
            audit_decisions: false,
            log_stripped_fields: false,
        })
    }

    /// Builds a gate requiring `action` on `subject_type`.
    pub fn gate(&self, action: Action, subject_type: SubjectType) -> StaticPolicyGate {
        StaticPolicyGate::new()
            .require(action, subject_type)
            .with_audit(self.audit_decisions)
    }

    pub fn instance(&self) -> &InstanceGuard {
        &self.instance
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }
}
