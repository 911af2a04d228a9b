//! Instance policy check.
//!
//! Runs once a record has been loaded, against the same ability model the
//! static gate used. It is never skipped, even after a gate passed,
//! because ownership is only known once the record is.

use parapet_ability::AbilityModel;
use parapet_types::{Action, Attributes, Principal, SubjectType};
use tracing::{info, warn};

use crate::error::{AccessError, Result};

/// Instance-level enforcement with optional decision logging.
#[derive(Debug, Clone, Copy)]
pub struct InstanceGuard {
    audit_enabled: bool,
}

impl Default for InstanceGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceGuard {
    pub fn new() -> Self {
        Self {
            audit_enabled: true,
        }
    }

    /// Disables decision logging (for testing).
    pub fn without_audit(self) -> Self {
        self.with_audit(false)
    }

    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Fails with `Forbidden` unless `ability` allows `action` on this
    /// particular `instance`.
    pub fn assert_can(
        &self,
        principal: &Principal,
        ability: &AbilityModel,
        action: &Action,
        subject_type: &SubjectType,
        instance: &dyn Attributes,
    ) -> Result<()> {
        let decision = ability.decide(action, subject_type, Some(instance));

        if self.audit_enabled {
            if decision.allowed {
                info!(
                    principal = %principal.id,
                    role = %principal.role,
                    action = %action,
                    subject = %subject_type,
                    reason = %decision.reason,
                    "Instance access granted"
                );
            } else {
                warn!(
                    principal = %principal.id,
                    role = %principal.role,
                    action = %action,
                    subject = %subject_type,
                    reason = %decision.reason,
                    "Instance access denied"
                );
            }
        }

        if decision.allowed {
            Ok(())
        } else {
            Err(AccessError::forbidden(format!(
                "Cannot {action} this {subject_type}"
            )))
        }
    }
}

/// Checks one loaded instance without logging.
pub fn assert_can(
    ability: &AbilityModel,
    action: &Action,
    subject_type: &SubjectType,
    instance: &dyn Attributes,
) -> Result<()> {
    if ability.can(action, subject_type, Some(instance)) {
        Ok(())
    } else {
        Err(AccessError::forbidden(format!(
            "Cannot {action} this {subject_type}"
        )))
    }
}
