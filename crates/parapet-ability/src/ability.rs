//! Ability model and policy evaluation.
//!
//! Grants are scanned in declaration order. The first grant that admits the
//! request decides; since every grant allows, order only affects which
//! grant is reported in the [`Decision`], never the outcome.

use parapet_types::{Action, Attributes, SubjectType};
use serde::{Deserialize, Serialize};

use crate::grant::Grant;

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating a request against an ability model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is allowed.
    pub allowed: bool,
    /// Index of the grant that admitted the request, or `None` on denial.
    pub matched_grant: Option<usize>,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
}

// ============================================================================
// AbilityModel
// ============================================================================

/// The ordered set of grants resolved for one principal.
///
/// Built fresh per request by [`crate::build`] and never shared or mutated
/// afterwards. `can` and `cannot` are exact inverses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityModel {
    grants: Vec<Grant>,
}

impl AbilityModel {
    /// Creates a model from grants in evaluation order.
    pub fn new(grants: Vec<Grant>) -> Self {
        Self { grants }
    }

    /// Creates a model that allows nothing.
    pub fn empty() -> Self {
        Self { grants: Vec::new() }
    }

    /// Returns the grants in evaluation order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Evaluates a request and explains the outcome.
    ///
    /// Without an instance only unconditional grants can admit, so a
    /// type-level check never passes on an ownership grant alone.
    pub fn decide(
        &self,
        action: &Action,
        subject_type: &SubjectType,
        instance: Option<&dyn Attributes>,
    ) -> Decision {
        let matched = self
            .grants
            .iter()
            .position(|grant| grant.admits(action, subject_type, instance));

        match matched {
            Some(index) => Decision {
                allowed: true,
                matched_grant: Some(index),
                reason: format!("Allowed by grant #{index} ({})", self.grants[index]),
            },
            None => {
                let reason = if instance.is_none()
                    && self
                        .grants
                        .iter()
                        .any(|g| g.is_conditional() && g.covers(action, subject_type))
                {
                    format!(
                        "No unconditional grant for '{action}' on '{subject_type}'; \
                         an instance is required"
                    )
                } else {
                    format!("No grant allows '{action}' on '{subject_type}'")
                };
                Decision {
                    allowed: false,
                    matched_grant: None,
                    reason,
                }
            }
        }
    }

    /// Returns whether `action` on `subject_type` (or on `instance` of it)
    /// is allowed.
    pub fn can(
        &self,
        action: &Action,
        subject_type: &SubjectType,
        instance: Option<&dyn Attributes>,
    ) -> bool {
        self.decide(action, subject_type, instance).allowed
    }

    /// Inverse of [`can`](Self::can).
    pub fn cannot(
        &self,
        action: &Action,
        subject_type: &SubjectType,
        instance: Option<&dyn Attributes>,
    ) -> bool {
        !self.can(action, subject_type, instance)
    }

    /// Returns whether any grant mentions `subject_type` at all, with or
    /// without a condition.
    ///
    /// Useful for deciding whether a listing endpoint can return anything
    /// before loading data.
    pub fn mentions(&self, action: &Action, subject_type: &SubjectType) -> bool {
        self.grants.iter().any(|g| g.covers(action, subject_type))
    }
}

impl From<Vec<Grant>> for AbilityModel {
    fn from(grants: Vec<Grant>) -> Self {
        Self::new(grants)
    }
}
