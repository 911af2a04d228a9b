//! Grant definitions.
//!
//! A grant permits one action on one subject type, optionally restricted to
//! instances whose attributes equal a fixed set of literals. There are no
//! deny grants: a model is the union of its grants.

use std::collections::BTreeMap;
use std::fmt;

use parapet_types::{Action, Attributes, SubjectType, Value};
use serde::{Deserialize, Serialize};

// ============================================================================
// Condition
// ============================================================================

/// Attribute-equality restriction on a grant.
///
/// Every entry must equal the same-named attribute of the instance. A
/// missing attribute never matches, not even a required `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(BTreeMap<String, Value>);

impl Condition {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Requires `field` to equal `value` (builder pattern).
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns whether every required attribute matches the instance.
    pub fn matches(&self, instance: &dyn Attributes) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| instance.attribute(field).as_ref() == Some(expected))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (field, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {value:?}")?;
        }
        f.write_str("}")
    }
}

// ============================================================================
// Grant
// ============================================================================

/// One permission rule: `(action, subject type, optional condition)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub action: Action,
    pub subject_type: SubjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Grant {
    /// Creates an unconditional grant.
    pub fn new(action: Action, subject_type: SubjectType) -> Self {
        Self {
            action,
            subject_type,
            condition: None,
        }
    }

    /// Restricts the grant to instances matching `condition`.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Returns whether the grant covers `action` on `subject_type`,
    /// ignoring any condition.
    ///
    /// `manage` covers every action and `all` covers every subject type.
    pub fn covers(&self, action: &Action, subject_type: &SubjectType) -> bool {
        (self.action == *action || self.action.is_wildcard())
            && (self.subject_type == *subject_type || self.subject_type.is_wildcard())
    }

    /// Returns whether the grant admits the request.
    ///
    /// A conditional grant needs an instance to match against; without one
    /// it never admits.
    pub fn admits(
        &self,
        action: &Action,
        subject_type: &SubjectType,
        instance: Option<&dyn Attributes>,
    ) -> bool {
        if !self.covers(action, subject_type) {
            return false;
        }

        match (&self.condition, instance) {
            (None, _) => true,
            (Some(condition), Some(instance)) => condition.matches(instance),
            (Some(_), None) => false,
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.subject_type)?;
        if let Some(condition) = &self.condition {
            write!(f, " where {condition}")?;
        }
        Ok(())
    }
}
