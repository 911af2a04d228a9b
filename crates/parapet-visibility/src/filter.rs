//! Field visibility filtering.
//!
//! Runs after every authorization check, immediately before a record is
//! serialized for output. Fields not visible to any of the principal's
//! groups are removed; nothing is masked or rewritten.

use parapet_types::{Attributes, Principal, Record, SubjectType};
use serde_json::{Map, Value as Json};
use thiserror::Error;
use tracing::debug;

use crate::groups::{GroupSet, groups_for};
use crate::schema::{FieldSchema, schema_for};

/// Errors that can occur while filtering typed records.
#[derive(Debug, Error)]
pub enum VisibilityError {
    /// The record could not be converted to JSON.
    #[error("Failed to serialize {subject_type} record: {source}")]
    Serialization {
        subject_type: SubjectType,
        source: serde_json::Error,
    },

    /// The record serialized to something other than a JSON object.
    #[error("{subject_type} record did not serialize to an object")]
    NotAnObject { subject_type: SubjectType },
}

/// Result type for visibility operations.
pub type Result<T> = std::result::Result<T, VisibilityError>;

/// Where ownership of a record is decided.
#[derive(Clone, Copy)]
pub enum Ownership<'a> {
    /// Each record is checked against itself.
    Record,
    /// Every record is checked against the same target.
    Target(&'a dyn Attributes),
    /// Ownership never applies; groups come from the role alone.
    Nobody,
}

/// Field visibility filter.
///
/// Stateless apart from its logging switch; one instance can serve every
/// request.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter {
    log_stripped: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityFilter {
    pub fn new() -> Self {
        Self {
            log_stripped: false,
        }
    }

    /// Logs the names of removed fields at `debug` level.
    pub fn with_stripped_field_logging(mut self, enabled: bool) -> Self {
        self.log_stripped = enabled;
        self
    }

    /// Filters a JSON record, or each element of a JSON array.
    ///
    /// Non-object values pass through unchanged. Fields missing from the
    /// record are simply not emitted.
    pub fn filter(
        &self,
        principal: &Principal,
        subject_type: &SubjectType,
        value: Json,
        ownership: Ownership<'_>,
    ) -> Json {
        match value {
            Json::Array(items) => Json::Array(
                items
                    .into_iter()
                    .map(|item| self.filter_one(principal, subject_type, item, ownership))
                    .collect(),
            ),
            other => self.filter_one(principal, subject_type, other, ownership),
        }
    }

    /// Filters a list where each record has its own ownership target.
    ///
    /// Records beyond the end of `targets` get role-only groups.
    pub fn filter_each(
        &self,
        principal: &Principal,
        subject_type: &SubjectType,
        values: Vec<Json>,
        targets: &[&dyn Attributes],
    ) -> Vec<Json> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let ownership = targets
                    .get(i)
                    .map_or(Ownership::Nobody, |t| Ownership::Target(*t));
                self.filter_one(principal, subject_type, value, ownership)
            })
            .collect()
    }

    /// Serializes and filters a typed record, using the record itself for
    /// ownership.
    pub fn filter_record<R: Record>(&self, principal: &Principal, record: &R) -> Result<Json> {
        let value = to_object::<R>(record)?;
        Ok(self.filter_one(principal, &R::SUBJECT_TYPE, value, Ownership::Record))
    }

    /// Serializes and filters typed records independently of one another.
    pub fn filter_records<R: Record>(
        &self,
        principal: &Principal,
        records: &[R],
    ) -> Result<Vec<Json>> {
        records
            .iter()
            .map(|record| self.filter_record(principal, record))
            .collect()
    }

    fn filter_one(
        &self,
        principal: &Principal,
        subject_type: &SubjectType,
        value: Json,
        ownership: Ownership<'_>,
    ) -> Json {
        let mut object = match value {
            Json::Object(object) => object,
            other => return other,
        };

        let groups = match ownership {
            Ownership::Record => groups_for(principal, Some(&object)),
            Ownership::Target(target) => groups_for(principal, Some(target)),
            Ownership::Nobody => groups_for(principal, None),
        };

        if let Some(schema) = schema_for(subject_type) {
            let mut stripped = Vec::new();
            strip(schema, &mut object, groups, &mut stripped);

            if self.log_stripped && !stripped.is_empty() {
                debug!(
                    principal = %principal.id,
                    role = %principal.role,
                    subject = %subject_type,
                    groups = %groups,
                    stripped = ?stripped,
                    "Fields hidden by visibility filter"
                );
            }
        }

        Json::Object(object)
    }
}

/// Removes fields not visible to `groups`, descending into nested records
/// with the same groups.
fn strip(
    schema: &FieldSchema,
    object: &mut Map<String, Json>,
    groups: GroupSet,
    stripped: &mut Vec<String>,
) {
    object.retain(|name, value| {
        let rule = schema.rule(name);
        let allowed = rule.map_or(GroupSet::PUBLIC, |r| r.groups);

        if !allowed.intersects(groups) {
            stripped.push(name.clone());
            return false;
        }

        if let Some(nested) = rule
            .and_then(|r| r.nested.as_ref())
            .and_then(schema_for)
        {
            match value {
                Json::Object(inner) => strip(nested, inner, groups, stripped),
                Json::Array(items) => {
                    for item in items {
                        if let Json::Object(inner) = item {
                            strip(nested, inner, groups, stripped);
                        }
                    }
                }
                _ => {}
            }
        }

        true
    });
}

fn to_object<R: Record>(record: &R) -> Result<Json> {
    let value = serde_json::to_value(record).map_err(|source| VisibilityError::Serialization {
        subject_type: R::SUBJECT_TYPE,
        source,
    })?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(VisibilityError::NotAnObject {
            subject_type: R::SUBJECT_TYPE,
        })
    }
}
