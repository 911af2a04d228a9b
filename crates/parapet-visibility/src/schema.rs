//! Static field-to-group tables.
//!
//! Each subject type has an ordered list of field rules. A field absent from
//! its table is public. A subject type without a table has every field
//! public.

use parapet_types::SubjectType;

use crate::groups::GroupSet;

/// Groups allowed to see one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub groups: GroupSet,
    /// Subject type of a nested record held in this field, filtered with
    /// the enclosing record's groups.
    pub nested: Option<SubjectType>,
}

impl FieldRule {
    const fn new(name: &'static str, groups: GroupSet) -> Self {
        Self {
            name,
            groups,
            nested: None,
        }
    }

    const fn nested(name: &'static str, groups: GroupSet, subject_type: SubjectType) -> Self {
        Self {
            name,
            groups,
            nested: Some(subject_type),
        }
    }
}

/// The field table of one subject type.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldSchema {
    pub subject_type: SubjectType,
    pub fields: &'static [FieldRule],
}

impl FieldSchema {
    /// Returns the rule for `field`, if the table lists it.
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.name == field)
    }

    /// Returns the groups that may see `field`.
    pub fn groups_of(&self, field: &str) -> GroupSet {
        self.rule(field).map_or(GroupSet::PUBLIC, |r| r.groups)
    }

    /// Returns the listed fields visible to `groups`, in table order.
    pub fn visible_fields(&self, groups: GroupSet) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(move |r| r.groups.intersects(groups))
            .map(|r| r.name)
    }
}

const PRIVILEGED: GroupSet = GroupSet::PRIVILEGED.union(GroupSet::CONFIDENTIAL);

/// `User` fields. Confidential principals see everything privileged ones
/// do. Salary is confidential: managers see contact details but not pay.
pub static USER_SCHEMA: FieldSchema = FieldSchema {
    subject_type: SubjectType::USER,
    fields: &[
        FieldRule::new("id", GroupSet::PUBLIC),
        FieldRule::new("email", GroupSet::PUBLIC),
        FieldRule::new("name", GroupSet::PUBLIC),
        FieldRule::new("role", GroupSet::PUBLIC),
        FieldRule::new("createdAt", GroupSet::PUBLIC),
        FieldRule::new("updatedAt", GroupSet::PUBLIC),
        FieldRule::new("salary", GroupSet::CONFIDENTIAL),
        FieldRule::new("phoneNumber", PRIVILEGED),
        FieldRule::new("nationalId", GroupSet::CONFIDENTIAL),
    ],
};

/// `Document` fields. Access to a document is decided by the ability
/// model, so every exposed field is public. `updatedAt` is bookkeeping and
/// is never sent.
pub static DOCUMENT_SCHEMA: FieldSchema = FieldSchema {
    subject_type: SubjectType::DOCUMENT,
    fields: &[
        FieldRule::new("id", GroupSet::PUBLIC),
        FieldRule::new("title", GroupSet::PUBLIC),
        FieldRule::new("content", GroupSet::PUBLIC),
        FieldRule::new("ownerId", GroupSet::PUBLIC),
        FieldRule::nested("owner", GroupSet::PUBLIC, SubjectType::USER),
        FieldRule::new("createdAt", GroupSet::PUBLIC),
        FieldRule::new("updatedAt", GroupSet::EMPTY),
    ],
};

/// Returns the field table for `subject_type`.
pub fn schema_for(subject_type: &SubjectType) -> Option<&'static FieldSchema> {
    [&USER_SCHEMA, &DOCUMENT_SCHEMA]
        .into_iter()
        .find(|schema| schema.subject_type == *subject_type)
}
