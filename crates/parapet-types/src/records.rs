//! Domain records served through the access layer.
//!
//! Records serialize with camelCase field names; those names are the ones
//! grant conditions and the visibility schema refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Attributes, DocumentId, Role, SubjectType, UserId, Value};

/// A record that carries its subject type explicitly.
///
/// The type is never inferred from the shape of the data.
pub trait Record: Attributes + Serialize {
    const SUBJECT_TYPE: SubjectType;
}

/// A user profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub salary: Option<i64>,
    pub phone_number: Option<String>,
    pub national_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns whether the profile holds personally identifying data
    /// beyond the login email.
    pub fn has_pii(&self) -> bool {
        self.salary.is_some() || self.phone_number.is_some() || self.national_id.is_some()
    }
}

impl Attributes for User {
    fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id),
            "email" => Value::from(self.email.as_str()),
            "name" => Value::from(self.name.clone()),
            "role" => Value::from(self.role),
            "salary" => Value::from(self.salary),
            "phoneNumber" => Value::from(self.phone_number.clone()),
            "nationalId" => Value::from(self.national_id.clone()),
            "createdAt" => Value::from(self.created_at.to_rfc3339()),
            "updatedAt" => Value::from(self.updated_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for User {
    const SUBJECT_TYPE: SubjectType = SubjectType::USER;
}

/// A document row, optionally joined with its owner's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attributes for Document {
    fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id),
            "title" => Value::from(self.title.as_str()),
            "content" => Value::from(self.content.as_str()),
            "ownerId" => Value::from(self.owner_id),
            "createdAt" => Value::from(self.created_at.to_rfc3339()),
            "updatedAt" => Value::from(self.updated_at.to_rfc3339()),
            // `owner` is a nested record, not a literal
            _ => return None,
        };
        Some(value)
    }
}

impl Record for Document {
    const SUBJECT_TYPE: SubjectType = SubjectType::DOCUMENT;
}
