//! Attribute access for condition matching and ownership detection.
//!
//! The evaluator and the visibility filter read record fields through the
//! [`Attributes`] trait only, so typed records, JSON objects and ad-hoc
//! attribute maps are interchangeable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DocumentId, Role, UserId};

/// A literal attribute value.
///
/// Equality is exact: `Integer(1)` never equals `Text("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    /// Converts a JSON scalar into a `Value`.
    ///
    /// Arrays and objects have no literal form and return `None`. Numbers
    /// that do not fit in an `i64` are kept as their decimal text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Value::Text(n.to_string()), Value::Integer),
            ),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<u64> for Value {
    /// Matches [`Value::from_json`]: values above `i64::MAX` become their
    /// decimal text.
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Value::Text(value.to_string()), Value::Integer)
    }
}

impl From<UserId> for Value {
    fn from(id: UserId) -> Self {
        Value::from(id.as_u64())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::from(id.as_u64())
    }
}

impl From<Role> for Value {
    fn from(role: Role) -> Self {
        Value::Text(role.as_str().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Read access to the named fields of a record.
///
/// `attribute` returns `None` when the record does not expose the field at
/// all, and `Some(Value::Null)` when it exposes the field without a value.
/// The distinction matters for ownership detection.
pub trait Attributes {
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Returns whether the record exposes the field.
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

impl<T: Attributes + ?Sized> Attributes for &T {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}

impl Attributes for serde_json::Map<String, serde_json::Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(Value::from_json)
    }
}

impl Attributes for serde_json::Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|object| object.attribute(name))
    }
}

/// An ad-hoc set of attributes.
///
/// Used where only a few fields of a subject are known, e.g. checking a
/// profile request by its path id before the record is loaded.
///
/// # Examples
///
/// ```
/// use parapet_types::{AttributeMap, Attributes, UserId, Value};
///
/// let ghost = AttributeMap::new().with("id", UserId::new(9));
/// assert_eq!(ghost.attribute("id"), Some(Value::Integer(9)));
/// assert!(!ghost.has_attribute("ownerId"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, Value>);

impl AttributeMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds an attribute (builder pattern).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl Attributes for AttributeMap {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
