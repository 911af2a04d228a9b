//! # parapet-types: Core types for `Parapet`
//!
//! This crate contains shared types used across the `Parapet` workspace:
//! - Identity ([`UserId`], [`DocumentId`], [`Role`], [`Principal`])
//! - Policy vocabulary ([`Action`], [`SubjectType`])
//! - Attribute access ([`Value`], [`Attributes`], [`AttributeMap`])
//! - Domain records ([`User`], [`Document`], [`Record`])
//!
//! Nothing in this crate makes an authorization decision. The ability,
//! guard and visibility crates consume these types; the persistence and
//! authentication collaborators produce them.

use std::{
    borrow::Cow,
    fmt::{Debug, Display},
};

use serde::{Deserialize, Serialize};

mod attributes;
mod records;

pub use attributes::{AttributeMap, Attributes, Value};
pub use records::{Document, Record, User};

// ============================================================================
// Entity IDs - All Copy (cheap 8-byte values)
// ============================================================================

/// Stable identifier of a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Stable identifier of a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<DocumentId> for u64 {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

// ============================================================================
// Role
// ============================================================================

/// Role carried by an authenticated principal.
///
/// Deserialization is lenient: any string that is not a known role becomes
/// [`Role::User`], the most restrictive role. An unrecognized role is never
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Role {
    /// Full access to every action on every subject type.
    Admin,

    /// Read access across users and documents, plus user aggregation.
    /// Cannot create, update or delete documents.
    Manager,

    /// Access to their own profile and their own documents.
    #[default]
    User,
}

impl Role {
    /// Parses a role name, falling back to [`Role::User`].
    ///
    /// Matching is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use parapet_types::Role;
    ///
    /// assert_eq!(Role::parse("ADMIN"), Role::Admin);
    /// assert_eq!(Role::parse("manager"), Role::Manager);
    /// assert_eq!(Role::parse("SUPERUSER"), Role::User);
    /// ```
    pub fn parse(name: &str) -> Self {
        Self::recognize(name).unwrap_or_else(|| {
            tracing::warn!(role = %name, "Unrecognized role; treating as USER");
            Role::User
        })
    }

    /// Parses a role name, returning `None` when it is not a known role.
    pub fn recognize(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("ADMIN") {
            Some(Role::Admin)
        } else if name.eq_ignore_ascii_case("MANAGER") {
            Some(Role::Manager)
        } else if name.eq_ignore_ascii_case("USER") {
            Some(Role::User)
        } else {
            None
        }
    }

    /// Returns the canonical upper-case name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::parse(value)
    }
}

// ============================================================================
// Principal
// ============================================================================

/// The authenticated actor of one request.
///
/// Produced by the authentication collaborator and never mutated while the
/// request is being served.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub email: String,
}

impl Principal {
    pub fn new(id: impl Into<UserId>, role: Role, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            email: email.into(),
        }
    }
}

// ============================================================================
// Policy vocabulary
// ============================================================================

/// An action a principal may perform (`read`, `update`, ...).
///
/// Actions are open-ended identifiers; the associated constants name the
/// ones the built-in roles use. [`Action::MANAGE`] is the wildcard action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub const READ: Action = Action(Cow::Borrowed("read"));
    pub const CREATE: Action = Action(Cow::Borrowed("create"));
    pub const UPDATE: Action = Action(Cow::Borrowed("update"));
    pub const DELETE: Action = Action(Cow::Borrowed("delete"));
    pub const AGGREGATE: Action = Action(Cow::Borrowed("aggregate"));
    /// Matches every action.
    pub const MANAGE: Action = Action(Cow::Borrowed("manage"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the `manage` wildcard.
    pub fn is_wildcard(&self) -> bool {
        *self == Action::MANAGE
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The name of a subject type (`User`, `Document`, or the wildcard `all`).
///
/// Matching is exact on the string; callers always pass the canonical
/// name, never a derived or lower-cased one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectType(Cow<'static, str>);

impl SubjectType {
    pub const USER: SubjectType = SubjectType(Cow::Borrowed("User"));
    pub const DOCUMENT: SubjectType = SubjectType(Cow::Borrowed("Document"));
    /// Matches every subject type, including unregistered ones.
    pub const ALL: SubjectType = SubjectType(Cow::Borrowed("all"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the `all` wildcard.
    pub fn is_wildcard(&self) -> bool {
        *self == SubjectType::ALL
    }
}

impl Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
