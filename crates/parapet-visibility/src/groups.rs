//! Visibility groups and per-request group derivation.
//!
//! Groups are recomputed for every record that is written out. They are
//! never stored.

use std::fmt;

use parapet_types::{Attributes, Principal, Role, Value};
use serde::{Deserialize, Serialize};

/// A visibility tier for record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityGroup {
    /// Visible to every authenticated principal.
    Public,
    /// Visible to managers, admins and owners.
    Privileged,
    /// Visible to admins and owners.
    Confidential,
}

impl VisibilityGroup {
    pub const ALL: [VisibilityGroup; 3] = [
        VisibilityGroup::Public,
        VisibilityGroup::Privileged,
        VisibilityGroup::Confidential,
    ];

    const fn bit(self) -> u8 {
        match self {
            VisibilityGroup::Public => 0b001,
            VisibilityGroup::Privileged => 0b010,
            VisibilityGroup::Confidential => 0b100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityGroup::Public => "public",
            VisibilityGroup::Privileged => "privileged",
            VisibilityGroup::Confidential => "confidential",
        }
    }
}

impl fmt::Display for VisibilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deduplicated set of visibility groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GroupSet(u8);

impl GroupSet {
    pub const EMPTY: GroupSet = GroupSet(0);
    pub const PUBLIC: GroupSet = GroupSet::of(VisibilityGroup::Public);
    pub const PRIVILEGED: GroupSet = GroupSet::of(VisibilityGroup::Privileged);
    pub const CONFIDENTIAL: GroupSet = GroupSet::of(VisibilityGroup::Confidential);
    pub const EVERYTHING: GroupSet =
        GroupSet::PUBLIC.union(GroupSet::PRIVILEGED.union(GroupSet::CONFIDENTIAL));

    pub const fn of(group: VisibilityGroup) -> Self {
        Self(group.bit())
    }

    pub const fn union(self, other: GroupSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn insert(&mut self, group: VisibilityGroup) {
        self.0 |= group.bit();
    }

    pub fn contains(self, group: VisibilityGroup) -> bool {
        self.0 & group.bit() != 0
    }

    /// Returns whether the sets share at least one group.
    pub fn intersects(self, other: GroupSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns whether every group in `self` is in `other`.
    pub fn is_subset(self, other: GroupSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = VisibilityGroup> {
        VisibilityGroup::ALL
            .into_iter()
            .filter(move |g| self.contains(*g))
    }
}

impl FromIterator<VisibilityGroup> for GroupSet {
    fn from_iter<I: IntoIterator<Item = VisibilityGroup>>(iter: I) -> Self {
        let mut set = GroupSet::EMPTY;
        for group in iter {
            set.insert(group);
        }
        set
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(VisibilityGroup::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Returns whether `principal` owns `target`.
///
/// A target exposing `ownerId` is owned when it equals the principal id.
/// Only a target without `ownerId` falls back to comparing `id`.
pub fn is_owner(principal: &Principal, target: &dyn Attributes) -> bool {
    let me = Value::from(principal.id);
    match target.attribute("ownerId") {
        Some(owner) => owner == me,
        None => target.attribute("id") == Some(me),
    }
}

/// Computes the visibility groups of `principal` for one record.
///
/// Everyone is `public`; managers add `privileged`; admins add
/// `privileged` and `confidential`. Owning the target adds both regardless
/// of role.
pub fn groups_for(principal: &Principal, target: Option<&dyn Attributes>) -> GroupSet {
    let mut groups = GroupSet::PUBLIC;

    match principal.role {
        Role::Manager => groups.insert(VisibilityGroup::Privileged),
        Role::Admin => {
            groups.insert(VisibilityGroup::Privileged);
            groups.insert(VisibilityGroup::Confidential);
        }
        Role::User => {}
    }

    if target.is_some_and(|t| is_owner(principal, t)) {
        groups.insert(VisibilityGroup::Privileged);
        groups.insert(VisibilityGroup::Confidential);
    }

    groups
}
