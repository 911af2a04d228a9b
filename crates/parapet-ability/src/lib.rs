//! # parapet-ability: Ability models and policy evaluation
//!
//! Resolves what a principal may do into an [`AbilityModel`]: an ordered
//! list of [`Grant`]s, each permitting one action on one subject type,
//! optionally restricted by an attribute-equality [`Condition`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Principal (id, role, email)                 │
//! └─────────────────┬───────────────────────────┘
//!                   │  build()
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  AbilityModel                                │
//! │  ├─ Grants in declaration order              │
//! │  ├─ manage / all wildcards                   │
//! │  └─ Optional ownership conditions            │
//! └─────────────────┬───────────────────────────┘
//!                   │  can / cannot / decide
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision (allowed, matched grant, reason)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Evaluation
//!
//! A grant admits a request when its action equals the requested action (or
//! is `manage`), its subject type equals the requested one (or is `all`),
//! and, if it carries a condition, an instance was supplied whose
//! attributes equal every required literal. The model allows a request iff
//! any grant admits it.
//!
//! ## Examples
//!
//! ```
//! use parapet_ability::build;
//! use parapet_types::{Action, AttributeMap, Principal, Role, SubjectType};
//!
//! let principal = Principal::new(1, Role::User, "user@test.com");
//! let ability = build(&principal);
//!
//! let own_doc = AttributeMap::new().with("id", 5_i64).with("ownerId", 1_i64);
//! let other_doc = AttributeMap::new().with("id", 6_i64).with("ownerId", 2_i64);
//!
//! assert!(ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&own_doc)));
//! assert!(ability.cannot(&Action::READ, &SubjectType::DOCUMENT, Some(&other_doc)));
//! assert!(ability.can(&Action::CREATE, &SubjectType::DOCUMENT, None));
//! ```

pub mod ability;
pub mod builder;
pub mod grant;

pub use ability::{AbilityModel, Decision};
pub use builder::{AbilityBuilder, build};
pub use grant::{Condition, Grant};

#[cfg(test)]
mod tests;
