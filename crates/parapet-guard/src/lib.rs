//! # parapet-guard: Policy enforcement
//!
//! Two checkpoints share one ability model per request:
//!
//! ```text
//! ┌────────────────────────────┐
//! │  Authenticated request     │
//! └─────────────┬──────────────┘
//!               ▼
//! ┌────────────────────────────┐
//! │  StaticPolicyGate          │  type-level, before any load
//! └─────────────┬──────────────┘
//!               ▼
//! ┌────────────────────────────┐
//! │  Handler loads the record  │  missing record: NotFound
//! └─────────────┬──────────────┘
//!               ▼
//! ┌────────────────────────────┐
//! │  InstanceGuard::assert_can │  ownership and attribute conditions
//! └─────────────┬──────────────┘
//!               ▼
//!        visibility filter
//! ```
//!
//! Failures are [`AccessError`]s; the transport maps them to 401, 403 and
//! 404 through [`AccessError::status_code`].
//!
//! ## Examples
//!
//! ```
//! use parapet_guard::{InstanceGuard, StaticPolicyGate};
//! use parapet_types::{Action, AttributeMap, Principal, Role, SubjectType, UserId};
//!
//! let user = Principal::new(2, Role::User, "u@test.com");
//!
//! let gate = StaticPolicyGate::new()
//!     .require(Action::CREATE, SubjectType::DOCUMENT)
//!     .without_audit();
//! let ability = gate.check(Some(&user)).unwrap();
//!
//! let doc = AttributeMap::new().with("ownerId", UserId::new(1));
//! let err = InstanceGuard::new()
//!     .without_audit()
//!     .assert_can(&user, &ability, &Action::READ, &SubjectType::DOCUMENT, &doc)
//!     .unwrap_err();
//! assert_eq!(err.status_code(), 403);
//! ```

pub mod error;
pub mod gate;
pub mod instance;

pub use error::{AccessError, Result};
pub use gate::{PolicyHandler, Requires, StaticPolicyGate};
pub use instance::{InstanceGuard, assert_can};
