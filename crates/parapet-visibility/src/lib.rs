//! # parapet-visibility: Field-level visibility
//!
//! Strips the fields of outbound records that the acting principal may not
//! see. Each field belongs to one or more [`VisibilityGroup`]s; each record
//! gets a [`GroupSet`] derived from the principal's role and whether they
//! own the record.
//!
//! ## Groups
//!
//! | Principal        | public | privileged | confidential |
//! |------------------|--------|------------|--------------|
//! | User             | ✓      | ✗          | ✗            |
//! | Manager          | ✓      | ✓          | ✗            |
//! | Admin            | ✓      | ✓          | ✓            |
//! | Owner of record  | ✓      | ✓          | ✓            |
//!
//! ## User fields
//!
//! | Field                                             | Visible to                 |
//! |---------------------------------------------------|----------------------------|
//! | `id`, `email`, `name`, `role`, `createdAt`, `updatedAt` | public               |
//! | `phoneNumber`                                     | privileged, confidential   |
//! | `salary`, `nationalId`                            | confidential               |
//!
//! Every `Document` field except `updatedAt` is public; whether a document
//! may be seen at all is decided by the ability model before filtering.
//! `updatedAt` belongs to no group and is never sent.
//!
//! ## Examples
//!
//! ```
//! use parapet_types::{Principal, Role, SubjectType};
//! use parapet_visibility::{Ownership, VisibilityFilter};
//! use serde_json::json;
//!
//! let manager = Principal::new(1, Role::Manager, "m@test.com");
//! let record = json!({
//!     "id": 9,
//!     "name": "Nine",
//!     "phoneNumber": "555",
//!     "salary": 50000,
//!     "nationalId": "X",
//! });
//!
//! let out = VisibilityFilter::new().filter(&manager, &SubjectType::USER, record, Ownership::Record);
//! assert_eq!(out, json!({"id": 9, "name": "Nine", "phoneNumber": "555"}));
//! ```

pub mod filter;
pub mod groups;
pub mod schema;

pub use filter::{Ownership, VisibilityError, VisibilityFilter};
pub use groups::{GroupSet, VisibilityGroup, groups_for, is_owner};
pub use schema::{FieldRule, FieldSchema, schema_for};

#[cfg(test)]
mod tests;
