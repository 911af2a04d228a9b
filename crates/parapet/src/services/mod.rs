//! Request handlers for users and documents.
//!
//! Every handler follows the same order: static gate, load, instance
//! check, then visibility filter. A record that does not exist is
//! `NotFound` before any instance check runs.

mod documents;
mod users;

pub use documents::DocumentsService;
pub use users::UsersService;
