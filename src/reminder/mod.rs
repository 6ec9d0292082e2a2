//! Reminder data model.
//!
//! Reminders live in collections, and collections belong to an organization.
//! The optimistic toggle flow only reads `id`, `is_completed` and `created_by`;
//! every other field is carried through untouched.

mod collection;
mod record;

pub use collection::{Collection, Organization, OrganizationInfo};
pub use record::{OwnerId, Reminder, ReminderId, UpdateStatusRequest};
