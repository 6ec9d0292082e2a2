//! Persistence endpoint - where completion changes are made durable.
//!
//! The toggle controller only needs [`PersistenceEndpoint::update_status`].
//! [`ReminderStore`] is the in-memory backend: it answers status updates,
//! serves reminder lists to the query cache and organization data to the
//! overview loader.

mod error;
mod in_memory;

use async_trait::async_trait;

use crate::reminder::{Reminder, UpdateStatusRequest};

pub use error::MutationFailed;
pub use in_memory::ReminderStore;

/// Asynchronous server-side mutation of a reminder's completion flag.
#[async_trait]
pub trait PersistenceEndpoint: Send + Sync + 'static {
    /// Persist `request.is_completed` and return the stored reminder.
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Reminder, MutationFailed>;
}
