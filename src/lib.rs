mod cache;
mod config;
mod endpoint;
mod organization;
mod reminder;
mod toggle;

#[cfg(feature = "http")]
pub mod http;

pub use cache::{CacheError, CacheKey, CachedSnapshot, QueryCache, QueryFetcher, Snapshot, SnapshotCache};
pub use config::{ClientConfig, ConfigError, DEFAULT_REMINDERS_KEY};
pub use endpoint::{MutationFailed, PersistenceEndpoint, ReminderStore};
pub use organization::{page_title, DirectoryError, OrganizationDirectory, OrganizationOverview};
pub use reminder::{
    Collection, Organization, OrganizationInfo, OwnerId, Reminder, ReminderId, UpdateStatusRequest,
};
pub use toggle::{
    ReminderItem, Rollback, ToggleController, ToggleError, ToggleOutcome, ToggleReport, ToggleState,
};

// Re-export so implementors of the collaborator traits use the same macro version
pub use async_trait::async_trait;
