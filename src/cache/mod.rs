//! Query cache - keyed, shared, in-memory snapshots of reminder lists.
//!
//! Every key holds one [`Snapshot`]: an immutable, ordered list of reminders.
//! Writers never edit a snapshot in place; they derive a new one and swap it
//! in whole, so a reader sees either the old list or the new one.
//!
//! ## Example
//!
//! ```ignore
//! use reminders::{CacheKey, ClientConfig, QueryCache, ReminderStore, SnapshotCache};
//!
//! let store = ReminderStore::new();
//! let cache = QueryCache::new(store.clone(), ClientConfig::default());
//! let key = CacheKey::new("reminders");
//!
//! let snapshot = cache.fetch(&key).await?;
//! cache.write(&key, snapshot.with_status(&"r1".into(), true))?;
//! cache.invalidate(&key)?; // next read comes from the store again
//! ```

mod query_cache;
mod snapshot;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reminder::ReminderId;

pub use query_cache::QueryCache;
pub use snapshot::{CachedSnapshot, Snapshot};
pub use store::{QueryFetcher, SnapshotCache};

/// Logical identifier of a cached view, e.g. `"reminders"`.
///
/// A key of the form `"<list>:<collection_id>"` names the reminders of one
/// collection; any key without a `:` names every reminder. Fetchers and the
/// HTTP transport scope their reads by this rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for the reminders of one collection under `list`.
    pub fn for_collection(list: &str, collection_id: &str) -> Self {
        Self(format!("{}:{}", list, collection_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The collection this key is scoped to, if any.
    pub fn collection_id(&self) -> Option<&str> {
        self.0
            .split_once(':')
            .map(|(_, collection_id)| collection_id)
            .filter(|collection_id| !collection_id.is_empty())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Error type for cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The entry map lock was poisoned while performing the named operation.
    LockPoisoned(&'static str),
    /// A snapshot would contain the same reminder twice.
    DuplicateReminder(ReminderId),
    /// Loading data from the source failed.
    Fetch(String),
    /// A refresh was requested outside of a tokio runtime.
    NoRuntime,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::LockPoisoned(operation) => {
                write!(f, "cache lock poisoned during {}", operation)
            }
            CacheError::DuplicateReminder(id) => {
                write!(f, "snapshot contains reminder {} more than once", id)
            }
            CacheError::Fetch(msg) => write!(f, "cache fetch failed: {}", msg),
            CacheError::NoRuntime => write!(f, "cache refresh requires a tokio runtime"),
        }
    }
}

impl std::error::Error for CacheError {}
