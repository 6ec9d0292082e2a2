use async_trait::async_trait;

use crate::reminder::Reminder;

use super::{CacheError, CacheKey, CachedSnapshot, Snapshot};

/// Source of authoritative data for a cache key.
///
/// The query cache calls this on refresh and on the first `fetch` of a key.
#[async_trait]
pub trait QueryFetcher: Send + Sync + 'static {
    async fn fetch(&self, key: &CacheKey) -> Result<Vec<Reminder>, CacheError>;
}

/// The cache interface the toggle controller works against.
///
/// All writes are whole-snapshot replacements. Versions increase by one on
/// every write to a key and are used to detect intervening writes.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Current snapshot for `key`, or `None` if nothing was ever loaded.
    fn read(&self, key: &CacheKey) -> Result<Option<Snapshot>, CacheError> {
        Ok(self.read_versioned(key)?.map(|cached| cached.snapshot))
    }

    /// Current snapshot for `key` with its write version.
    fn read_versioned(&self, key: &CacheKey) -> Result<Option<CachedSnapshot>, CacheError>;

    /// Replace the snapshot for `key`. Returns the new version.
    fn write(&self, key: &CacheKey, snapshot: Snapshot) -> Result<u64, CacheError>;

    /// Replace the snapshot only if the key is still at `expected` version.
    ///
    /// Returns `false` (and writes nothing) when another write happened since.
    fn write_if_version(
        &self,
        key: &CacheKey,
        expected: u64,
        snapshot: Snapshot,
    ) -> Result<bool, CacheError>;

    /// Abort any background refresh of `key` and wait until it has stopped.
    async fn cancel_in_flight(&self, key: &CacheKey) -> Result<(), CacheError>;

    /// Mark `key` stale and schedule a fresh read from the source.
    fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError>;
}
