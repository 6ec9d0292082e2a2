//! QueryCache - in-memory `SnapshotCache` with background refreshes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;

use super::{CacheError, CacheKey, CachedSnapshot, QueryFetcher, Snapshot, SnapshotCache};

/// A running background refresh. Only the refresh whose id is still stored
/// on the entry when it finishes may write its result.
struct Refresh {
    id: u64,
    handle: JoinHandle<()>,
}

struct Entry {
    snapshot: Option<Snapshot>,
    version: u64,
    stale: bool,
    refresh: Option<Refresh>,
}

impl Default for Entry {
    // nothing loaded yet counts as stale
    fn default() -> Self {
        Self {
            snapshot: None,
            version: 0,
            stale: true,
            refresh: None,
        }
    }
}

struct Shared {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    fetcher: Arc<dyn QueryFetcher>,
    config: ClientConfig,
    next_refresh: AtomicU64,
    settled: Notify,
}

/// In-memory query cache keyed by [`CacheKey`].
///
/// Clone-friendly: clones share the same entries. Refreshes run as tokio
/// tasks, so `refresh`, `invalidate` (with `refetch_on_invalidate`) and
/// `cancel_in_flight` must be called from inside a runtime.
#[derive(Clone)]
pub struct QueryCache {
    shared: Arc<Shared>,
}

impl QueryCache {
    pub fn new<F: QueryFetcher>(fetcher: F, config: ClientConfig) -> Self {
        Self::with_fetcher(Arc::new(fetcher), config)
    }

    pub fn with_fetcher(fetcher: Arc<dyn QueryFetcher>, config: ClientConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                fetcher,
                config,
                next_refresh: AtomicU64::new(1),
                settled: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    /// Return the cached snapshot if it is fresh, otherwise load it from the
    /// fetcher, store it and return it.
    pub async fn fetch(&self, key: &CacheKey) -> Result<Snapshot, CacheError> {
        {
            let entries = self.shared.read_entries("fetch")?;
            if let Some(Entry {
                snapshot: Some(snapshot),
                stale: false,
                ..
            }) = entries.get(key)
            {
                return Ok(snapshot.clone());
            }
        }

        let snapshot = self.shared.load(key).await?;
        self.write(key, snapshot.clone())?;
        Ok(snapshot)
    }

    /// Start a background refresh of `key`, superseding any refresh already
    /// running for it.
    pub fn refresh(&self, key: &CacheKey) -> Result<(), CacheError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let id = self.shared.next_refresh.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.shared.write_entries("refresh")?;
        let entry = entries.entry(key.clone()).or_default();
        if let Some(previous) = entry.refresh.take() {
            debug!(%key, refresh = previous.id, "superseding in-flight refresh");
            previous.handle.abort();
        }

        let shared = Arc::clone(&self.shared);
        let task_key = key.clone();
        let handle = runtime.spawn(async move { shared.run_refresh(task_key, id).await });
        entry.refresh = Some(Refresh { id, handle });
        debug!(%key, refresh = id, "refresh started");
        Ok(())
    }

    pub fn is_stale(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let entries = self.shared.read_entries("is_stale")?;
        Ok(entries.get(key).map(|e| e.stale).unwrap_or(true))
    }

    pub fn refresh_in_flight(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let entries = self.shared.read_entries("refresh_in_flight")?;
        Ok(entries.get(key).map(|e| e.refresh.is_some()).unwrap_or(false))
    }

    /// Wait until no refresh is running for `key`.
    pub async fn settled(&self, key: &CacheKey) -> Result<(), CacheError> {
        loop {
            let notified = self.shared.settled.notified();
            if !self.refresh_in_flight(key)? {
                return Ok(());
            }
            notified.await;
        }
    }
}

impl Shared {
    fn read_entries(
        &self,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, HashMap<CacheKey, Entry>>, CacheError> {
        self.entries
            .read()
            .map_err(|_| CacheError::LockPoisoned(operation))
    }

    fn write_entries(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, HashMap<CacheKey, Entry>>, CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::LockPoisoned(operation))
    }

    async fn load(&self, key: &CacheKey) -> Result<Snapshot, CacheError> {
        let reminders = tokio::time::timeout(self.config.fetch_timeout(), self.fetcher.fetch(key))
            .await
            .map_err(|_| CacheError::Fetch(format!("fetch of {} timed out", key)))??;
        Snapshot::new(reminders)
    }

    async fn run_refresh(self: Arc<Self>, key: CacheKey, id: u64) {
        let loaded = self.load(&key).await;

        {
            let mut entries = match self.write_entries("refresh result") {
                Ok(entries) => entries,
                Err(e) => {
                    error!(%key, refresh = id, error = %e, "dropping refresh result");
                    return;
                }
            };
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };
            if entry.refresh.as_ref().map(|r| r.id) != Some(id) {
                debug!(%key, refresh = id, "refresh superseded, result discarded");
                return;
            }
            entry.refresh = None;

            match loaded {
                Ok(snapshot) => {
                    entry.snapshot = Some(snapshot);
                    entry.version += 1;
                    entry.stale = false;
                    debug!(%key, refresh = id, version = entry.version, "refresh stored");
                }
                Err(e) => warn!(%key, refresh = id, error = %e, "refresh failed, entry left stale"),
            }
        }

        self.settled.notify_waiters();
    }
}

#[async_trait]
impl SnapshotCache for QueryCache {
    fn read_versioned(&self, key: &CacheKey) -> Result<Option<CachedSnapshot>, CacheError> {
        let entries = self.shared.read_entries("read")?;
        Ok(entries.get(key).and_then(|entry| {
            entry.snapshot.as_ref().map(|snapshot| CachedSnapshot {
                snapshot: snapshot.clone(),
                version: entry.version,
            })
        }))
    }

    fn write(&self, key: &CacheKey, snapshot: Snapshot) -> Result<u64, CacheError> {
        let mut entries = self.shared.write_entries("write")?;
        let entry = entries.entry(key.clone()).or_default();
        entry.snapshot = Some(snapshot);
        entry.version += 1;
        entry.stale = false;
        debug!(%key, version = entry.version, "snapshot written");
        Ok(entry.version)
    }

    fn write_if_version(
        &self,
        key: &CacheKey,
        expected: u64,
        snapshot: Snapshot,
    ) -> Result<bool, CacheError> {
        let mut entries = self.shared.write_entries("write_if_version")?;
        let entry = entries.entry(key.clone()).or_default();
        if entry.version != expected {
            debug!(%key, expected, actual = entry.version, "conditional write skipped");
            return Ok(false);
        }
        entry.snapshot = Some(snapshot);
        entry.version += 1;
        debug!(%key, version = entry.version, "conditional write applied");
        Ok(true)
    }

    async fn cancel_in_flight(&self, key: &CacheKey) -> Result<(), CacheError> {
        let refresh = {
            let mut entries = self.shared.write_entries("cancel_in_flight")?;
            entries.get_mut(key).and_then(|entry| entry.refresh.take())
        };

        if let Some(refresh) = refresh {
            refresh.handle.abort();
            match refresh.handle.await {
                Ok(()) => debug!(%key, refresh = refresh.id, "refresh finished before cancel"),
                Err(e) if e.is_cancelled() => debug!(%key, refresh = refresh.id, "refresh cancelled"),
                Err(e) => warn!(%key, refresh = refresh.id, error = %e, "refresh task failed"),
            }
            self.shared.settled.notify_waiters();
        }
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        {
            let mut entries = self.shared.write_entries("invalidate")?;
            entries.entry(key.clone()).or_default().stale = true;
        }
        debug!(%key, "invalidated");

        if self.shared.config.refetch_on_invalidate {
            self.refresh(key)?;
        }
        Ok(())
    }
}
