use std::sync::Arc;

use reminders::{ClientConfig, ReminderItem, SnapshotCache, ToggleController};

use crate::support::{key, loaded_cache, no_refetch, seeded_store, status_of, CacheEvent, RecordingCache};

async fn recording(
    config: ClientConfig,
) -> (
    reminders::ReminderStore,
    Arc<RecordingCache>,
    ToggleController<RecordingCache, reminders::ReminderStore>,
) {
    let store = seeded_store();
    let cache = Arc::new(RecordingCache::new(loaded_cache(&store, config.clone()).await));
    let controller = ToggleController::new(cache.clone(), Arc::new(store.clone()), &config);
    (store, cache, controller)
}

#[tokio::test]
async fn success_invalidates_once_after_reconciliation() {
    let (store, cache, controller) = recording(no_refetch()).await;
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());

    controller.toggle(&row, true).unwrap().await;

    let events = cache.events();
    assert_eq!(cache.invalidations(), 1);
    assert_eq!(events.last(), Some(&CacheEvent::Invalidate));
    assert_eq!(events[0], CacheEvent::Cancel);
    assert_eq!(events[1], CacheEvent::Read);
    assert!(matches!(events[2], CacheEvent::Write(_)));
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn failure_invalidates_once_after_rollback() {
    let (store, cache, controller) = recording(no_refetch()).await;
    store.fail_next(1, "offline");
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());

    controller.toggle(&row, true).unwrap().await;

    let events = cache.events();
    assert_eq!(cache.invalidations(), 1);
    let rollback = events
        .iter()
        .position(|e| matches!(e, CacheEvent::WriteIfVersion { applied: true }))
        .expect("rollback write");
    let invalidate = events
        .iter()
        .position(|e| matches!(e, CacheEvent::Invalidate))
        .unwrap();
    assert!(rollback < invalidate);
    assert_eq!(invalidate, events.len() - 1);
}

#[tokio::test]
async fn invalidation_marks_key_stale() {
    let (store, cache, controller) = recording(no_refetch()).await;
    let row = ReminderItem::new(store.reminder("b").unwrap().unwrap());
    assert!(!cache.inner().is_stale(&key()).unwrap());

    controller.toggle(&row, true).unwrap().await;

    assert!(cache.inner().is_stale(&key()).unwrap());
}

#[tokio::test]
async fn refetch_brings_back_authoritative_state() {
    let (store, cache, controller) = recording(ClientConfig::default()).await;
    let row = ReminderItem::new(store.reminder("c").unwrap().unwrap());

    // a change made elsewhere that the cached list does not know about yet
    store
        .insert(store.reminder("b").unwrap().unwrap().completed(true))
        .unwrap();

    controller.toggle(&row, true).unwrap().await;
    cache.inner().settled(&key()).await.unwrap();

    let current = cache.read(&key()).unwrap().unwrap();
    assert!(status_of(&current, "c"));
    assert!(status_of(&current, "b"));
    assert!(!cache.inner().is_stale(&key()).unwrap());
}

#[tokio::test]
async fn refetch_after_failure_matches_backend() {
    let (store, cache, controller) = recording(ClientConfig::default()).await;
    store.fail_next(1, "offline");
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());

    let report = controller.toggle(&row, true).unwrap().await;
    assert!(report.is_rolled_back());
    cache.inner().settled(&key()).await.unwrap();

    let current = cache.read(&key()).unwrap().unwrap();
    assert!(!status_of(&current, "a"));
    assert_eq!(current.to_vec(), store.reminders().unwrap());
}
