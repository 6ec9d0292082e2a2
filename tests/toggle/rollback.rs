use std::sync::Arc;

use reminders::{
    MutationFailed, ReminderItem, Rollback, SnapshotCache, ToggleController, ToggleOutcome,
    ToggleState,
};

use crate::support::{gated, ids, key, loaded_cache, no_refetch, seeded_store, status_of};

#[tokio::test]
async fn failure_restores_captured_snapshot_exactly() {
    let (store, cache, controller, mut calls) = gated(no_refetch()).await;
    let before = cache.read(&key()).unwrap().unwrap();
    let row = ReminderItem::new(store.reminder("b").unwrap().unwrap());

    let handle = controller.spawn_toggle(&row, true).unwrap();
    calls.recv().await.unwrap().fail("database offline");
    let report = handle.await.unwrap();

    let after = cache.read(&key()).unwrap().unwrap();
    assert_eq!(after, before);
    assert!(after.same_as(&before));
    assert_eq!(ids(&after), ids(&before));

    match report.outcome {
        ToggleOutcome::RolledBack {
            error,
            rollback,
            display_reset,
        } => {
            assert_eq!(error, MutationFailed::Unavailable("database offline".into()));
            assert_eq!(rollback, Rollback::Restored);
            assert!(display_reset);
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(
        report.transitions,
        vec![
            ToggleState::Idle,
            ToggleState::OptimisticallyApplied,
            ToggleState::RolledBack,
            ToggleState::Invalidated,
        ]
    );
}

#[tokio::test]
async fn failure_resets_displayed_state() {
    let (store, cache, controller, mut calls) = gated(no_refetch()).await;
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());
    let mut shown = row.subscribe();

    let handle = controller.spawn_toggle(&row, true).unwrap();
    let call = calls.recv().await.unwrap();
    assert!(*shown.borrow_and_update());

    call.fail("timeout");
    handle.await.unwrap();

    assert!(!*shown.borrow_and_update());
    assert!(!row.checked());
    assert!(!status_of(&cache.read(&key()).unwrap().unwrap(), "a"));
}

#[tokio::test]
async fn failure_is_never_an_error_for_the_caller() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache.clone(), Arc::new(store.clone()), &no_refetch());
    store.fail_next(1, "maintenance window");

    let row = ReminderItem::new(store.reminder("c").unwrap().unwrap());
    let report = controller.toggle(&row, true).unwrap().await;

    assert!(report.is_rolled_back());
    assert_eq!(report.state(), ToggleState::Invalidated);
    assert!(!store.reminder("c").unwrap().unwrap().is_completed);
}

#[tokio::test]
async fn no_automatic_retry_after_failure() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache, Arc::new(store.clone()), &no_refetch());
    store.fail_next(1, "flaky");

    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());
    controller.toggle(&row, true).unwrap().await;
    assert_eq!(store.update_calls(), 1);

    // the user toggles again
    let report = controller.toggle(&row, true).unwrap().await;
    assert!(report.is_confirmed());
    assert_eq!(store.update_calls(), 2);
}

#[tokio::test]
async fn backend_rejection_rolls_back_like_any_failure() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache.clone(), Arc::new(store.clone()), &no_refetch());
    let before = cache.read(&key()).unwrap().unwrap();

    // the row claims another owner, so the backend refuses the update
    let mut stolen = store.reminder("a").unwrap().unwrap();
    stolen.created_by = Some("someone-else".into());
    let report = controller
        .toggle(&ReminderItem::new(stolen), true)
        .unwrap()
        .await;

    match report.outcome {
        ToggleOutcome::RolledBack { error, rollback, .. } => {
            assert!(matches!(error, MutationFailed::Forbidden { .. }));
            assert_eq!(rollback, Rollback::Restored);
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(cache.read(&key()).unwrap().unwrap(), before);
}

#[tokio::test]
async fn dropped_row_still_reconciles_cache() {
    let (store, cache, controller, mut calls) = gated(no_refetch()).await;
    let before = cache.read(&key()).unwrap().unwrap();
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());

    let handle = controller.spawn_toggle(&row, true).unwrap();
    let call = calls.recv().await.unwrap();
    drop(row);

    call.fail("gone");
    let report = handle.await.unwrap();

    match report.outcome {
        ToggleOutcome::RolledBack {
            rollback,
            display_reset,
            ..
        } => {
            assert_eq!(rollback, Rollback::Restored);
            assert!(!display_reset);
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(cache.read(&key()).unwrap().unwrap(), before);
}

#[tokio::test]
async fn failure_after_confirmed_toggle_reverts_to_confirmed_state() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache.clone(), Arc::new(store.clone()), &no_refetch());
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());

    assert!(controller.toggle(&row, true).unwrap().await.is_confirmed());
    assert!(row.checked());
    assert!(row.confirmed());

    store.fail_next(1, "offline");
    let report = controller.toggle(&row, false).unwrap().await;

    assert!(report.is_rolled_back());
    assert!(row.checked());
    assert!(status_of(&cache.read(&key()).unwrap().unwrap(), "a"));
    assert!(store.reminder("a").unwrap().unwrap().is_completed);
}
