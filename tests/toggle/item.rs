use std::sync::Arc;

use reminders::{ReminderItem, ToggleController};

use crate::support::{gated, loaded_cache, no_refetch, seeded_store};

#[tokio::test]
async fn subscribers_see_optimistic_value_then_confirmation() {
    let (store, _cache, controller, mut calls) = gated(no_refetch()).await;
    let row = ReminderItem::new(store.reminder("a").unwrap().unwrap());
    let mut shown = row.subscribe();

    let handle = controller.spawn_toggle(&row, true).unwrap();
    let call = calls.recv().await.unwrap();
    shown.changed().await.unwrap();
    assert!(*shown.borrow());

    call.pass();
    handle.await.unwrap();
    assert!(row.checked());
}

#[tokio::test]
async fn clones_of_a_row_share_displayed_state() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache, Arc::new(store.clone()), &no_refetch());
    let row = ReminderItem::new(store.reminder("b").unwrap().unwrap());
    let mirror = row.clone();

    controller.toggle(&row, true).unwrap().await;

    assert!(mirror.checked());
}

#[tokio::test]
async fn rapid_retoggles_show_the_last_choice() {
    let store = seeded_store();
    let cache = Arc::new(loaded_cache(&store, no_refetch()).await);
    let controller = ToggleController::new(cache, Arc::new(store.clone()), &no_refetch());
    let row = ReminderItem::new(store.reminder("c").unwrap().unwrap());

    let toggles = vec![
        controller.spawn_toggle(&row, true).unwrap(),
        controller.spawn_toggle(&row, false).unwrap(),
        controller.spawn_toggle(&row, true).unwrap(),
    ];
    for handle in toggles {
        assert!(handle.await.unwrap().is_confirmed());
    }

    assert!(row.checked());
}
