//! Toggle a reminder against an in-memory backend, once successfully and once
//! with the backend failing.
//!
//! ```text
//! RUST_LOG=reminders=debug cargo run --example toggle
//! ```

use std::sync::Arc;

use reminders::{
    ClientConfig, Collection, Organization, OrganizationOverview, QueryCache, Reminder,
    ReminderItem, ReminderStore, SnapshotCache, ToggleController, ToggleOutcome, ToggleReport,
};
use tracing_subscriber::EnvFilter;

fn seed() -> Result<ReminderStore, Box<dyn std::error::Error>> {
    let store = ReminderStore::new();
    store.add_organization(Organization {
        id: "acme".into(),
        name: "Acme Corp".into(),
    })?;
    store.add_collection(Collection {
        id: "home".into(),
        name: "Home".into(),
        organization_id: "acme".into(),
        reminders: vec![
            Reminder::new("milk", "Buy milk").owned_by("ada"),
            Reminder::new("plumber", "Call the plumber").owned_by("ada"),
        ],
    })?;
    Ok(store)
}

fn describe(report: &ToggleReport) {
    match &report.outcome {
        ToggleOutcome::Confirmed(stored) => {
            println!("  #{} confirmed: {} -> {}", report.sequence, stored.id, stored.is_completed)
        }
        ToggleOutcome::RolledBack {
            error,
            rollback,
            display_reset,
        } => println!(
            "  #{} rolled back ({:?}, display reset: {}): {}",
            report.sequence, rollback, display_reset, error
        ),
    }
    println!("  states: {:?}", report.transitions);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reminders=info")),
        )
        .init();

    let store = seed()?;
    let config = ClientConfig::default();
    let key = config.reminders_key();

    let overview = OrganizationOverview::load(&store, "acme")
        .await?
        .ok_or("organization missing")?;
    println!("== {} ==", overview.title());
    for collection in overview.collections() {
        println!("{} ({} reminders)", collection.name, collection.reminders.len());
    }

    let cache = Arc::new(QueryCache::new(store.clone(), config.clone()));
    let snapshot = cache.fetch(&key).await?;
    let controller = ToggleController::new(cache.clone(), Arc::new(store.clone()), &config);

    let milk = ReminderItem::new(snapshot.get(&"milk".into()).ok_or("milk missing")?.clone());
    println!("\ntoggling 'milk' on");
    let report = controller.toggle(&milk, true)?.await;
    describe(&report);
    cache.settled(&key).await?;

    store.fail_next(1, "database offline");
    let plumber = ReminderItem::new(
        snapshot
            .get(&"plumber".into())
            .ok_or("plumber missing")?
            .clone(),
    );
    println!("\ntoggling 'plumber' on while the backend is down");
    let report = controller.toggle(&plumber, true)?.await;
    describe(&report);
    cache.settled(&key).await?;

    println!("\ncached list:");
    if let Some(current) = cache.read(&key)? {
        for reminder in &current {
            let mark = if reminder.is_completed { "x" } else { " " };
            println!("  [{}] {}", mark, reminder.title);
        }
    }
    Ok(())
}
