//! Optimistic toggle of a reminder's completion flag.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reminders::{ClientConfig, QueryCache, ReminderItem, ReminderStore, ToggleController};
//!
//! let store = ReminderStore::new();
//! let config = ClientConfig::default();
//! let cache = Arc::new(QueryCache::new(store.clone(), config.clone()));
//! let controller = ToggleController::new(cache, Arc::new(store), &config);
//!
//! let item = ReminderItem::new(reminder);
//! let report = controller.toggle(&item, true)?.await;
//! assert!(report.is_confirmed() || report.is_rolled_back());
//! ```
//!
//! ## Overlapping toggles
//!
//! Each toggle rolls back to the snapshot it captured itself, and only if no
//! other write reached the cache key after its optimistic write. When a later
//! toggle (or refresh) has written the key, the failed toggle leaves the cache
//! alone and the refetch triggered by its invalidation settles the final
//! state: last write wins, then the backend has the final word.
//!
//! A failed toggle shows the row's last confirmed state again, provided no
//! later toggle of that row was issued. Ordering only applies within one
//! reminder; toggles of different reminders proceed independently.

mod controller;
mod error;
mod item;
mod order;
mod state;

pub use controller::ToggleController;
pub use error::ToggleError;
pub use item::ReminderItem;
pub use state::{Rollback, ToggleOutcome, ToggleReport, ToggleState};
