use std::collections::HashSet;
use std::sync::Arc;

use crate::reminder::{Reminder, ReminderId};

use super::CacheError;

/// An immutable, ordered list of reminders with at most one entry per id.
///
/// Clones share the same allocation. Equality compares contents; use
/// [`Snapshot::same_as`] to ask whether two handles are the same write.
#[derive(Clone, Debug)]
pub struct Snapshot {
    reminders: Arc<[Reminder]>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate reminder ids.
    pub fn new(reminders: Vec<Reminder>) -> Result<Self, CacheError> {
        let mut seen = HashSet::with_capacity(reminders.len());
        for reminder in &reminders {
            if !seen.insert(&reminder.id) {
                return Err(CacheError::DuplicateReminder(reminder.id.clone()));
            }
        }
        Ok(Self {
            reminders: reminders.into(),
        })
    }

    pub fn empty() -> Self {
        Self {
            reminders: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reminder> {
        self.reminders.iter()
    }

    pub fn get(&self, id: &ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| &r.id == id)
    }

    /// Derive a new snapshot where the reminder `id` has `is_completed = status`.
    ///
    /// Order and every other entry are preserved. If `id` is not present the
    /// result has the same contents as `self`.
    pub fn with_status(&self, id: &ReminderId, status: bool) -> Snapshot {
        let reminders: Vec<Reminder> = self
            .reminders
            .iter()
            .map(|r| {
                if &r.id == id {
                    r.with_completed(status)
                } else {
                    r.clone()
                }
            })
            .collect();
        Snapshot {
            reminders: reminders.into(),
        }
    }

    /// True when both handles point at the same stored list.
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.reminders, &other.reminders)
    }

    pub fn to_vec(&self) -> Vec<Reminder> {
        self.reminders.to_vec()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.reminders == other.reminders
    }
}

impl Eq for Snapshot {}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Reminder;
    type IntoIter = std::slice::Iter<'a, Reminder>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A snapshot together with the per-key write version it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedSnapshot {
    pub snapshot: Snapshot,
    pub version: u64,
}
