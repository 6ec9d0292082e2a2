use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::watch;

use crate::reminder::Reminder;

/// Last checked-state the backend agreed with, and the toggle that set it.
struct Baseline {
    sequence: u64,
    checked: bool,
}

/// Locally displayed state of one reminder row.
pub(crate) struct Display {
    checked: watch::Sender<bool>,
    /// Sequence of the most recent toggle issued for this row.
    latest: AtomicU64,
    baseline: Mutex<Baseline>,
}

impl Display {
    fn new(checked: bool) -> Self {
        let (sender, _) = watch::channel(checked);
        Self {
            checked: sender,
            latest: AtomicU64::new(0),
            baseline: Mutex::new(Baseline {
                sequence: 0,
                checked,
            }),
        }
    }

    // Baseline is two plain fields, a poisoned guard still holds a usable value.
    fn baseline(&self) -> MutexGuard<'_, Baseline> {
        self.baseline
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_checked(&self, checked: bool) {
        self.checked.send_replace(checked);
    }

    pub(crate) fn mark_issued(&self, sequence: u64) {
        self.latest.fetch_max(sequence, Ordering::SeqCst);
    }

    pub(crate) fn is_latest(&self, sequence: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == sequence
    }

    /// Record the state the backend stored for toggle `sequence`. Answers
    /// from earlier toggles never overwrite a later one's.
    pub(crate) fn confirm(&self, sequence: u64, checked: bool) {
        let mut baseline = self.baseline();
        if sequence >= baseline.sequence {
            baseline.sequence = sequence;
            baseline.checked = checked;
        }
    }

    /// Show the last confirmed state again.
    pub(crate) fn revert(&self) -> bool {
        let checked = self.baseline().checked;
        self.set_checked(checked);
        checked
    }
}

/// View model for a single reminder row: the reminder as loaded plus the
/// checked-state the row currently shows.
///
/// Clones share the displayed state. Once every clone is dropped, pending
/// toggles stop updating it.
#[derive(Clone)]
pub struct ReminderItem {
    reminder: Reminder,
    display: Arc<Display>,
}

impl ReminderItem {
    pub fn new(reminder: Reminder) -> Self {
        let display = Arc::new(Display::new(reminder.is_completed));
        Self { reminder, display }
    }

    /// The reminder as it was loaded into this row.
    pub fn reminder(&self) -> &Reminder {
        &self.reminder
    }

    /// The checked-state currently displayed.
    pub fn checked(&self) -> bool {
        *self.display.checked.borrow()
    }

    /// The checked-state last confirmed by the backend (or loaded, before any
    /// toggle was confirmed). A failed toggle reverts the row to this.
    pub fn confirmed(&self) -> bool {
        self.display.baseline().checked
    }

    /// Watch the displayed checked-state.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.display.checked.subscribe()
    }

    pub(crate) fn display(&self) -> Weak<Display> {
        Arc::downgrade(&self.display)
    }
}
