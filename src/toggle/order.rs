//! Issuance order for the optimistic phase.
//!
//! Tickets are numbered when a toggle is issued. A ticket may run its
//! optimistic write only once every lower-numbered ticket for the same
//! reminder has finished its own or been dropped, so optimistic writes on one
//! reminder land in issuance order even when toggles are spawned onto
//! different tasks. Toggles on different reminders never wait on each other.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::reminder::ReminderId;

struct Lanes {
    issued: u64,
    /// Unfinished tickets, per reminder.
    pending: HashMap<ReminderId, BTreeSet<u64>>,
}

pub(crate) struct IssueOrder {
    lanes: Mutex<Lanes>,
    advanced: Notify,
}

impl IssueOrder {
    pub(crate) fn new() -> Self {
        Self {
            lanes: Mutex::new(Lanes {
                issued: 0,
                pending: HashMap::new(),
            }),
            advanced: Notify::new(),
        }
    }

    // A panic while holding this lock cannot leave `Lanes` half-updated.
    fn lanes(&self) -> MutexGuard<'_, Lanes> {
        self.lanes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn issue(self: &Arc<Self>, id: &ReminderId) -> Ticket {
        let mut lanes = self.lanes();
        lanes.issued += 1;
        let sequence = lanes.issued;
        lanes.pending.entry(id.clone()).or_default().insert(sequence);
        Ticket {
            sequence,
            id: id.clone(),
            order: Arc::clone(self),
            finished: false,
        }
    }

    fn is_turn(&self, id: &ReminderId, sequence: u64) -> bool {
        self.lanes()
            .pending
            .get(id)
            .and_then(|lane| lane.first())
            == Some(&sequence)
    }

    fn finish(&self, id: &ReminderId, sequence: u64) {
        {
            let mut lanes = self.lanes();
            if let Some(lane) = lanes.pending.get_mut(id) {
                lane.remove(&sequence);
                if lane.is_empty() {
                    lanes.pending.remove(id);
                }
            }
        }
        self.advanced.notify_waiters();
    }
}

/// A place in one reminder's issuance order. Dropping an unfinished ticket
/// gives up its turn.
pub(crate) struct Ticket {
    sequence: u64,
    id: ReminderId,
    order: Arc<IssueOrder>,
    finished: bool,
}

impl Ticket {
    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Wait until every earlier ticket for the same reminder is done.
    pub(crate) async fn turn(&self) {
        loop {
            let advanced = self.order.advanced.notified();
            if self.order.is_turn(&self.id, self.sequence) {
                return;
            }
            advanced.await;
        }
    }

    /// Let the next ticket through.
    pub(crate) fn finish(mut self) {
        self.finished = true;
        self.order.finish(&self.id, self.sequence);
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if !self.finished {
            self.order.finish(&self.id, self.sequence);
        }
    }
}
