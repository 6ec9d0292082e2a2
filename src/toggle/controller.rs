//! ToggleController - optimistic completion toggling.
//!
//! A toggle runs in three phases:
//!
//! 1. **Optimistic** (in issuance order): cancel any background refresh of the
//!    cache key, capture the current snapshot, write a copy with the target
//!    reminder's flag flipped, and show the new checked-state.
//! 2. **Execution**: call the persistence endpoint. This is the only point
//!    where the operation waits on the backend.
//! 3. **Reconciliation**: on success, record the stored state as the row's
//!    confirmed state. On failure, put the captured snapshot back (unless a
//!    later write superseded ours) and show the row's last confirmed state
//!    again. Then, always, invalidate the cache key exactly once.
//!
//! Issuance order only binds toggles of the same reminder; toggles of
//! different reminders run their phases independently.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::cache::{CacheKey, CachedSnapshot, SnapshotCache};
use crate::config::ClientConfig;
use crate::endpoint::{MutationFailed, PersistenceEndpoint};
use crate::reminder::{Reminder, UpdateStatusRequest};

use super::item::{Display, ReminderItem};
use super::order::{IssueOrder, Ticket};
use super::{Rollback, ToggleError, ToggleOutcome, ToggleReport, ToggleState};

/// Context captured by the optimistic phase and consumed by reconciliation.
struct PendingMutation {
    /// Snapshot (and version) read just before the optimistic write.
    previous: Option<CachedSnapshot>,
    /// Version produced by the optimistic write, if one was made.
    optimistic_version: Option<u64>,
}

/// Everything a running toggle needs, owned so it can outlive the row.
struct ToggleTarget {
    reminder: Reminder,
    request: UpdateStatusRequest,
    display: Weak<Display>,
}

/// Optimistically toggles reminder completion against a shared cache.
///
/// Cloning is cheap; clones share the cache, endpoint and issuance order.
pub struct ToggleController<C: ?Sized, E: ?Sized> {
    cache: Arc<C>,
    endpoint: Arc<E>,
    key: CacheKey,
    order: Arc<IssueOrder>,
    /// Held across read, derive and write of the optimistic snapshot so
    /// concurrent toggles of different reminders never drop each other's change.
    snapshot_write: Arc<Mutex<()>>,
}

impl<C: ?Sized, E: ?Sized> Clone for ToggleController<C, E> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            endpoint: Arc::clone(&self.endpoint),
            key: self.key.clone(),
            order: Arc::clone(&self.order),
            snapshot_write: Arc::clone(&self.snapshot_write),
        }
    }
}

impl<C, E> ToggleController<C, E>
where
    C: SnapshotCache + ?Sized + 'static,
    E: PersistenceEndpoint + ?Sized,
{
    /// Controller for the reminder list under the configured key.
    pub fn new(cache: Arc<C>, endpoint: Arc<E>, config: &ClientConfig) -> Self {
        Self::with_key(cache, endpoint, config.reminders_key())
    }

    pub fn with_key(cache: Arc<C>, endpoint: Arc<E>, key: CacheKey) -> Self {
        Self {
            cache,
            endpoint,
            key,
            order: Arc::new(IssueOrder::new()),
            snapshot_write: Arc::new(Mutex::new(())),
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Issue a toggle of `item` to `new_status`.
    ///
    /// The toggle takes its place in the issuance order immediately; the
    /// returned future runs all three phases. It resolves to a report and
    /// never fails: backend errors are handled by rolling back. An `Err` here
    /// means the preconditions did not hold and nothing was started.
    ///
    /// Later toggles of the same reminder wait for this one's optimistic
    /// phase, so the future must be awaited or spawned (or dropped) rather
    /// than parked. Toggles of other reminders are not held up.
    pub fn toggle(
        &self,
        item: &ReminderItem,
        new_status: bool,
    ) -> Result<impl Future<Output = ToggleReport> + Send + 'static, ToggleError> {
        let reminder = item.reminder();
        if reminder.id.is_empty() {
            return Err(ToggleError::EmptyId);
        }
        let owner = reminder
            .created_by
            .clone()
            .ok_or_else(|| ToggleError::MissingOwner(reminder.id.clone()))?;

        let ticket = self.order.issue(&reminder.id);
        let display = item.display();
        if let Some(display) = display.upgrade() {
            display.mark_issued(ticket.sequence());
        }

        let target = ToggleTarget {
            request: UpdateStatusRequest {
                id: reminder.id.clone(),
                created_by: owner,
                is_completed: new_status,
            },
            reminder: reminder.clone(),
            display,
        };

        let span = info_span!(
            "toggle",
            reminder_id = %target.reminder.id,
            status = new_status,
            sequence = ticket.sequence(),
        );
        let controller = self.clone();
        Ok(async move { controller.run(ticket, target).await }.instrument(span))
    }

    /// Issue a toggle and run it on its own task.
    ///
    /// Reconciliation still runs if the row is dropped before the backend answers.
    pub fn spawn_toggle(
        &self,
        item: &ReminderItem,
        new_status: bool,
    ) -> Result<JoinHandle<ToggleReport>, ToggleError> {
        Ok(tokio::spawn(self.toggle(item, new_status)?))
    }

    async fn run(self, ticket: Ticket, target: ToggleTarget) -> ToggleReport {
        let sequence = ticket.sequence();
        let mut transitions = vec![ToggleState::Idle];

        ticket.turn().await;
        let pending = self.apply_optimistic(&target).await;
        ticket.finish();
        transitions.push(ToggleState::OptimisticallyApplied);

        let result = self.endpoint.update_status(target.request.clone()).await;

        let outcome = match result {
            Ok(stored) => {
                info!(status = stored.is_completed, "toggle confirmed");
                if let Some(display) = target.display.upgrade() {
                    display.confirm(sequence, stored.is_completed);
                }
                transitions.push(ToggleState::Confirmed);
                ToggleOutcome::Confirmed(stored)
            }
            Err(error) => {
                warn!(%error, "toggle failed, rolling back");
                let outcome = self.roll_back(pending, &target, sequence, error);
                transitions.push(ToggleState::RolledBack);
                outcome
            }
        };

        match self.cache.invalidate(&self.key) {
            Ok(()) => debug!(key = %self.key, "invalidation scheduled"),
            Err(e) => error!(key = %self.key, error = %e, "invalidation failed"),
        }
        transitions.push(ToggleState::Invalidated);

        ToggleReport {
            sequence,
            outcome,
            transitions,
        }
    }

    async fn apply_optimistic(&self, target: &ToggleTarget) -> PendingMutation {
        if let Err(e) = self.cache.cancel_in_flight(&self.key).await {
            warn!(key = %self.key, error = %e, "could not cancel in-flight refresh");
        }

        let (previous, optimistic_version) = self.write_optimistic(target);

        if let Some(display) = target.display.upgrade() {
            display.set_checked(target.request.is_completed);
        }

        PendingMutation {
            previous,
            optimistic_version,
        }
    }

    /// Read, derive and write the optimistic snapshot as one step.
    fn write_optimistic(&self, target: &ToggleTarget) -> (Option<CachedSnapshot>, Option<u64>) {
        let _guard = self
            .snapshot_write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = match self.cache.read_versioned(&self.key) {
            Ok(previous) => previous,
            Err(e) => {
                error!(key = %self.key, error = %e, "could not read snapshot, skipping optimistic write");
                None
            }
        };

        let optimistic_version = match &previous {
            Some(cached) => {
                let derived = cached
                    .snapshot
                    .with_status(&target.reminder.id, target.request.is_completed);
                match self.cache.write(&self.key, derived) {
                    Ok(version) => Some(version),
                    Err(e) => {
                        error!(key = %self.key, error = %e, "optimistic write failed");
                        None
                    }
                }
            }
            None => {
                debug!(key = %self.key, "nothing cached, only the row is updated");
                None
            }
        };

        (previous, optimistic_version)
    }

    fn roll_back(
        &self,
        pending: PendingMutation,
        target: &ToggleTarget,
        sequence: u64,
        error: MutationFailed,
    ) -> ToggleOutcome {
        let rollback = match (pending.previous, pending.optimistic_version) {
            (Some(previous), Some(version)) => {
                match self
                    .cache
                    .write_if_version(&self.key, version, previous.snapshot)
                {
                    Ok(true) => Rollback::Restored,
                    Ok(false) => {
                        debug!(key = %self.key, "rollback superseded by a later write");
                        Rollback::Superseded
                    }
                    Err(e) => {
                        error!(key = %self.key, error = %e, "rollback write failed");
                        Rollback::Superseded
                    }
                }
            }
            _ => Rollback::NothingApplied,
        };

        let display_reset = match target.display.upgrade() {
            Some(display) if display.is_latest(sequence) => {
                let shown = display.revert();
                debug!(checked = shown, "row reverted to last confirmed state");
                true
            }
            _ => false,
        };

        ToggleOutcome::RolledBack {
            error,
            rollback,
            display_reset,
        }
    }
}
