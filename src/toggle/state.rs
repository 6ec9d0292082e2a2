use crate::endpoint::MutationFailed;
use crate::reminder::Reminder;

/// Lifecycle of one toggle operation.
///
/// `Idle -> OptimisticallyApplied -> {Confirmed | RolledBack} -> Invalidated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Idle,
    OptimisticallyApplied,
    Confirmed,
    RolledBack,
    Invalidated,
}

/// What happened to the cache when a failed toggle tried to roll back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollback {
    /// The snapshot captured before the optimistic write was put back.
    Restored,
    /// Another write landed on the key after ours; the captured snapshot was
    /// not applied and the invalidation refetch decides the final state.
    Superseded,
    /// No optimistic write was made (nothing was cached for the key).
    NothingApplied,
}

/// How the persistence call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The backend accepted the change and returned the stored reminder.
    Confirmed(Reminder),
    /// The backend call failed and the optimistic change was reverted.
    RolledBack {
        error: MutationFailed,
        rollback: Rollback,
        /// Whether the displayed checked-state was reset. It is left alone
        /// when a later toggle of the same item was issued.
        display_reset: bool,
    },
}

/// Result of a settled toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleReport {
    /// Issuance order of this toggle within its controller, starting at 1.
    pub sequence: u64,
    pub outcome: ToggleOutcome,
    /// States entered, in order, starting with `Idle`.
    pub transitions: Vec<ToggleState>,
}

impl ToggleReport {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.outcome, ToggleOutcome::Confirmed(_))
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self.outcome, ToggleOutcome::RolledBack { .. })
    }

    /// The last state entered.
    pub fn state(&self) -> ToggleState {
        self.transitions.last().copied().unwrap_or(ToggleState::Idle)
    }
}
