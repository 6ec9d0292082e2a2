//! Optimistic toggle integration tests.
//!
//! - Optimistic write is visible before the backend answers
//! - Failure restores the captured snapshot exactly
//! - Exactly one invalidation, always after reconciliation
//! - Overlapping toggles: last write wins, the refetch settles the rest
//! - Preconditions and the displayed checked-state

mod rollback;
mod invalidation;
mod item;
