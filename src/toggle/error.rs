use std::fmt;

use crate::reminder::ReminderId;

/// A toggle was refused before it started.
///
/// Nothing was written and no persistence call was made. Once a toggle has
/// started, failures are absorbed by rollback and never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    /// The reminder has an empty id.
    EmptyId,
    /// The reminder's owner is not known, so the update cannot be addressed.
    MissingOwner(ReminderId),
}

impl fmt::Display for ToggleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleError::EmptyId => write!(f, "cannot toggle a reminder without an id"),
            ToggleError::MissingOwner(id) => {
                write!(f, "cannot toggle reminder {}: owner is not loaded", id)
            }
        }
    }
}

impl std::error::Error for ToggleError {}
