use std::fmt;

use crate::reminder::{OwnerId, ReminderId};

/// The persistence call did not succeed.
///
/// Variants only exist for diagnostics; callers of the endpoint are expected
/// to treat every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationFailed {
    /// No reminder with this id exists.
    NotFound(ReminderId),
    /// The caller is not the reminder's owner.
    Forbidden { id: ReminderId, owner: OwnerId },
    /// The backend refused the request as invalid.
    Rejected(String),
    /// The backend is temporarily unable to serve the request.
    Unavailable(String),
    /// The request never reached the backend or the reply was unreadable.
    Transport(String),
}

impl fmt::Display for MutationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationFailed::NotFound(id) => write!(f, "reminder not found: {}", id),
            MutationFailed::Forbidden { id, owner } => {
                write!(f, "reminder {} is not owned by {}", id, owner)
            }
            MutationFailed::Rejected(msg) => write!(f, "mutation rejected: {}", msg),
            MutationFailed::Unavailable(msg) => write!(f, "backend unavailable: {}", msg),
            MutationFailed::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for MutationFailed {}

impl MutationFailed {
    /// HTTP-style status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            MutationFailed::NotFound(_) => 404,
            MutationFailed::Forbidden { .. } => 403,
            MutationFailed::Rejected(_) => 422,
            MutationFailed::Unavailable(_) => 503,
            MutationFailed::Transport(_) => 502,
        }
    }
}
