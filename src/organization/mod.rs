//! Organization overview - the collections page data path.
//!
//! Resolves an organization by id through an [`OrganizationDirectory`] and
//! exposes what a collections page needs: the title, the collections with
//! their reminders, and whether the empty state applies. Unknown
//! organizations resolve to `None`; where to send the user is the caller's
//! decision.

mod overview;

use std::fmt;

use async_trait::async_trait;

use crate::endpoint::MutationFailed;
use crate::reminder::OrganizationInfo;

pub use overview::{page_title, OrganizationOverview};

/// Error type for organization lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    LockPoisoned(&'static str),
    Unavailable(String),
    /// Writing the collection's reminders into the backing store failed.
    Store(MutationFailed),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::LockPoisoned(operation) => {
                write!(f, "directory lock poisoned during {}", operation)
            }
            DirectoryError::Unavailable(msg) => write!(f, "directory unavailable: {}", msg),
            DirectoryError::Store(err) => write!(f, "directory store error: {}", err),
        }
    }
}

impl std::error::Error for DirectoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectoryError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MutationFailed> for DirectoryError {
    fn from(err: MutationFailed) -> Self {
        DirectoryError::Store(err)
    }
}

/// Data-fetching collaborator for organization pages.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// The organization and its collections, or `None` if it does not exist.
    async fn organization_info(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationInfo>, DirectoryError>;
}
