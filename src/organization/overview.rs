use tracing::debug;

use crate::reminder::{Collection, Organization, OrganizationInfo, Reminder};

use super::{DirectoryError, OrganizationDirectory};

/// A resolved organization with its collections, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationOverview {
    info: OrganizationInfo,
}

impl OrganizationOverview {
    /// Resolve `org_id`. Returns `Ok(None)` when the organization is unknown.
    pub async fn load<D>(directory: &D, org_id: &str) -> Result<Option<Self>, DirectoryError>
    where
        D: OrganizationDirectory + ?Sized,
    {
        let info = directory.organization_info(org_id).await?;
        if info.is_none() {
            debug!(org_id, "organization not found");
        }
        Ok(info.map(|info| Self { info }))
    }

    /// Page title: the organization's name.
    pub fn title(&self) -> &str {
        &self.info.organization.name
    }

    pub fn organization(&self) -> &Organization {
        &self.info.organization
    }

    pub fn organization_id(&self) -> &str {
        &self.info.organization.id
    }

    pub fn collections(&self) -> &[Collection] {
        &self.info.collections
    }

    /// True when the organization has no collections yet.
    pub fn is_empty(&self) -> bool {
        self.info.collections.is_empty()
    }

    /// Every reminder, collection by collection, in display order.
    pub fn all_reminders(&self) -> impl Iterator<Item = &Reminder> {
        self.info
            .collections
            .iter()
            .flat_map(|collection| collection.reminders.iter())
    }

    pub fn into_info(self) -> OrganizationInfo {
        self.info
    }
}

/// Title for the organization page, or `None` when the organization is unknown.
pub async fn page_title<D>(directory: &D, org_id: &str) -> Result<Option<String>, DirectoryError>
where
    D: OrganizationDirectory + ?Sized,
{
    Ok(OrganizationOverview::load(directory, org_id)
        .await?
        .map(|overview| overview.title().to_string()))
}
