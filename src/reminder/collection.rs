use serde::{Deserialize, Serialize};

use super::Reminder;

/// An organization that owns collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// A named group of reminders inside an organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub organization_id: String,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// An organization together with its collections, each carrying its reminders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    pub organization: Organization,
    #[serde(default)]
    pub collections: Vec<Collection>,
}
