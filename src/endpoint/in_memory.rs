//! ReminderStore - in-memory reminder backend for tests, demos and the HTTP server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheKey, QueryFetcher};
use crate::organization::{DirectoryError, OrganizationDirectory};
use crate::reminder::{Collection, Organization, OrganizationInfo, Reminder, UpdateStatusRequest};

use super::{MutationFailed, PersistenceEndpoint};

#[derive(Default)]
struct Tables {
    organizations: Vec<Organization>,
    collections: Vec<Collection>,
    reminders: Vec<Reminder>,
}

/// Authoritative in-memory store of organizations, collections and reminders.
///
/// Reminders keep insertion order. Clone-friendly via Arc: clones share the
/// same tables, failure queue and counters.
#[derive(Clone, Default)]
pub struct ReminderStore {
    tables: Arc<RwLock<Tables>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    updates: Arc<AtomicUsize>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organization(&self, organization: Organization) -> Result<(), DirectoryError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| DirectoryError::LockPoisoned("add organization"))?;
        tables.organizations.retain(|o| o.id != organization.id);
        tables.organizations.push(organization);
        Ok(())
    }

    /// Register a collection. Reminders carried on it are inserted too.
    pub fn add_collection(&self, mut collection: Collection) -> Result<(), DirectoryError> {
        let reminders = std::mem::take(&mut collection.reminders);
        {
            let mut tables = self
                .tables
                .write()
                .map_err(|_| DirectoryError::LockPoisoned("add collection"))?;
            tables.collections.retain(|c| c.id != collection.id);
            tables.collections.push(collection.clone());
        }
        for reminder in reminders {
            self.insert(reminder.in_collection(collection.id.clone()))?;
        }
        Ok(())
    }

    /// Insert or replace a reminder (matched by id, position kept on replace).
    pub fn insert(&self, reminder: Reminder) -> Result<(), MutationFailed> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| MutationFailed::Unavailable("store lock poisoned".into()))?;
        match tables.reminders.iter_mut().find(|r| r.id == reminder.id) {
            Some(existing) => *existing = reminder,
            None => tables.reminders.push(reminder),
        }
        Ok(())
    }

    /// Every reminder, in insertion order.
    pub fn reminders(&self) -> Result<Vec<Reminder>, MutationFailed> {
        let tables = self
            .tables
            .read()
            .map_err(|_| MutationFailed::Unavailable("store lock poisoned".into()))?;
        Ok(tables.reminders.clone())
    }

    pub fn reminder(&self, id: &str) -> Result<Option<Reminder>, MutationFailed> {
        let tables = self
            .tables
            .read()
            .map_err(|_| MutationFailed::Unavailable("store lock poisoned".into()))?;
        Ok(tables.reminders.iter().find(|r| r.id.as_str() == id).cloned())
    }

    /// Make the next `count` status updates fail with `Unavailable(reason)`.
    pub fn fail_next(&self, count: usize, reason: &str) {
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        failures.extend(std::iter::repeat(reason.to_string()).take(count));
    }

    /// Number of `update_status` calls received, including failed ones.
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn take_injected_failure(&self) -> Option<String> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

#[async_trait]
impl PersistenceEndpoint for ReminderStore {
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Reminder, MutationFailed> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.take_injected_failure() {
            warn!(reminder_id = %request.id, %reason, "injected update failure");
            return Err(MutationFailed::Unavailable(reason));
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| MutationFailed::Unavailable("store lock poisoned".into()))?;
        let reminder = tables
            .reminders
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| MutationFailed::NotFound(request.id.clone()))?;

        if reminder.created_by.as_ref() != Some(&request.created_by) {
            return Err(MutationFailed::Forbidden {
                id: request.id,
                owner: request.created_by,
            });
        }

        reminder.is_completed = request.is_completed;
        info!(reminder_id = %request.id, status = request.is_completed, "reminder status updated");
        Ok(reminder.clone())
    }
}

#[async_trait]
impl QueryFetcher for ReminderStore {
    async fn fetch(&self, key: &CacheKey) -> Result<Vec<Reminder>, CacheError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| CacheError::LockPoisoned("store fetch"))?;

        let reminders = match key.collection_id() {
            Some(collection_id) => tables
                .reminders
                .iter()
                .filter(|r| r.collection_id.as_deref() == Some(collection_id))
                .cloned()
                .collect(),
            None => tables.reminders.clone(),
        };
        debug!(%key, count = reminders.len(), "served reminder list");
        Ok(reminders)
    }
}

#[async_trait]
impl OrganizationDirectory for ReminderStore {
    async fn organization_info(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationInfo>, DirectoryError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| DirectoryError::LockPoisoned("organization info"))?;

        let Some(organization) = tables.organizations.iter().find(|o| o.id == org_id) else {
            return Ok(None);
        };

        let collections = tables
            .collections
            .iter()
            .filter(|c| c.organization_id == org_id)
            .map(|c| Collection {
                reminders: tables
                    .reminders
                    .iter()
                    .filter(|r| r.collection_id.as_deref() == Some(c.id.as_str()))
                    .cloned()
                    .collect(),
                ..c.clone()
            })
            .collect();

        Ok(Some(OrganizationInfo {
            organization: organization.clone(),
            collections,
        }))
    }
}
