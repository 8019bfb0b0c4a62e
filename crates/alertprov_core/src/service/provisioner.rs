//! Alert notification provisioner.
//!
//! # Responsibility
//! - Apply provisioning documents to the store: deletions first, then upserts.
//! - Keep one store round trip per step; no batching or reordering.
//!
//! # Invariants
//! - Entries are processed strictly in document order.
//! - The first error aborts the whole run and is returned as-is; earlier
//!   writes stay applied.
//! - Upserts are keyed on `(org_id, name)` and always overwrite every field.
//! - Declared entries are read-only; resolved org ids live in the commands.

use crate::config::{load_documents, ConfigError};
use crate::model::notification::{DeletionEntry, NotificationEntry, NotificationsDocument};
use crate::service::org_resolver::resolve_org_id;
use crate::store::{NotificationStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Error surfaced by a provisioning run.
#[derive(Debug)]
pub enum ProvisionError {
    /// Declared `org_name` does not match any organization.
    OrganizationNotFound(String),
    /// Store failure, passed through unchanged.
    Store(StoreError),
    /// Provisioning files could not be loaded.
    Config(ConfigError),
    /// Recognized condition; reconciliation does not check for it.
    TooManyDefaultNotifications,
    /// Recognized condition; reconciliation does not check for it.
    UnknownNotifierType(String),
}

impl Display for ProvisionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrganizationNotFound(name) => write!(f, "organization not found: `{name}`"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::TooManyDefaultNotifications => write!(
                f,
                "alert notification provisioning config is invalid: only one alert notification can be marked as default"
            ),
            Self::UnknownNotifierType(kind) => write!(f, "unknown notifier type: `{kind}`"),
        }
    }
}

impl Error for ProvisionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => err.source(),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ProvisionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ConfigError> for ProvisionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Reconciles declared alert notifications against a store.
///
/// Holds no state besides the injected store; every run starts fresh.
pub struct NotificationProvisioner<S: NotificationStore> {
    store: S,
}

impl<S: NotificationStore> NotificationProvisioner<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the injected store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies documents in order, deletions before upserts within each.
    ///
    /// # Errors
    /// Returns the first error hit in any document without further processing.
    pub fn reconcile(&self, documents: &[NotificationsDocument]) -> ProvisionResult<()> {
        for document in documents {
            self.apply(document)?;
        }
        Ok(())
    }

    /// Applies one document.
    pub fn apply(&self, document: &NotificationsDocument) -> ProvisionResult<()> {
        self.delete_notifications(&document.delete_notifiers)?;
        self.merge_notifications(&document.notifiers)?;
        Ok(())
    }

    /// Removes each declared entry that currently exists. Missing ones are skipped.
    pub fn delete_notifications(&self, entries: &[DeletionEntry]) -> ProvisionResult<()> {
        for entry in entries {
            info!(
                "event=notification_delete module=provisioning status=start name={}",
                entry.name
            );

            let org_id = resolve_org_id(&self.store, entry)?;
            if let Some(existing) = self.store.find_notification(org_id, &entry.name)? {
                self.store.delete_notification(existing.id, org_id)?;
            }
        }

        Ok(())
    }

    /// Creates absent entries and fully overwrites present ones.
    pub fn merge_notifications(&self, entries: &[NotificationEntry]) -> ProvisionResult<()> {
        for entry in entries {
            let org_id = resolve_org_id(&self.store, entry)?;

            match self.store.find_notification(org_id, &entry.name)? {
                None => {
                    info!(
                        "event=notification_insert module=provisioning status=start name={} org_id={}",
                        entry.name, org_id
                    );
                    self.store
                        .create_notification(&entry.to_new_notification(org_id))?;
                }
                Some(existing) => {
                    info!(
                        "event=notification_update module=provisioning status=start name={} org_id={} id={}",
                        entry.name, org_id, existing.id
                    );
                    self.store
                        .update_notification(&entry.to_update(existing.id, org_id))?;
                }
            }
        }

        Ok(())
    }
}

/// Loads every document in `config_dir` and reconciles them against `store`.
///
/// Returns the number of documents applied.
pub fn provision<S: NotificationStore>(
    config_dir: impl AsRef<Path>,
    store: S,
) -> ProvisionResult<usize> {
    let config_dir = config_dir.as_ref();
    let documents = load_documents(config_dir)?;
    info!(
        "event=provision module=provisioning status=start path={} documents={}",
        config_dir.display(),
        documents.len()
    );

    NotificationProvisioner::new(store).reconcile(&documents)?;

    info!(
        "event=provision module=provisioning status=ok path={} documents={}",
        config_dir.display(),
        documents.len()
    );
    Ok(documents.len())
}
