//! Store contract used by the provisioning engine.
//!
//! # Responsibility
//! - Define the small command set reconciliation needs from persistence.
//! - Isolate SQLite details from the provisioning service.
//!
//! # Invariants
//! - Each trait call is executed atomically by the implementation.
//! - Lookups return `Ok(None)` for absent rows; only transport, constraint or
//!   data errors surface as `Err`.

use crate::db::DbError;
use crate::model::notification::{
    NewNotification, NotificationId, NotificationUpdate, OrgId, Organization, StoredNotification,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by store implementations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound {
        id: NotificationId,
        org_id: OrgId,
    },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { id, org_id } => {
                write!(f, "alert notification not found: id={id} org_id={org_id}")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted alert notification data: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence operations required by reconciliation.
pub trait NotificationStore {
    fn find_org_by_name(&self, name: &str) -> StoreResult<Option<Organization>>;
    fn find_notification(&self, org_id: OrgId, name: &str)
        -> StoreResult<Option<StoredNotification>>;
    fn create_notification(&self, command: &NewNotification) -> StoreResult<StoredNotification>;
    fn update_notification(&self, command: &NotificationUpdate) -> StoreResult<()>;
    fn delete_notification(&self, id: NotificationId, org_id: OrgId) -> StoreResult<()>;
}

impl<S: NotificationStore + ?Sized> NotificationStore for &S {
    fn find_org_by_name(&self, name: &str) -> StoreResult<Option<Organization>> {
        (**self).find_org_by_name(name)
    }

    fn find_notification(
        &self,
        org_id: OrgId,
        name: &str,
    ) -> StoreResult<Option<StoredNotification>> {
        (**self).find_notification(org_id, name)
    }

    fn create_notification(&self, command: &NewNotification) -> StoreResult<StoredNotification> {
        (**self).create_notification(command)
    }

    fn update_notification(&self, command: &NotificationUpdate) -> StoreResult<()> {
        (**self).update_notification(command)
    }

    fn delete_notification(&self, id: NotificationId, org_id: OrgId) -> StoreResult<()> {
        (**self).delete_notification(id, org_id)
    }
}
