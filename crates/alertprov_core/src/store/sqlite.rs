//! SQLite-backed notification store.
//!
//! # Invariants
//! - `(org_id, name)` is unique in `alert_notifications`.
//! - Read paths reject corrupt persisted rows instead of masking them.
//! - Update and delete report `NotFound` when no row matched.

use super::{NotificationStore, StoreError, StoreResult};
use crate::db::migrations::{current_version, latest_version};
use crate::model::notification::{
    NewNotification, NotificationId, NotificationUpdate, OrgId, Organization, StoredNotification,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    org_id,
    name,
    type,
    is_default,
    settings
FROM alert_notifications";

/// Notification store over one migrated SQLite connection.
pub struct SqliteNotificationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationStore<'conn> {
    /// Wraps a connection, rejecting databases whose schema is not current.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version = current_version(conn)?;
        if version != latest_version() {
            return Err(StoreError::InvalidData(format!(
                "schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }

    /// Creates an organization row. Not part of the provisioning contract.
    pub fn create_organization(&self, name: &str) -> StoreResult<Organization> {
        self.conn
            .execute("INSERT INTO orgs (name) VALUES (?1);", [name])?;
        Ok(Organization {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Lists all notifications of one organization ordered by name.
    pub fn list_notifications(&self, org_id: OrgId) -> StoreResult<Vec<StoredNotification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE org_id = ?1
             ORDER BY name ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([org_id])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }

        Ok(notifications)
    }
}

impl NotificationStore for SqliteNotificationStore<'_> {
    fn find_org_by_name(&self, name: &str) -> StoreResult<Option<Organization>> {
        let org = self
            .conn
            .query_row(
                "SELECT id, name FROM orgs WHERE name = ?1;",
                [name],
                |row| {
                    Ok(Organization {
                        id: row.get("id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(org)
    }

    fn find_notification(
        &self,
        org_id: OrgId,
        name: &str,
    ) -> StoreResult<Option<StoredNotification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE org_id = ?1
               AND name = ?2;"
        ))?;

        let mut rows = stmt.query(params![org_id, name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }

        Ok(None)
    }

    fn create_notification(&self, command: &NewNotification) -> StoreResult<StoredNotification> {
        self.conn.execute(
            "INSERT INTO alert_notifications (
                org_id,
                name,
                type,
                is_default,
                settings
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                command.org_id,
                command.name.as_str(),
                command.kind.as_str(),
                bool_to_int(command.is_default),
                command.settings.as_str(),
            ],
        )?;

        Ok(StoredNotification {
            id: self.conn.last_insert_rowid(),
            org_id: command.org_id,
            name: command.name.clone(),
            kind: command.kind.clone(),
            is_default: command.is_default,
            settings: command.settings.clone(),
        })
    }

    fn update_notification(&self, command: &NotificationUpdate) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE alert_notifications
             SET
                name = ?1,
                type = ?2,
                is_default = ?3,
                settings = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5
               AND org_id = ?6;",
            params![
                command.name.as_str(),
                command.kind.as_str(),
                bool_to_int(command.is_default),
                command.settings.as_str(),
                command.id,
                command.org_id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                id: command.id,
                org_id: command.org_id,
            });
        }

        Ok(())
    }

    fn delete_notification(&self, id: NotificationId, org_id: OrgId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM alert_notifications WHERE id = ?1 AND org_id = ?2;",
            params![id, org_id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound { id, org_id });
        }

        Ok(())
    }
}

fn parse_notification_row(row: &Row<'_>) -> StoreResult<StoredNotification> {
    let is_default = match row.get::<_, i64>("is_default")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_default value `{other}` in alert_notifications.is_default"
            )));
        }
    };

    Ok(StoredNotification {
        id: row.get("id")?,
        org_id: row.get("org_id")?,
        name: row.get("name")?,
        kind: row.get("type")?,
        is_default,
        settings: row.get("settings")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
