//! Notification channel records, declared and stored.
//!
//! # Invariants
//! - `org_id == 0` on a declared entry means "resolve by `org_name`".
//! - A negative declared `org_id` means "use [`DEFAULT_ORG_ID`]".
//! - `settings` is opaque here; it is only ever serialized, never inspected.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Organization identifier as stored in `orgs.id`.
pub type OrgId = i64;

/// Stored notification identifier as stored in `alert_notifications.id`.
pub type NotificationId = i64;

/// Well-known fallback organization for entries with a negative `org_id`.
pub const DEFAULT_ORG_ID: OrgId = 1;

/// Notifier-specific settings, carried as a JSON object.
pub type NotificationSettings = Map<String, Value>;

/// Shared view over the organization selector carried by declared entries.
pub trait OrgScoped {
    fn org_id(&self) -> OrgId;
    fn org_name(&self) -> &str;
}

/// Declared channel that should exist after provisioning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationEntry {
    #[serde(default)]
    pub org_id: OrgId,
    #[serde(default)]
    pub org_name: String,
    pub name: String,
    /// Notifier kind (`email`, `slack`, ...). Read from the `type` key.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, deserialize_with = "null_as_empty_settings")]
    pub settings: NotificationSettings,
}

impl NotificationEntry {
    /// Creates an entry with no organization selector and empty settings.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            org_id: 0,
            org_name: String::new(),
            name: name.into(),
            kind: kind.into(),
            is_default: false,
            settings: NotificationSettings::new(),
        }
    }

    pub fn with_org_id(mut self, org_id: OrgId) -> Self {
        self.org_id = org_id;
        self
    }

    pub fn with_org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = org_name.into();
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Serializes settings into the blob stored in `alert_notifications.settings`.
    pub fn settings_to_json(&self) -> String {
        Value::Object(self.settings.clone()).to_string()
    }

    /// Builds the create command for this entry under an already resolved org.
    pub fn to_new_notification(&self, org_id: OrgId) -> NewNotification {
        NewNotification {
            org_id,
            name: self.name.clone(),
            kind: self.kind.clone(),
            is_default: self.is_default,
            settings: self.settings_to_json(),
        }
    }

    /// Builds the full-overwrite command targeting an existing stored row.
    pub fn to_update(&self, id: NotificationId, org_id: OrgId) -> NotificationUpdate {
        NotificationUpdate {
            id,
            org_id,
            name: self.name.clone(),
            kind: self.kind.clone(),
            is_default: self.is_default,
            settings: self.settings_to_json(),
        }
    }
}

impl OrgScoped for NotificationEntry {
    fn org_id(&self) -> OrgId {
        self.org_id
    }

    fn org_name(&self) -> &str {
        &self.org_name
    }
}

/// Declared channel that should not exist after provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeletionEntry {
    #[serde(default)]
    pub org_id: OrgId,
    #[serde(default)]
    pub org_name: String,
    pub name: String,
}

impl DeletionEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            org_id: 0,
            org_name: String::new(),
            name: name.into(),
        }
    }

    pub fn with_org_id(mut self, org_id: OrgId) -> Self {
        self.org_id = org_id;
        self
    }

    pub fn with_org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = org_name.into();
        self
    }
}

impl OrgScoped for DeletionEntry {
    fn org_id(&self) -> OrgId {
        self.org_id
    }

    fn org_name(&self) -> &str {
        &self.org_name
    }
}

/// One parsed provisioning document.
///
/// Deletions are applied before `notifiers` when the document is reconciled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotificationsDocument {
    #[serde(default)]
    pub notifiers: Vec<NotificationEntry>,
    #[serde(default)]
    pub delete_notifiers: Vec<DeletionEntry>,
}

impl NotificationsDocument {
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty() && self.delete_notifiers.is_empty()
    }
}

/// Organization row as resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
}

/// Notification row as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNotification {
    pub id: NotificationId,
    pub org_id: OrgId,
    pub name: String,
    pub kind: String,
    pub is_default: bool,
    /// Serialized JSON settings blob.
    pub settings: String,
}

/// Create command for a channel that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub org_id: OrgId,
    pub name: String,
    pub kind: String,
    pub is_default: bool,
    pub settings: String,
}

/// Full-overwrite command for an existing channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationUpdate {
    pub id: NotificationId,
    pub org_id: OrgId,
    pub name: String,
    pub kind: String,
    pub is_default: bool,
    pub settings: String,
}

fn null_as_empty_settings<'de, D>(deserializer: D) -> Result<NotificationSettings, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NotificationSettings>::deserialize(deserializer).map(Option::unwrap_or_default)
}
