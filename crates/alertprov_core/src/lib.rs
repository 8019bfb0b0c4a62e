//! Alert notification provisioning core.
//!
//! Reconciles alert notification channels declared in YAML provisioning files
//! against the channels stored in SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{load_documents, parse_document, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::notification::{
    DeletionEntry, NewNotification, NotificationEntry, NotificationId, NotificationSettings,
    NotificationUpdate, NotificationsDocument, OrgId, OrgScoped, Organization,
    StoredNotification, DEFAULT_ORG_ID,
};
pub use service::org_resolver::resolve_org_id;
pub use service::provisioner::{
    provision, NotificationProvisioner, ProvisionError, ProvisionResult,
};
pub use store::sqlite::SqliteNotificationStore;
pub use store::{NotificationStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
