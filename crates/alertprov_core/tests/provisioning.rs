use alertprov_core::db::open_db_in_memory;
use alertprov_core::{
    DeletionEntry, NewNotification, NotificationEntry, NotificationId, NotificationProvisioner,
    NotificationStore, NotificationUpdate, NotificationsDocument, OrgId, Organization,
    ProvisionError, SqliteNotificationStore, StoreError, StoreResult, StoredNotification,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Store call as observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    FindOrg(String),
    Find(OrgId, String),
    Create(NewNotification),
    Update(NotificationUpdate),
    Delete(NotificationId, OrgId),
}

/// In-memory store that records every call and can fail on demand.
#[derive(Default)]
struct RecordingStore {
    orgs: BTreeMap<String, OrgId>,
    rows: RefCell<BTreeMap<(OrgId, String), StoredNotification>>,
    next_id: RefCell<NotificationId>,
    calls: RefCell<Vec<Call>>,
    fail_create_for: Option<String>,
}

impl RecordingStore {
    fn with_org(mut self, name: &str, id: OrgId) -> Self {
        self.orgs.insert(name.to_string(), id);
        self
    }

    fn with_row(self, org_id: OrgId, name: &str, kind: &str) -> Self {
        let id = self.bump_id();
        self.rows.borrow_mut().insert(
            (org_id, name.to_string()),
            StoredNotification {
                id,
                org_id,
                name: name.to_string(),
                kind: kind.to_string(),
                is_default: false,
                settings: "{}".to_string(),
            },
        );
        self
    }

    fn bump_id(&self) -> NotificationId {
        let mut next_id = self.next_id.borrow_mut();
        *next_id += 1;
        *next_id
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Create(_) | Call::Update(_) | Call::Delete(..)))
            .collect()
    }

    fn row(&self, org_id: OrgId, name: &str) -> Option<StoredNotification> {
        self.rows.borrow().get(&(org_id, name.to_string())).cloned()
    }
}

impl NotificationStore for RecordingStore {
    fn find_org_by_name(&self, name: &str) -> StoreResult<Option<Organization>> {
        self.calls.borrow_mut().push(Call::FindOrg(name.to_string()));
        Ok(self.orgs.get(name).map(|id| Organization {
            id: *id,
            name: name.to_string(),
        }))
    }

    fn find_notification(
        &self,
        org_id: OrgId,
        name: &str,
    ) -> StoreResult<Option<StoredNotification>> {
        self.calls
            .borrow_mut()
            .push(Call::Find(org_id, name.to_string()));
        Ok(self.row(org_id, name))
    }

    fn create_notification(&self, command: &NewNotification) -> StoreResult<StoredNotification> {
        self.calls.borrow_mut().push(Call::Create(command.clone()));
        if self.fail_create_for.as_deref() == Some(command.name.as_str()) {
            return Err(StoreError::InvalidData(format!(
                "injected failure for {}",
                command.name
            )));
        }
        let stored = StoredNotification {
            id: self.bump_id(),
            org_id: command.org_id,
            name: command.name.clone(),
            kind: command.kind.clone(),
            is_default: command.is_default,
            settings: command.settings.clone(),
        };
        self.rows
            .borrow_mut()
            .insert((command.org_id, command.name.clone()), stored.clone());
        Ok(stored)
    }

    fn update_notification(&self, command: &NotificationUpdate) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Update(command.clone()));
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .values_mut()
            .find(|row| row.id == command.id && row.org_id == command.org_id)
            .ok_or(StoreError::NotFound {
                id: command.id,
                org_id: command.org_id,
            })?;
        row.kind = command.kind.clone();
        row.is_default = command.is_default;
        row.settings = command.settings.clone();
        Ok(())
    }

    fn delete_notification(&self, id: NotificationId, org_id: OrgId) -> StoreResult<()> {
        self.calls.borrow_mut().push(Call::Delete(id, org_id));
        self.rows
            .borrow_mut()
            .retain(|_, row| !(row.id == id && row.org_id == org_id));
        Ok(())
    }
}

fn document(
    notifiers: Vec<NotificationEntry>,
    delete_notifiers: Vec<DeletionEntry>,
) -> NotificationsDocument {
    NotificationsDocument {
        notifiers,
        delete_notifiers,
    }
}

#[test]
fn negative_org_id_creates_in_default_org() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNotificationStore::try_new(&conn).unwrap();
    let provisioner = NotificationProvisioner::new(&store);

    let entry = NotificationEntry::new("ops-email", "email")
        .with_org_id(-1)
        .with_default(true)
        .with_setting("addresses", "ops@example.com");
    provisioner
        .reconcile(&[document(vec![entry], vec![])])
        .unwrap();

    let stored = store.list_notifications(1).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].org_id, 1);
    assert_eq!(stored[0].name, "ops-email");
    assert_eq!(stored[0].kind, "email");
    assert!(stored[0].is_default);
}

#[test]
fn org_name_resolves_and_existing_row_is_updated_in_place() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO orgs (id, name) VALUES (42, 'Acme');", [])
        .unwrap();
    let store = SqliteNotificationStore::try_new(&conn).unwrap();
    let existing = store
        .create_notification(&NewNotification {
            org_id: 42,
            name: "ops-email".to_string(),
            kind: "email".to_string(),
            is_default: false,
            settings: "{}".to_string(),
        })
        .unwrap();

    let entry = NotificationEntry::new("ops-email", "slack")
        .with_org_name("Acme")
        .with_setting("url", "https://hooks.example.com");
    NotificationProvisioner::new(&store)
        .reconcile(&[document(vec![entry], vec![])])
        .unwrap();

    let stored = store.list_notifications(42).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, existing.id);
    assert_eq!(stored[0].kind, "slack");
    assert_eq!(stored[0].settings, r#"{"url":"https://hooks.example.com"}"#);
}

#[test]
fn unknown_org_name_aborts_run_without_mutations() {
    let store = RecordingStore::default().with_org("Acme", 42);
    let provisioner = NotificationProvisioner::new(&store);

    let documents = [
        document(
            vec![
                NotificationEntry::new("ghost-email", "email").with_org_name("Ghost"),
                NotificationEntry::new("later", "email").with_org_id(1),
            ],
            vec![],
        ),
        document(
            vec![NotificationEntry::new("next-doc", "email").with_org_name("Acme")],
            vec![DeletionEntry::new("old").with_org_id(1)],
        ),
    ];

    let err = provisioner.reconcile(&documents).unwrap_err();
    assert!(matches!(err, ProvisionError::OrganizationNotFound(ref name) if name == "Ghost"));
    assert_eq!(store.calls(), vec![Call::FindOrg("Ghost".to_string())]);
    assert!(store.mutations().is_empty());
}

#[test]
fn second_merge_updates_instead_of_duplicating() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNotificationStore::try_new(&conn).unwrap();
    let provisioner = NotificationProvisioner::new(&store);
    let documents = [document(
        vec![NotificationEntry::new("hook", "webhook")
            .with_org_id(1)
            .with_setting("url", "https://example.com")],
        vec![],
    )];

    provisioner.reconcile(&documents).unwrap();
    let first = store.list_notifications(1).unwrap();
    provisioner.reconcile(&documents).unwrap();
    let second = store.list_notifications(1).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.len(), 1);
}

#[test]
fn second_merge_issues_update_keyed_on_existing_id() {
    let store = RecordingStore::default();
    let provisioner = NotificationProvisioner::new(&store);
    let entries = [NotificationEntry::new("hook", "webhook").with_org_id(3)];

    provisioner.merge_notifications(&entries).unwrap();
    provisioner.merge_notifications(&entries).unwrap();

    let mutations = store.mutations();
    assert_eq!(mutations.len(), 2);
    assert!(matches!(&mutations[0], Call::Create(create) if create.org_id == 3));
    assert!(matches!(&mutations[1], Call::Update(update) if update.id == 1 && update.org_id == 3));
}

#[test]
fn deleting_missing_channel_is_a_silent_noop() {
    let store = RecordingStore::default();
    let provisioner = NotificationProvisioner::new(&store);
    let entries = [DeletionEntry::new("absent").with_org_id(2)];

    provisioner.delete_notifications(&entries).unwrap();
    provisioner.delete_notifications(&entries).unwrap();

    assert!(store.mutations().is_empty());
    assert_eq!(
        store.calls(),
        vec![
            Call::Find(2, "absent".to_string()),
            Call::Find(2, "absent".to_string()),
        ]
    );
}

#[test]
fn deletion_resolves_org_and_deletes_by_stored_id() {
    let store = RecordingStore::default()
        .with_org("Acme", 42)
        .with_row(42, "old-hook", "webhook");
    let provisioner = NotificationProvisioner::new(&store);

    provisioner
        .delete_notifications(&[DeletionEntry::new("old-hook").with_org_name("Acme")])
        .unwrap();

    assert_eq!(store.mutations(), vec![Call::Delete(1, 42)]);
    assert!(store.row(42, "old-hook").is_none());
}

#[test]
fn deletions_run_before_merges_within_a_document() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNotificationStore::try_new(&conn).unwrap();
    let original = store
        .create_notification(&NewNotification {
            org_id: 1,
            name: "X".to_string(),
            kind: "email".to_string(),
            is_default: false,
            settings: "{}".to_string(),
        })
        .unwrap();

    // Merge is listed first in the document but must run after the deletion.
    let doc = document(
        vec![NotificationEntry::new("X", "slack").with_org_id(1).with_default(true)],
        vec![DeletionEntry::new("X").with_org_id(1)],
    );
    NotificationProvisioner::new(&store)
        .reconcile(&[doc])
        .unwrap();

    let stored = store.list_notifications(1).unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].id, original.id);
    assert_eq!(stored[0].kind, "slack");
    assert!(stored[0].is_default);
}

#[test]
fn documents_are_applied_in_order() {
    let store = RecordingStore::default();
    let provisioner = NotificationProvisioner::new(&store);

    provisioner
        .reconcile(&[
            document(vec![NotificationEntry::new("a", "email").with_org_id(1)], vec![]),
            document(vec![], vec![DeletionEntry::new("a").with_org_id(1)]),
        ])
        .unwrap();

    let mutations = store.mutations();
    assert!(matches!(&mutations[0], Call::Create(create) if create.name == "a"));
    assert!(matches!(mutations[1], Call::Delete(1, 1)));
    assert!(store.row(1, "a").is_none());
}

#[test]
fn renaming_a_channel_creates_a_new_row() {
    let store = RecordingStore::default().with_row(1, "old-name", "email");
    let provisioner = NotificationProvisioner::new(&store);

    provisioner
        .merge_notifications(&[NotificationEntry::new("new-name", "email").with_org_id(1)])
        .unwrap();

    assert!(store.row(1, "old-name").is_some());
    assert!(store.row(1, "new-name").is_some());
}

#[test]
fn store_failure_stops_run_and_keeps_earlier_writes() {
    let store = RecordingStore {
        fail_create_for: Some("second".to_string()),
        ..RecordingStore::default()
    };
    let provisioner = NotificationProvisioner::new(&store);

    let err = provisioner
        .reconcile(&[document(
            vec![
                NotificationEntry::new("first", "email").with_org_id(1),
                NotificationEntry::new("second", "email").with_org_id(1),
                NotificationEntry::new("third", "email").with_org_id(1),
            ],
            vec![],
        )])
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Store(StoreError::InvalidData(_))));
    assert_eq!(
        err.to_string(),
        "invalid persisted alert notification data: injected failure for second"
    );
    assert!(store.row(1, "first").is_some());
    assert!(!store.calls().contains(&Call::Find(1, "third".to_string())));
}

#[test]
fn zero_org_without_name_passes_through_to_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNotificationStore::try_new(&conn).unwrap();

    let err = NotificationProvisioner::new(&store)
        .merge_notifications(&[NotificationEntry::new("orphan", "email")])
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Store(StoreError::Db(_))));
}

#[test]
fn multiple_defaults_are_not_rejected() {
    let store = RecordingStore::default();
    NotificationProvisioner::new(&store)
        .merge_notifications(&[
            NotificationEntry::new("a", "email").with_org_id(1).with_default(true),
            NotificationEntry::new("b", "not-a-real-notifier")
                .with_org_id(1)
                .with_default(true),
        ])
        .unwrap();

    assert_eq!(store.mutations().len(), 2);
}

#[test]
fn declared_entries_are_not_mutated() {
    let store = RecordingStore::default().with_org("Acme", 42);
    let entries = vec![
        NotificationEntry::new("a", "email").with_org_name("Acme"),
        NotificationEntry::new("b", "email").with_org_id(-5),
    ];
    let snapshot = entries.clone();

    NotificationProvisioner::new(&store)
        .merge_notifications(&entries)
        .unwrap();

    assert_eq!(entries, snapshot);
    assert!(store.row(42, "a").is_some());
    assert!(store.row(1, "b").is_some());
}
