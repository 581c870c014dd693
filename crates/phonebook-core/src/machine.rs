//! The phone book lifecycle machine.
//!
//! ```text
//! idle --READ--> ready --CREATE|UPDATE|DELETE|RESET--> running --FINISH--> ready
//! ```
//!
//! Mutations only touch the in-memory list. Storage is read on READ and
//! written on FINISH, never in between. Events that have no transition from
//! the current state are ignored, and no transition returns an error: every
//! failure degrades to seed data, a no-op, or a logged failed write.

use crate::contact::{self, Contact};
use crate::paths;
use crate::storage::Storage;
use crate::types::MachineState;
use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Events and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read,
    Create(Contact),
    Update(Contact),
    Delete(Contact),
    Reset,
    Finish,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Read => "READ",
            Event::Create(_) => "CREATE",
            Event::Update(_) => "UPDATE",
            Event::Delete(_) => "DELETE",
            Event::Reset => "RESET",
            Event::Finish => "FINISH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Storage,
    Seed,
}

/// The side effect a transition performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Loaded { source: LoadSource, count: usize },
    Created { id: i64 },
    Updated { id: i64 },
    /// UPDATE matched a contact but every supplied field equalled the
    /// stored value.
    Unchanged { id: i64 },
    Deleted { id: i64 },
    /// UPDATE or DELETE named an id that is not in the list.
    Missing { id: i64 },
    /// CREATE without a name; the list is unchanged.
    Rejected { reason: String },
    Reset { count: usize },
    Persisted { count: usize },
    PersistFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub event: &'static str,
    pub from: MachineState,
    pub to: MachineState,
    #[serde(flatten)]
    pub effect: Effect,
}

/// Read-only view handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub state: MachineState,
    pub contacts: Vec<Contact>,
}

// ---------------------------------------------------------------------------
// PhoneBookMachine
// ---------------------------------------------------------------------------

/// Sole owner of the contact list. Construct one per application root and
/// pass it to whatever needs to dispatch events.
pub struct PhoneBookMachine<S: Storage> {
    state: MachineState,
    contacts: Vec<Contact>,
    storage: S,
    storage_key: String,
    today: NaiveDate,
}

impl<S: Storage> PhoneBookMachine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            state: MachineState::Idle,
            contacts: Vec::new(),
            storage,
            storage_key: paths::DEFAULT_STORAGE_KEY.to_string(),
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Pin the date ages are computed against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn find(&self, id: i64) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            contacts: self.contacts.clone(),
        }
    }

    /// Apply one event. Returns `None` when the current state has no
    /// transition for it.
    pub fn send(&mut self, event: Event) -> Option<Transition> {
        let from = self.state;
        let name = event.name();
        let (to, effect) = match (from, event) {
            (MachineState::Idle, Event::Read) => (MachineState::Ready, self.read()),
            (MachineState::Ready, Event::Create(c)) => (MachineState::Running, self.create(c)),
            (MachineState::Ready, Event::Update(c)) => (MachineState::Running, self.update(c)),
            (MachineState::Ready, Event::Delete(c)) => (MachineState::Running, self.delete(c.id)),
            (MachineState::Ready, Event::Reset) => (MachineState::Running, self.reset()),
            (MachineState::Running, Event::Finish) => (MachineState::Ready, self.write()),
            (state, _) => {
                tracing::debug!(event = name, state = %state, "event ignored");
                return None;
            }
        };
        self.state = to;
        tracing::debug!(event = name, from = %from, to = %to, "transition");
        Some(Transition {
            event: name,
            from,
            to,
            effect,
        })
    }

    /// Send `event`, then FINISH if it left the machine running.
    pub fn send_and_flush(&mut self, event: Event) -> Vec<Transition> {
        let mut transitions: Vec<Transition> = self.send(event).into_iter().collect();
        if self.state == MachineState::Running {
            transitions.extend(self.send(Event::Finish));
        }
        transitions
    }

    // -- actions --------------------------------------------------------------

    fn read(&mut self) -> Effect {
        let (mut contacts, source) = match self.load_stored() {
            Some(contacts) => (contacts, LoadSource::Storage),
            None => (contact::seed_contacts(self.today), LoadSource::Seed),
        };
        for c in &mut contacts {
            c.recompute_age(self.today);
        }
        self.contacts = contacts;
        Effect::Loaded {
            source,
            count: self.contacts.len(),
        }
    }

    fn load_stored(&self) -> Option<Vec<Contact>> {
        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.storage_key, "no stored phone book, using seed list");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "failed to read phone book, using seed list");
                return None;
            }
        };
        match serde_json::from_str::<Vec<Contact>>(&raw) {
            Ok(list) if contact::has_unique_ids(&list) => Some(list),
            Ok(_) => {
                tracing::warn!(key = %self.storage_key, "stored phone book has duplicate ids, using seed list");
                None
            }
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "stored phone book is corrupt, using seed list");
                None
            }
        }
    }

    fn create(&mut self, mut incoming: Contact) -> Effect {
        if incoming.name.trim().is_empty() {
            let composed = incoming.display_name();
            if composed.trim().is_empty() {
                tracing::warn!("CREATE without a name ignored");
                return Effect::Rejected {
                    reason: "name is required".to_string(),
                };
            }
            incoming.name = composed;
        }
        if incoming.id <= 0 || self.find(incoming.id).is_some() {
            incoming.id = contact::next_id(&self.contacts);
        }
        incoming.recompute_age(self.today);
        let id = incoming.id;
        self.contacts.push(incoming);
        Effect::Created { id }
    }

    fn update(&mut self, incoming: Contact) -> Effect {
        let today = self.today;
        match self.contacts.iter_mut().find(|c| c.id == incoming.id) {
            Some(existing) => {
                if existing.merge_from(&incoming, today) {
                    Effect::Updated { id: incoming.id }
                } else {
                    tracing::debug!(id = incoming.id, "UPDATE changed nothing");
                    Effect::Unchanged { id: incoming.id }
                }
            }
            None => {
                tracing::warn!(id = incoming.id, "UPDATE for unknown contact ignored");
                Effect::Missing { id: incoming.id }
            }
        }
    }

    fn delete(&mut self, id: i64) -> Effect {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        if self.contacts.len() == before {
            tracing::warn!(id, "DELETE for unknown contact ignored");
            return Effect::Missing { id };
        }
        Effect::Deleted { id }
    }

    fn reset(&mut self) -> Effect {
        self.contacts = contact::seed_contacts(self.today);
        Effect::Reset {
            count: self.contacts.len(),
        }
    }

    fn write(&mut self) -> Effect {
        let result = serde_json::to_string(&self.contacts)
            .map_err(crate::error::PhonebookError::from)
            .and_then(|json| self.storage.set(&self.storage_key, &json));
        match result {
            Ok(()) => Effect::Persisted {
                count: self.contacts.len(),
            },
            Err(e) => {
                tracing::error!(key = %self.storage_key, error = %e, "failed to persist phone book");
                Effect::PersistFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PhonebookError, Result};
    use crate::storage::{FileStorage, MemoryStorage};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const KEY: &str = "phoneBook";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn ready(storage: MemoryStorage) -> PhoneBookMachine<MemoryStorage> {
        let mut machine = PhoneBookMachine::new(storage).with_today(today());
        machine.send(Event::Read).unwrap();
        machine
    }

    fn ids(machine: &PhoneBookMachine<impl Storage>) -> BTreeSet<i64> {
        machine.contacts().iter().map(|c| c.id).collect()
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(PhonebookError::Io(std::io::Error::other("unreadable")))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(PhonebookError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn starts_idle_and_reads_seed_when_storage_empty() {
        let mut machine = PhoneBookMachine::new(MemoryStorage::new()).with_today(today());
        assert_eq!(machine.state(), MachineState::Idle);

        let t = machine.send(Event::Read).unwrap();
        assert_eq!(t.to, MachineState::Ready);
        assert_eq!(
            t.effect,
            Effect::Loaded {
                source: LoadSource::Seed,
                count: 6
            }
        );
    }

    #[test]
    fn reads_stored_list_and_recomputes_ages() {
        let stored = r#"[{"id":9,"name":"Ada Lovelace","birthday":"1990-06-02","age":1}]"#;
        let machine = ready(MemoryStorage::with_entry(KEY, stored));
        assert_eq!(machine.contacts().len(), 1);
        assert_eq!(machine.contacts()[0].age, Some(33));
    }

    #[test]
    fn corrupt_or_duplicate_storage_falls_back_to_seed() {
        for stored in ["not json", r#"[{"id":1,"name":"a"},{"id":1,"name":"b"}]"#] {
            let machine = ready(MemoryStorage::with_entry(KEY, stored));
            assert_eq!(machine.contacts(), contact::seed_contacts(today()).as_slice());
        }
        let mut machine = PhoneBookMachine::new(BrokenStorage).with_today(today());
        machine.send(Event::Read).unwrap();
        assert_eq!(machine.contacts().len(), 6);
    }

    #[test]
    fn events_without_transition_are_ignored() {
        let mut machine = PhoneBookMachine::new(MemoryStorage::new()).with_today(today());
        assert!(machine.send(Event::Reset).is_none());
        assert!(machine.send(Event::Finish).is_none());
        assert_eq!(machine.state(), MachineState::Idle);

        machine.send(Event::Read).unwrap();
        assert!(machine.send(Event::Read).is_none());
        assert!(machine.send(Event::Finish).is_none());

        machine.send(Event::Reset).unwrap();
        assert!(machine.send(Event::Create(Contact::new(0, "X Y"))).is_none());
        assert_eq!(machine.state(), MachineState::Running);
    }

    #[test]
    fn create_assigns_id_and_age_without_persisting() {
        let mut machine = ready(MemoryStorage::new());
        let incoming = Contact {
            birthday: Some("1990-06-01".into()),
            ..Contact::new(0, "Grace Hopper")
        };
        let t = machine.send(Event::Create(incoming)).unwrap();
        assert_eq!(t.effect, Effect::Created { id: 7 });
        assert_eq!(machine.find(7).unwrap().age, Some(34));
        assert!(machine.storage().get(KEY).unwrap().is_none());

        let t = machine.send(Event::Finish).unwrap();
        assert_eq!(t.effect, Effect::Persisted { count: 7 });
        assert_eq!(machine.state(), MachineState::Ready);
    }

    #[test]
    fn create_with_colliding_id_gets_fresh_id() {
        let mut machine = ready(MemoryStorage::new());
        let t = machine.send(Event::Create(Contact::new(3, "Dup Licate"))).unwrap();
        assert_eq!(t.effect, Effect::Created { id: 7 });
        assert!(contact::has_unique_ids(machine.contacts()));
    }

    #[test]
    fn create_without_name_is_rejected() {
        let mut machine = ready(MemoryStorage::new());
        let t = machine.send(Event::Create(Contact::new(0, " "))).unwrap();
        assert!(matches!(t.effect, Effect::Rejected { .. }));
        assert_eq!(machine.contacts().len(), 6);
    }

    #[test]
    fn finish_writes_json_list_verbatim() {
        let mut machine = ready(MemoryStorage::new());
        machine.send(Event::Delete(Contact::new(1, ""))).unwrap();
        machine.send(Event::Finish).unwrap();
        let raw = machine.storage().get(KEY).unwrap().unwrap();
        let stored: Vec<Contact> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, machine.contacts());
    }

    #[test]
    fn reset_then_finish_is_idempotent() {
        let mut machine = ready(MemoryStorage::new());
        machine.send(Event::Delete(Contact::new(2, ""))).unwrap();
        machine.send(Event::Finish).unwrap();

        machine.send_and_flush(Event::Reset);
        let first = machine.storage().get(KEY).unwrap();
        machine.send_and_flush(Event::Reset);
        let second = machine.storage().get(KEY).unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn create_then_delete_restores_id_set() {
        let mut machine = ready(MemoryStorage::new());
        let before = ids(&machine);

        let created = machine.send_and_flush(Event::Create(Contact::new(0, "Temp Person")));
        let id = match &created[0].effect {
            Effect::Created { id } => *id,
            other => panic!("expected create, got {other:?}"),
        };
        machine.send_and_flush(Event::Delete(Contact::new(id, "")));
        assert_eq!(ids(&machine), before);
    }

    #[test]
    fn update_merges_and_keeps_blank_fields() {
        let mut machine = ready(MemoryStorage::new());
        let incoming = Contact {
            phone_number: Some(String::new()),
            city: Some("Oakland".into()),
            ..Contact::new(4, "")
        };
        let t = machine.send(Event::Update(incoming)).unwrap();
        assert_eq!(t.effect, Effect::Updated { id: 4 });

        let updated = machine.find(4).unwrap();
        assert_eq!(updated.name, "Ryan Hoffman");
        assert_eq!(updated.phone_number.as_deref(), Some("555-555-5555"));
        assert_eq!(updated.city.as_deref(), Some("Oakland"));
    }

    #[test]
    fn update_with_identical_fields_reports_unchanged() {
        let mut machine = ready(MemoryStorage::new());
        let current = machine.find(4).cloned().unwrap();

        let t = machine.send(Event::Update(current.clone())).unwrap();
        assert_eq!(t.effect, Effect::Unchanged { id: 4 });
        assert_eq!(t.to, MachineState::Running);
        assert_eq!(machine.find(4), Some(&current));
    }

    #[test]
    fn unknown_id_update_and_delete_are_noops() {
        let mut machine = ready(MemoryStorage::new());
        let before = machine.contacts().to_vec();

        let t = machine.send(Event::Update(Contact::new(-1, "Ghost"))).unwrap();
        assert_eq!(t.effect, Effect::Missing { id: -1 });
        machine.send(Event::Finish).unwrap();

        let t = machine.send(Event::Delete(Contact::new(404, ""))).unwrap();
        assert_eq!(t.effect, Effect::Missing { id: 404 });
        assert_eq!(machine.contacts(), before.as_slice());
    }

    #[test]
    fn failed_write_is_reported_and_machine_stays_usable() {
        let mut machine = PhoneBookMachine::new(BrokenStorage).with_today(today());
        machine.send(Event::Read).unwrap();
        machine.send(Event::Reset).unwrap();

        let t = machine.send(Event::Finish).unwrap();
        assert!(matches!(t.effect, Effect::PersistFailed { .. }));
        assert_eq!(machine.state(), MachineState::Ready);
        assert!(machine.send(Event::Reset).is_some());
    }

    #[test]
    fn file_backed_instances_share_storage_not_memory() {
        let dir = TempDir::new().unwrap();
        let mut first = PhoneBookMachine::new(FileStorage::for_root(dir.path())).with_today(today());
        first.send(Event::Read).unwrap();
        first.send_and_flush(Event::Delete(Contact::new(6, "")));

        let mut second = PhoneBookMachine::new(FileStorage::for_root(dir.path())).with_today(today());
        second.send(Event::Read).unwrap();
        assert_eq!(second.contacts().len(), 5);
        assert!(second.find(6).is_none());
    }

    #[test]
    fn snapshot_reflects_state_and_list() {
        let machine = ready(MemoryStorage::new());
        let snap = machine.snapshot();
        assert_eq!(snap.state, MachineState::Ready);
        assert_eq!(snap.contacts.len(), 6);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "ready");
    }
}
