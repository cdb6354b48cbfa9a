use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{COUNTERS_FILE, DOCTORS_FILE, PATIENTS_FILE, USERS_FILE};

/// Named durable locations, one serialized container each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Users,
    Patients,
    Doctors,
    Counters,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Users, Slot::Patients, Slot::Doctors, Slot::Counters];

    /// File name of the slot inside the data directory
    pub fn file_name(self) -> &'static str {
        match self {
            Slot::Users => USERS_FILE,
            Slot::Patients => PATIENTS_FILE,
            Slot::Doctors => DOCTORS_FILE,
            Slot::Counters => COUNTERS_FILE,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Users => "users",
            Slot::Patients => "patients",
            Slot::Doctors => "doctors",
            Slot::Counters => "counters",
        };
        f.write_str(name)
    }
}

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot prepare data directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error on {slot} slot: {source}")]
    Io {
        slot: Slot,
        #[source]
        source: io::Error,
    },
    #[error("malformed content in {slot} slot: {source}")]
    Malformed {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot serialize {slot} slot: {source}")]
    Serialize {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-collection JSON storage rooted at a data directory.
///
/// Every slot holds exactly one container. A slot that was never written
/// loads as `C::default()`, so callers see an empty `Vec` or map instead of a
/// not-found error. Writers of the same slot are serialized by a per-slot lock
/// held for the whole load-modify-save cycle.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    locks: [Mutex<()>; 4],
}

impl RecordStore {
    /// Open the store, creating the data directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Directory {
            path: root.clone(),
            source,
        })?;
        debug!("Record store opened at {}", root.display());
        Ok(Self {
            root,
            locks: Default::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, slot: Slot) -> PathBuf {
        self.root.join(slot.file_name())
    }

    /// Load the content of a slot; an absent slot yields the empty container
    pub fn load<C>(&self, slot: Slot) -> Result<C, StoreError>
    where
        C: DeserializeOwned + Default,
    {
        read_slot(&self.path(slot), slot)
    }

    /// Replace the content of a slot
    pub fn save<C>(&self, slot: Slot, content: &C) -> Result<(), StoreError>
    where
        C: Serialize + ?Sized,
    {
        self.lock(slot).save(content)
    }

    /// Take the writer lock of a slot for a manual load-modify-save cycle
    pub fn lock(&self, slot: Slot) -> SlotGuard<'_> {
        SlotGuard {
            store: self,
            slot,
            _guard: self.locks[slot.index()].lock(),
        }
    }

    /// Load, mutate and save a slot under its writer lock
    pub fn update<C, R, F>(&self, slot: Slot, apply: F) -> Result<R, StoreError>
    where
        C: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut C) -> R,
    {
        let guard = self.lock(slot);
        let mut content: C = guard.load()?;
        let outcome = apply(&mut content);
        guard.save(&content)?;
        Ok(outcome)
    }
}

/// Exclusive access to one slot; released on drop
pub struct SlotGuard<'a> {
    store: &'a RecordStore,
    slot: Slot,
    _guard: MutexGuard<'a, ()>,
}

impl SlotGuard<'_> {
    pub fn load<C>(&self) -> Result<C, StoreError>
    where
        C: DeserializeOwned + Default,
    {
        read_slot(&self.store.path(self.slot), self.slot)
    }

    /// Write the full container to a temporary file, then rename it over the slot
    pub fn save<C>(&self, content: &C) -> Result<(), StoreError>
    where
        C: Serialize + ?Sized,
    {
        let slot = self.slot;
        let io_error = |source: io::Error| StoreError::Io { slot, source };

        let data = to_pretty_json(content).map_err(|source| StoreError::Serialize { slot, source })?;

        let mut file = NamedTempFile::new_in(&self.store.root).map_err(io_error)?;
        file.write_all(&data).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(self.store.path(slot))
            .map_err(|e| io_error(e.error))?;

        debug!("Saved {} slot ({} bytes)", slot, data.len());
        Ok(())
    }
}

fn read_slot<C>(path: &Path, slot: Slot) -> Result<C, StoreError>
where
    C: DeserializeOwned + Default,
{
    let mut text = String::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut text)
                .map_err(|source| StoreError::Io { slot, source })?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(C::default()),
        Err(source) => return Err(StoreError::Io { slot, source }),
    }

    // A zero-length file is what an interrupted first write leaves behind
    if text.trim().is_empty() {
        return Ok(C::default());
    }

    serde_json::from_str(&text).map_err(|source| StoreError::Malformed { slot, source })
}

/// Pretty JSON with four-space indentation
fn to_pretty_json<C>(content: &C) -> serde_json::Result<Vec<u8>>
where
    C: Serialize + ?Sized,
{
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    content.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn setup_test_store() -> (RecordStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path().join("data")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_absent_slots_load_empty() {
        let (store, _dir) = setup_test_store();

        for _ in 0..2 {
            let patients: Vec<serde_json::Value> = store.load(Slot::Patients).unwrap();
            assert!(patients.is_empty());

            let users: BTreeMap<String, String> = store.load(Slot::Users).unwrap();
            assert!(users.is_empty());
        }

        // Loading never creates the file
        assert!(!store.path(Slot::Patients).exists());
    }

    #[test]
    fn test_save_overwrites_whole_slot() {
        let (store, _dir) = setup_test_store();

        store.save(Slot::Doctors, &vec!["a", "b", "c"]).unwrap();
        store.save(Slot::Doctors, &vec!["d"]).unwrap();

        let doctors: Vec<String> = store.load(Slot::Doctors).unwrap();
        assert_eq!(doctors, vec!["d".to_string()]);
    }

    #[test]
    fn test_saved_file_is_indented_json() {
        let (store, _dir) = setup_test_store();

        let mut users = BTreeMap::new();
        users.insert("alice".to_string(), "digest".to_string());
        store.save(Slot::Users, &users).unwrap();

        let text = fs::read_to_string(store.path(Slot::Users)).unwrap();
        assert_eq!(text, "{\n    \"alice\": \"digest\"\n}");
    }

    #[test]
    fn test_malformed_slot_is_reported() {
        let (store, _dir) = setup_test_store();
        fs::write(store.path(Slot::Patients), "{ not json").unwrap();

        let result: Result<Vec<serde_json::Value>, _> = store.load(Slot::Patients);
        assert!(matches!(
            result,
            Err(StoreError::Malformed {
                slot: Slot::Patients,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let (store, _dir) = setup_test_store();
        fs::write(store.path(Slot::Doctors), "").unwrap();

        let doctors: Vec<serde_json::Value> = store.load(Slot::Doctors).unwrap();
        assert!(doctors.is_empty());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let (store, _dir) = setup_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .update(Slot::Patients, |items: &mut Vec<u32>| {
                                items.push(worker * 100 + i)
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let items: Vec<u32> = store.load(Slot::Patients).unwrap();
        assert_eq!(items.len(), 80);
    }

    #[test]
    fn test_slot_file_names() {
        let names: Vec<_> = Slot::ALL.iter().map(|s| s.file_name()).collect();
        assert_eq!(
            names,
            vec!["users.json", "patients.json", "doctors.json", "counters.json"]
        );
        assert_eq!(Slot::Users.to_string(), "users");
    }
}
