//! The food log: an ordered, persisted, observable collection of entries.
//!
//! Every mutation is written through to the backing [`KeyValueStore`] before
//! the call returns, then observers are notified. Storage failures never
//! reach the caller; they are reported through `tracing` and the in-memory
//! log stays authoritative.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::events::{LogChange, LogEvent, Observers, SubscriptionId};
use crate::models::{FoodEntry, Totals};
use crate::scan::ScannedFood;
use crate::storage::KeyValueStore;

/// Key the serialized entries are stored under.
pub const STORAGE_KEY: &str = "food_entries";

/// Ordered log of food entries backed by a key-value store.
pub struct FoodLog<S: KeyValueStore> {
    store: S,
    entries: Vec<FoodEntry>,
    observers: Observers,
}

impl<S: KeyValueStore> FoodLog<S> {
    /// Creates an empty log without reading the store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Creates a log and loads whatever the store holds.
    pub fn open(store: S) -> Self {
        let mut log = Self::new(store);
        log.load();
        log
    }

    /// Replaces the in-memory entries with the persisted ones.
    ///
    /// A missing or unreadable value leaves the log as it was.
    pub fn load(&mut self) {
        let bytes = match self.store.get(STORAGE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No saved food log under '{}'", STORAGE_KEY);
                return;
            }
            Err(e) => {
                warn!("Failed to read food log: {}", e);
                return;
            }
        };

        let entries: Vec<FoodEntry> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable food log: {}", e);
                return;
            }
        };

        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id)) {
            warn!("Ignoring food log with duplicate entry id {}", dup.id);
            return;
        }

        debug!("Loaded {} food entries", entries.len());
        self.entries = entries;
        let event = LogEvent::Loaded {
            count: self.entries.len(),
        };
        self.observers.notify(&event, &self.entries);
    }

    /// Writes the full collection to the store, replacing the prior value.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save(&mut self) {
        let bytes = match serde_json::to_vec(&self.entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode food log, save skipped: {}", e);
                return;
            }
        };

        match self.store.put(STORAGE_KEY, &bytes) {
            Ok(()) => debug!("Saved {} food entries", self.entries.len()),
            Err(e) => warn!("Failed to save food log: {}", e),
        }
    }

    /// Appends a new entry and saves.
    pub fn add(&mut self, name: impl Into<String>, calories: u32, protein: u32) -> &FoodEntry {
        let entry = FoodEntry::new(name, calories, protein);
        let index = self.entries.len();
        self.entries.push(entry.clone());
        self.save();

        let event = LogEvent::Added { index, entry };
        self.observers.notify(&event, &self.entries);
        &self.entries[index]
    }

    /// Appends the result of a barcode scan.
    pub fn add_scanned(&mut self, food: ScannedFood) -> &FoodEntry {
        self.add(food.name, food.calories, food.protein)
    }

    /// Removes the entries at `positions` and saves.
    ///
    /// Positions refer to the ordering at call time. Duplicates are ignored
    /// and positions past the end are skipped. The save happens even when
    /// nothing was removed. Returns the removed entries in position order.
    pub fn delete<I>(&mut self, positions: I) -> Vec<FoodEntry>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.entries.len();
        let (in_range, out_of_range): (BTreeSet<usize>, BTreeSet<usize>) =
            positions.into_iter().partition(|&p| p < len);

        if !out_of_range.is_empty() {
            warn!(
                "Skipping out-of-range positions {:?} (log has {} entries)",
                out_of_range, len
            );
        }

        let mut removed: Vec<FoodEntry> = in_range
            .iter()
            .rev()
            .map(|&p| self.entries.remove(p))
            .collect();
        removed.reverse();
        self.save();

        let event = LogEvent::Deleted {
            entries: removed.clone(),
        };
        self.observers.notify(&event, &self.entries);
        removed
    }

    /// Removes the entry with `id`, if present.
    pub fn delete_by_id(&mut self, id: Uuid) -> Option<FoodEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        self.delete([position]).into_iter().next()
    }

    pub fn total_calories(&self) -> u64 {
        self.totals().calories
    }

    pub fn total_protein(&self) -> u64 {
        self.totals().protein
    }

    pub fn totals(&self) -> Totals {
        Totals::from_entries(&self.entries)
    }

    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&FoodEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers an observer called after every change.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&LogChange<'_>) + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore + fmt::Debug> fmt::Debug for FoodLog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodLog")
            .field("store", &self.store)
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::parse_payload;
    use crate::storage::{FileStore, MemoryStore, StorageError};
    use std::cell::RefCell;
    use std::io;
    use std::path::PathBuf;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::IoError(
                PathBuf::from("broken"),
                io::Error::new(io::ErrorKind::Other, "read failed"),
            ))
        }

        fn put(&mut self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::IoError(
                PathBuf::from("broken"),
                io::Error::new(io::ErrorKind::Other, "write failed"),
            ))
        }
    }

    fn sample_log() -> FoodLog<MemoryStore> {
        let mut log = FoodLog::new(MemoryStore::new());
        log.add("Apple", 95, 0);
        log.add("Chicken Breast", 165, 31);
        log
    }

    fn names<S: KeyValueStore>(log: &FoodLog<S>) -> Vec<&str> {
        log.entries().iter().map(|e| e.name.as_str()).collect()
    }

    fn stored_bytes(log: &FoodLog<MemoryStore>) -> Option<Vec<u8>> {
        log.store().get(STORAGE_KEY).unwrap()
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = FoodLog::new(MemoryStore::new());
        assert!(log.is_empty());
        assert_eq!(log.totals(), Totals::default());
    }

    #[test]
    fn test_add_two_entries_scenario() {
        let log = sample_log();

        assert_eq!(log.total_calories(), 260);
        assert_eq!(log.total_protein(), 31);
        assert_eq!(names(&log), vec!["Apple", "Chicken Breast"]);
    }

    #[test]
    fn test_delete_first_scenario() {
        let mut log = sample_log();

        let removed = log.delete([0]);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Apple");
        assert_eq!(names(&log), vec!["Chicken Breast"]);
        assert_eq!(log.total_calories(), 165);
        assert_eq!(log.total_protein(), 31);
    }

    #[test]
    fn test_totals_track_every_add() {
        let mut log = FoodLog::new(MemoryStore::new());
        let mut calories = 0u64;
        let mut protein = 0u64;

        for i in 0..25u32 {
            let (c, p) = (i * 37 % 500, i * 11 % 60);
            log.add(format!("food {}", i), c, p);
            calories += u64::from(c);
            protein += u64::from(p);

            assert_eq!(log.total_calories(), calories);
            assert_eq!(log.total_protein(), protein);
        }
    }

    #[test]
    fn test_add_saves_immediately() {
        let mut log = FoodLog::new(MemoryStore::new());
        let id = log.add("Egg", 78, 6).id;

        assert_eq!(log.store().put_count(), 1);
        let saved: Vec<FoodEntry> = serde_json::from_slice(&stored_bytes(&log).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
    }

    #[test]
    fn test_add_generates_unique_ids() {
        let mut log = FoodLog::new(MemoryStore::new());
        for _ in 0..10 {
            log.add("Same", 1, 1);
        }
        let ids: HashSet<Uuid> = log.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_save_and_reload_preserves_entries_and_ids() {
        let mut log = sample_log();
        log.add("Rice", 206, 4);
        let before = log.entries().to_vec();

        let reopened = FoodLog::open(log.into_store());

        assert_eq!(reopened.entries(), before.as_slice());
    }

    #[test]
    fn test_reload_across_file_stores() {
        let temp_dir = TempDir::new().unwrap();

        let mut log = FoodLog::open(FileStore::new(temp_dir.path().to_path_buf()));
        log.add("Apple", 95, 0);
        log.add("Chicken Breast", 165, 31);
        let before = log.entries().to_vec();
        drop(log);

        let reopened = FoodLog::open(FileStore::new(temp_dir.path().to_path_buf()));
        assert_eq!(reopened.entries(), before.as_slice());
        assert_eq!(reopened.total_calories(), 260);
    }

    #[test]
    fn test_delete_empty_set_still_saves() {
        let mut log = sample_log();
        let bytes_before = stored_bytes(&log);
        let puts_before = log.store().put_count();

        let removed = log.delete(std::iter::empty::<usize>());

        assert!(removed.is_empty());
        assert_eq!(names(&log), vec!["Apple", "Chicken Breast"]);
        assert_eq!(log.store().put_count(), puts_before + 1);
        assert_eq!(stored_bytes(&log), bytes_before);
    }

    #[test]
    fn test_delete_all_empties_log() {
        let mut log = sample_log();
        log.add("Rice", 206, 4);

        let removed = log.delete(0..log.len());

        assert_eq!(removed.len(), 3);
        assert!(log.is_empty());
        assert_eq!(log.total_calories(), 0);
        assert_eq!(log.total_protein(), 0);
        assert_eq!(stored_bytes(&log), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_delete_multiple_positions_uses_call_time_order() {
        let mut log = FoodLog::new(MemoryStore::new());
        for name in ["a", "b", "c", "d", "e"] {
            log.add(name, 1, 1);
        }

        let removed = log.delete([3, 1, 3]);

        let removed_names: Vec<&str> = removed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(removed_names, vec!["b", "d"]);
        assert_eq!(names(&log), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_delete_out_of_range_is_skipped() {
        let mut log = sample_log();

        let removed = log.delete([1, 2, 99]);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Chicken Breast");
        assert_eq!(names(&log), vec!["Apple"]);
    }

    #[test]
    fn test_delete_out_of_range_only_changes_nothing() {
        let mut log = sample_log();
        let bytes_before = stored_bytes(&log);

        assert!(log.delete([5]).is_empty());
        assert_eq!(log.len(), 2);
        assert_eq!(stored_bytes(&log), bytes_before);
    }

    #[test]
    fn test_delete_by_id() {
        let mut log = sample_log();
        let id = log.get(1).unwrap().id;

        let removed = log.delete_by_id(id).unwrap();

        assert_eq!(removed.name, "Chicken Breast");
        assert_eq!(names(&log), vec!["Apple"]);
    }

    #[test]
    fn test_delete_by_unknown_id_does_not_save() {
        let mut log = sample_log();
        let puts_before = log.store().put_count();

        assert!(log.delete_by_id(Uuid::new_v4()).is_none());
        assert_eq!(log.len(), 2);
        assert_eq!(log.store().put_count(), puts_before);
    }

    #[test]
    fn test_load_without_saved_data() {
        let log = FoodLog::open(MemoryStore::new());
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_corrupt_data_on_fresh_start() {
        let mut store = MemoryStore::new();
        store.put(STORAGE_KEY, b"{not valid json").unwrap();

        let log = FoodLog::open(store);
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_corrupt_data_keeps_prior_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        let path = store.path(STORAGE_KEY).unwrap();

        let mut log = FoodLog::open(store);
        log.add("Apple", 95, 0);
        let before = log.entries().to_vec();

        std::fs::write(&path, b"[{\"name\": 42}]").unwrap();
        log.load();

        assert_eq!(log.entries(), before.as_slice());
    }

    #[test]
    fn test_load_duplicate_ids_rejected() {
        let entry = FoodEntry::new("Apple", 95, 0);
        let bytes = serde_json::to_vec(&vec![entry.clone(), entry]).unwrap();
        let mut store = MemoryStore::new();
        store.put(STORAGE_KEY, &bytes).unwrap();

        let log = FoodLog::open(store);
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let mut store = MemoryStore::new();
        let saved = vec![FoodEntry::new("Oats", 150, 5)];
        store.put(STORAGE_KEY, &serde_json::to_vec(&saved).unwrap()).unwrap();

        let mut log = FoodLog::new(store);
        log.entries.push(FoodEntry::new("Unsaved", 1, 1));
        log.load();

        assert_eq!(log.entries(), saved.as_slice());
    }

    #[test]
    fn test_storage_failures_are_not_surfaced() {
        let mut log = FoodLog::open(BrokenStore);
        assert!(log.is_empty());

        log.add("Apple", 95, 0);
        log.add("Chicken Breast", 165, 31);
        log.delete([0]);
        log.save();

        assert_eq!(names(&log), vec!["Chicken Breast"]);
        assert_eq!(log.total_calories(), 165);
    }

    #[test]
    fn test_add_scanned_payload() {
        let mut log = FoodLog::new(MemoryStore::new());

        if let Some(food) = parse_payload("Banana:105:1") {
            log.add_scanned(food);
        }
        if let Some(food) = parse_payload("Banana:abc:1") {
            log.add_scanned(food);
        }

        assert_eq!(log.len(), 1);
        let entry = log.get(0).unwrap();
        assert_eq!(entry.name, "Banana");
        assert_eq!(entry.calories, 105);
        assert_eq!(entry.protein, 1);
    }

    #[test]
    fn test_observers_see_consistent_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = FoodLog::new(MemoryStore::new());

        let sink = Rc::clone(&seen);
        log.subscribe(move |change| {
            sink.borrow_mut()
                .push((change.event.clone(), change.entries.len(), change.totals));
        });

        let apple = log.add("Apple", 95, 0).clone();
        log.add("Chicken Breast", 165, 31);
        log.delete([0]);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[0],
            (
                LogEvent::Added {
                    index: 0,
                    entry: apple.clone()
                },
                1,
                Totals {
                    calories: 95,
                    protein: 0
                }
            )
        );
        assert_eq!(seen[1].2.calories, 260);
        assert_eq!(
            seen[2],
            (
                LogEvent::Deleted {
                    entries: vec![apple]
                },
                1,
                Totals {
                    calories: 165,
                    protein: 31
                }
            )
        );
    }

    #[test]
    fn test_observer_notified_on_load() {
        let counts = Rc::new(RefCell::new(Vec::new()));
        let mut log = sample_log();
        let store = log.store().clone();

        let mut reopened = FoodLog::new(store);
        let sink = Rc::clone(&counts);
        reopened.subscribe(move |change| {
            if let LogEvent::Loaded { count } = change.event {
                sink.borrow_mut().push(*count);
            }
        });
        reopened.load();
        log.add("ignored", 0, 0);

        assert_eq!(*counts.borrow(), vec![2]);
    }

    #[test]
    fn test_unsubscribed_observer_not_called() {
        let calls = Rc::new(RefCell::new(0));
        let mut log = FoodLog::new(MemoryStore::new());

        let counter = Rc::clone(&calls);
        let id = log.subscribe(move |_| *counter.borrow_mut() += 1);
        log.add("Apple", 95, 0);

        assert!(log.unsubscribe(id));
        log.add("Pear", 57, 0);

        assert_eq!(*calls.borrow(), 1);
    }
}
