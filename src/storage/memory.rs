use std::collections::HashMap;

use super::{KeyValueStore, StorageError};

/// In-process key-value store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u8>>,
    put_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls since creation.
    pub fn put_count(&self) -> usize {
        self.put_count
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), bytes.to_vec());
        self.put_count += 1;
        Ok(())
    }
}
