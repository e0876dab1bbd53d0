//! Key-value byte storage for persisting the food log.
//!
//! The log only needs two operations from its backing store: read the bytes
//! stored under a key, and overwrite them. Implementations decide where the
//! bytes live.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    #[error("I/O error for {path}: {1}", path = .0.display())]
    IoError(PathBuf, #[source] io::Error),

    /// Key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A store of opaque byte values addressed by string keys.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored under the key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `bytes` under `key`, replacing any prior value.
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, bytes)
    }
}
