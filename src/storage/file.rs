use std::fs;
use std::io;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// File extension for stored values.
const EXTENSION: &str = "json";

/// Filesystem-backed key-value store.
///
/// Each key maps to one file in the data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a new store rooted at `data_dir`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.{}", key, EXTENSION)))
    }

    /// Checks if a value exists on disk for the key.
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).map(|p| p.exists()).unwrap_or(false)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path(key)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    /// Writes through a temporary sibling file and renames it into place,
    /// so a failed write leaves the previous value intact.
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path(key)?;

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let tmp_path = path.with_extension(format!("{}.tmp", EXTENSION));
        fs::write(&tmp_path, bytes).map_err(|e| StorageError::IoError(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, &path).map_err(|e| StorageError::IoError(path, e))?;

        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let unsafe_key = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\');

    if unsafe_key {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
