use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::storage::{Key, Storage, StorageError};

/// One `<key>.json` file per key.
#[derive(Clone, Debug)]
#[must_use]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: Key) -> PathBuf {
        self.root.join(key.as_str()).with_extension("json")
    }
}

impl Storage for DirectoryStorage {
    #[instrument(skip_all, fields(key = key.as_str()))]
    fn get(&self, key: Key) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    #[instrument(skip_all, fields(key = key.as_str()))]
    fn set(&mut self, key: Key, value: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        fs::create_dir_all(&self.root)
            .and_then(|()| fs::write(&path, value))
            .map_err(|source| StorageError::Write { path, source })
    }
}
