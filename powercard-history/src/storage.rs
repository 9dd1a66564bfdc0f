mod directory;
mod memory;

use std::{io, path::PathBuf};

pub use self::{directory::DirectoryStorage, memory::MemoryStorage};

/// Passive key-value medium holding JSON text.
pub trait Storage {
    fn get(&self, key: Key) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: Key, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: Key) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: Key, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Key {
    /// Hourly buckets of every entity.
    History,

    /// Last computed snapshot.
    Snapshot,
}

impl Key {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "powercard_history",
            Self::Snapshot => "powercard_averages",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storing `{key}` would take {required} bytes, quota is {quota} bytes")]
    QuotaExceeded { key: &'static str, required: usize, quota: usize },

    #[error("failed to serialize `{key}`")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize `{key}`")]
    Deserialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
