use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::storage::{Key, Storage, StorageError};

/// In-process storage. Clones share the same contents.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct MemoryStorage {
    values: Rc<RefCell<BTreeMap<Key, String>>>,

    /// Maximum total size of the stored values in bytes.
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn with_quota(quota: usize) -> Self {
        Self { values: Rc::default(), quota: Some(quota) }
    }

    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.values.borrow().values().map(String::len).sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: Key) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(&key).cloned())
    }

    fn set(&mut self, key: Key, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.borrow_mut();
        if let Some(quota) = self.quota {
            let others: usize =
                values.iter().filter(|(k, _)| **k != key).map(|(_, value)| value.len()).sum();
            let required = others + value.len();
            if required > quota {
                return Err(StorageError::QuotaExceeded { key: key.as_str(), required, quota });
            }
        }
        values.insert(key, value.to_owned());
        drop(values);
        Ok(())
    }
}
