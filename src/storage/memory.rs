use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::storage::{Storage, StorageError};

/// Process-local storage. Writes can be switched off to simulate a failing device.
#[derive(Default, Debug)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Unavailable(format!("write to '{key}' rejected")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Unavailable(format!("removal of '{key}' rejected")));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
