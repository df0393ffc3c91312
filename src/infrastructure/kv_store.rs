//! Key-value persistence adapter.
//!
//! The quote store only ever needs whole-value `get`/`set` on string keys,
//! so durable and session storage both sit behind this trait.

use std::collections::HashMap;

use crate::domain::Result;

/// String key-value storage.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key` if present.
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory storage that lives as long as the process.
///
/// Backs session storage and stands in for durable storage in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one entry already present.
    #[cfg(test)]
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_last_writer_wins() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("quotes").unwrap(), None);

        store.set("quotes", "[]").unwrap();
        store.set("quotes", "[1]").unwrap();
        assert_eq!(store.get("quotes").unwrap().as_deref(), Some("[1]"));

        store.remove("quotes").unwrap();
        assert_eq!(store.get("quotes").unwrap(), None);
    }

    #[test]
    fn test_with_entry() {
        let store = MemoryStore::with_entry("selectedCategory", "Life");
        assert_eq!(
            store.get("selectedCategory").unwrap().as_deref(),
            Some("Life")
        );
    }
}
