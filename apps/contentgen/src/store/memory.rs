use std::cell::RefCell;
use std::collections::HashMap;

use super::{KeyValueStore, Result, StoreError};

/// In-memory store for runs without a data directory, and for tests.
///
/// `RefCell` is enough: the store is only touched from the command loop.
#[derive(Default)]
pub struct MemStore {
    values: RefCell<HashMap<String, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail.
    #[cfg(test)]
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }
}

impl KeyValueStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(StoreError::Backend("Simulated write error".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_is_none() {
        assert_eq!(MemStore::new().get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemStore::new();
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_simulated_write_error() {
        let store = MemStore::new();
        store.set_simulate_write_error(true);
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
