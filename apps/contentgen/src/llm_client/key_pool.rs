//! Credential pool with a rotation cursor.
//!
//! The token list is fixed at construction. Only the cursor moves, and it
//! always stays inside `0..len` while the pool is non-empty.

/// Ordered set of API keys plus the position of the key to try next.
#[derive(Clone, Default)]
pub struct KeyPool {
    keys: Vec<String>,
    cursor: usize,
}

impl KeyPool {
    /// Builds a pool from raw entries, dropping empty and whitespace-only ones.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|k| !k.trim().is_empty())
            .collect();
        Self { keys, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The key under the cursor, or `None` for an empty pool.
    pub fn current(&self) -> Option<&str> {
        self.keys.get(self.cursor).map(String::as_str)
    }

    /// Moves the cursor one slot around the ring. No-op on an empty pool.
    pub fn advance(&mut self) {
        if !self.keys.is_empty() {
            self.cursor = (self.cursor + 1) % self.keys.len();
        }
    }
}

impl std::fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPool")
            .field("len", &self.keys.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
