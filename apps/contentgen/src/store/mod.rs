// Persistent key-value store for saved prompts and the last generated text.
// `KeyValueStore` handles the raw I/O; the helpers below own the key names
// and value encodings.

pub mod fs;
pub mod memory;

use thiserror::Error;
use tracing::debug;

pub use fs::FsStore;
pub use memory::MemStore;

pub const SAVED_PROMPTS_KEY: &str = "saved_prompts";
pub const LAST_CONTENT_KEY: &str = "last_content";
pub const LAST_TRANSLATION_KEY: &str = "last_translation";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no data directory available for this platform")]
    NoDataDir,

    #[error("{0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Raw string storage. Implementations take `&self`; mutation goes through
/// interior mutability or the filesystem.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ────────────────────────────────────────────────────────────────────────────
// Typed helpers
// ────────────────────────────────────────────────────────────────────────────

/// Saved prompts in insertion order. A missing key is an empty list.
pub fn saved_prompts(store: &dyn KeyValueStore) -> Result<Vec<String>> {
    match store.get(SAVED_PROMPTS_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Appends `prompt` and returns its 1-based position.
pub fn save_prompt(store: &dyn KeyValueStore, prompt: &str) -> Result<usize> {
    let mut prompts = saved_prompts(store)?;
    prompts.push(prompt.to_string());
    store.set(SAVED_PROMPTS_KEY, &serde_json::to_string(&prompts)?)?;
    debug!("Saved prompt #{}", prompts.len());
    Ok(prompts.len())
}

/// Looks up a saved prompt by 1-based index.
pub fn saved_prompt(store: &dyn KeyValueStore, index: usize) -> Result<Option<String>> {
    let prompts = saved_prompts(store)?;
    Ok(index
        .checked_sub(1)
        .and_then(|i| prompts.get(i))
        .cloned())
}

pub fn last_content(store: &dyn KeyValueStore) -> Result<Option<String>> {
    store.get(LAST_CONTENT_KEY)
}

pub fn set_last_content(store: &dyn KeyValueStore, content: &str) -> Result<()> {
    store.set(LAST_CONTENT_KEY, content)
}

pub fn last_translation(store: &dyn KeyValueStore) -> Result<Option<String>> {
    store.get(LAST_TRANSLATION_KEY)
}

pub fn set_last_translation(store: &dyn KeyValueStore, content: &str) -> Result<()> {
    store.set(LAST_TRANSLATION_KEY, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_prompts_start_empty() {
        let store = MemStore::new();
        assert!(saved_prompts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_save_prompt_appends_in_order() {
        let store = MemStore::new();
        assert_eq!(save_prompt(&store, "first").unwrap(), 1);
        assert_eq!(save_prompt(&store, "second").unwrap(), 2);
        assert_eq!(saved_prompts(&store).unwrap(), vec!["first", "second"]);
        assert_eq!(saved_prompt(&store, 2).unwrap().as_deref(), Some("second"));
        assert_eq!(saved_prompt(&store, 0).unwrap(), None);
        assert_eq!(saved_prompt(&store, 3).unwrap(), None);
    }

    #[test]
    fn test_prompts_are_stored_as_json_array() {
        let store = MemStore::new();
        save_prompt(&store, "a \"quoted\" prompt").unwrap();
        let raw = store.get(SAVED_PROMPTS_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"["a \"quoted\" prompt"]"#);
    }

    #[test]
    fn test_corrupt_prompt_list_is_an_error() {
        let store = MemStore::new();
        store.set(SAVED_PROMPTS_KEY, "not json").unwrap();
        assert!(matches!(saved_prompts(&store), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_last_content_and_translation_are_independent() {
        let store = MemStore::new();
        set_last_content(&store, "### Hello").unwrap();
        assert_eq!(last_content(&store).unwrap().as_deref(), Some("### Hello"));
        assert_eq!(last_translation(&store).unwrap(), None);

        set_last_translation(&store, "### Hola").unwrap();
        assert_eq!(last_content(&store).unwrap().as_deref(), Some("### Hello"));
        assert_eq!(last_translation(&store).unwrap().as_deref(), Some("### Hola"));
    }
}
