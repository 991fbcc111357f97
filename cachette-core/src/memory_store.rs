use dashmap::DashMap;

use crate::{CacheEntry, CacheStore, Compute, Expiration, Result, StoreOptions};

/// An in-process [`CacheStore`] backed by a `DashMap`.
///
/// This is the store a [`CacheRegistry`](crate::CacheRegistry) starts with when
/// none is supplied. Entries expire lazily: an expired entry is dropped when it
/// is next fetched. There is no size limit and no eviction.
///
/// # Thread Safety
///
/// `DashMap` shards its locks, so concurrent fetches of different keys do not
/// contend. No shard lock is held while `compute` runs; two threads missing on
/// the same key at the same time will both compute, and the last write wins.
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheStore, Expiration, MemoryStore, StoreOptions};
///
/// let store = MemoryStore::new();
/// let options = StoreOptions { expires_in: Expiration::Never };
///
/// let first = store.fetch("k", &options, &mut || Ok(b"v1".to_vec())).unwrap();
/// let second = store.fetch("k", &options, &mut || Ok(b"v2".to_vec())).unwrap();
/// assert_eq!(first, b"v1");
/// assert_eq!(second, b"v1");
///
/// assert!(store.delete("k").unwrap());
/// assert!(!store.contains_key("k"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a live entry without computing anything.
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    pub fn write(&self, key: &str, value: Vec<u8>, expires_in: Expiration) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, expires_in));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read(key).is_some()
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl CacheStore for MemoryStore {
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>> {
        if let Some(value) = self.read(key) {
            return Ok(value);
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired());

        let value = compute()?;
        self.write(key, value.clone(), options.expires_in);
        Ok(value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
