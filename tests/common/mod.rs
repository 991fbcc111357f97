// Shared helpers for the integration tests

#![allow(dead_code)]

use cachette::{CacheRegistry, CacheStore, Compute, MemoryStore, Result, StoreOptions};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A `MemoryStore` that counts what cached methods ask of it.
#[derive(Default)]
pub struct SpyStore {
    pub inner: MemoryStore,
    pub fetches: AtomicUsize,
    pub computes: AtomicUsize,
    pub deletes: AtomicUsize,
    pub keys: Mutex<Vec<String>>,
    pub options: Mutex<Vec<StoreOptions>>,
}

impl SpyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn computes(&self) -> usize {
        self.computes.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.keys.lock().last().cloned()
    }

    pub fn last_options(&self) -> Option<StoreOptions> {
        self.options.lock().last().copied()
    }
}

impl CacheStore for SpyStore {
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().push(key.to_string());
        self.options.lock().push(*options);

        let computes = &self.computes;
        self.inner.fetch(key, options, &mut || {
            computes.fetch_add(1, Ordering::SeqCst);
            compute()
        })
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }

    fn name(&self) -> &str {
        "spy"
    }
}

/// A registry of its own around a fresh spy store.
pub fn spy_registry() -> (Arc<SpyStore>, Arc<CacheRegistry>) {
    let store = SpyStore::new();
    let registry = Arc::new(CacheRegistry::new(store.clone()));
    (store, registry)
}
