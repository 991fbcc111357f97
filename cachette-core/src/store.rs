//! # Cache Store
//!
//! The backend contract consumed by cached methods. A store is an opaque
//! key-value cache addressed by string keys; values are the serialized bytes
//! of a method's return value.
//!
//! Implementations must:
//!
//! - call `compute` at most once per `fetch`, and only when no valid entry
//!   exists for `key`
//! - persist the computed payload according to `options.expires_in`
//! - leave the store untouched when `compute` fails, and return its error
//!
//! Stores are shared (`Send + Sync`); `fetch` and `delete` are expected to be
//! atomic with respect to each other per key. Nothing here prevents two
//! concurrent misses on one key from both computing.

use std::sync::Arc;

use crate::{Result, StoreOptions};

/// The zero-argument closure a store calls on a miss.
pub type Compute<'a> = &'a mut dyn FnMut() -> Result<Vec<u8>>;

pub trait CacheStore: Send + Sync {
    /// Returns the payload stored under `key`, or computes, stores and
    /// returns a new one.
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>>;

    /// Removes `key`. Returns `true` when an entry was present.
    fn delete(&self, key: &str) -> Result<bool>;

    /// A short name used in log lines.
    fn name(&self) -> &str {
        "store"
    }
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>> {
        (**self).fetch(key, options, compute)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: CacheStore + ?Sized> CacheStore for Box<S> {
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>> {
        (**self).fetch(key, options, compute)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
