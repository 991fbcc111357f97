//! # Cachette
//!
//! Method-level memoization over pluggable cache stores, with versioned,
//! locale-aware SHA-1 key digests.
//!
//! ## Features
//!
//! - **Two caching fronts**: instance methods memoize per object in front of the
//!   store; class methods share results through the store only
//! - **Deterministic keys**: keys are normalized, prefixed with the key version
//!   and locale, then hashed with SHA-1
//! - **Global invalidation**: bumping the key version orphans every versioned entry
//! - **Layered options**: per-method over per-class over library defaults
//! - **Attribute macros**: `#[caches_method]` and `#[caches_class_method]`
//!
//! ## Quick Start
//!
//! ```rust
//! use cachette::{caches_method, CacheHost, CacheKey, Cacheable, CachedClass, InstanceMemo};
//! use once_cell::sync::Lazy;
//!
//! struct Product {
//!     id: u64,
//!     base_price: f64,
//!     memo: InstanceMemo,
//! }
//!
//! impl Cacheable for Product {
//!     fn cache_id(&self) -> CacheKey {
//!         CacheKey::scalar(self.id)
//!     }
//!
//!     fn cache_memo(&self) -> &InstanceMemo {
//!         &self.memo
//!     }
//! }
//!
//! impl CacheHost for Product {
//!     fn cache_class() -> &'static CachedClass {
//!         static CLASS: Lazy<CachedClass> = Lazy::new(|| CachedClass::new("QuickStartProduct"));
//!         &CLASS
//!     }
//! }
//!
//! impl Product {
//!     #[caches_method(expires_in = 3600)]
//!     fn compute_price(&self) -> f64 {
//!         self.base_price * 1.21
//!     }
//! }
//!
//! let product = Product { id: 7, base_price: 100.0, memo: InstanceMemo::new() };
//! let first = product.compute_price_via_cache().unwrap();
//! let second = product.compute_price_via_cache().unwrap();
//! assert_eq!(first, second);
//! assert!(product.clear_cache_compute_price().unwrap());
//! ```
//!
//! ## Without Macros
//!
//! ```rust
//! use cachette::{CachedClass, CacheRegistry, CachingOptions, ClassKey};
//! use std::sync::Arc;
//!
//! let class = CachedClass::with_registry("Exchange", Arc::new(CacheRegistry::builder().build()));
//! let rate = class
//!     .caches_class_method("rate", |pair: &(String, String)| {
//!         if pair.0 == pair.1 { 1.0 } else { 0.92 }
//!     })
//!     .options(CachingOptions::new().never_expires())
//!     .with_key(ClassKey::call(|pair: &(String, String)| format!("{}{}", pair.0, pair.1)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(rate.call(("USD".into(), "EUR".into())).unwrap(), 0.92);
//! ```

pub use cachette_core::*;
pub use cachette_macros::{caches_class_method, caches_method};

// Code generated by the macros names core types through this path.
#[doc(hidden)]
pub use cachette_core as __core;

/// Replace the store of the global registry
///
/// Classes without their own store pick the new one up on their next call.
pub fn set_cache_store(store: std::sync::Arc<dyn CacheStore>) {
    CacheRegistry::global().set_store(store);
}

/// Replace the key configuration of the global registry
///
/// # Examples
///
/// ```rust
/// use cachette::{cache_config, set_cache_config, CacheConfig};
///
/// set_cache_config(CacheConfig { version: 3 });
/// assert_eq!(cache_config().version, 3);
/// ```
pub fn set_cache_config(config: CacheConfig) {
    CacheRegistry::global().set_config(config);
}

/// The key configuration of the global registry
pub fn cache_config() -> CacheConfig {
    CacheRegistry::global().config()
}

/// Bump the global key version
///
/// Every versioned key computed afterwards differs from the ones computed
/// before, so all such entries are effectively invalidated at once. Stores
/// are not touched; old entries expire on their own.
///
/// # Returns
///
/// The new version
pub fn bump_cache_version() -> u64 {
    CacheRegistry::global().bump_version()
}

/// Digest `key` against the global registry's version and locale
///
/// # Examples
///
/// ```rust
/// use cachette::{digest, CacheKey, DigestOptions};
///
/// let options = DigestOptions { no_version: true, no_locale: true, no_sha: false };
/// assert_eq!(
///     digest(&CacheKey::scalar("abc"), options),
///     "a9993e364706816aba3e25717850c26c9cd0d89d"
/// );
/// ```
pub fn digest(key: &CacheKey, options: DigestOptions) -> String {
    CacheRegistry::global().digest(key, options)
}
