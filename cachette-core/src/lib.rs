//! # Cachette Core
//!
//! Core types for the Cachette method-caching library.
//!
//! This crate provides the building blocks behind `#[caches_method]` and
//! `#[caches_class_method]`: deterministic key digests, the store contract,
//! per-object memos and the binders that put them together.
//!
//! ## Features
//!
//! - **Key Digests**: Normalize a key, mix in the key version and locale, hash with SHA-1
//! - **Instance Methods**: Per-object memo in front of a shared store
//! - **Class Methods**: Store-only caching keyed by the argument list
//! - **Layered Options**: Per-method over per-class over library defaults
//! - **Pluggable Stores**: Any [`CacheStore`]; [`MemoryStore`] ships as the default
//! - **Load-Order Recovery**: A fetch failing on an unresolved type is retried once
//!
//! ## Module Organization
//!
//! - [`keys`] - The [`CacheKey`] value model and its normalization
//! - [`digest`] - [`KeyDigest`], the four-step key pipeline
//! - [`options`] - [`CachingOptions`] and their merge rules
//! - [`store`] / [`memory_store`] - The store contract and the in-memory store
//! - [`registry`] - Process-wide configuration ([`CacheRegistry`])
//! - [`class`] / [`method`] - Binding methods to a [`CachedClass`]
//!
mod binding;
mod cache_entry;
mod config;
mod error;
mod locale;
mod memo;

pub mod class;
pub mod digest;
pub mod keys;
pub mod memory_store;
pub mod method;
pub mod options;
pub mod registry;
pub mod store;

#[cfg(feature = "stats")]
mod stats;

#[cfg(feature = "stats")]
pub mod stats_registry;

pub use binding::{CacheValue, MethodKind};
pub use cache_entry::CacheEntry;
pub use class::CachedClass;
pub use config::{CacheConfig, Environment};
pub use digest::{DigestOptions, KeyDigest};
pub use error::{CacheError, Result};
pub use keys::{CacheKey, ToCacheKey};
pub use locale::{FixedLocale, LocaleProvider};
pub use memo::{InstanceMemo, MemoSlot};
pub use memory_store::MemoryStore;
pub use method::{
    CacheHost, Cacheable, CachedClassMethod, CachedInstanceMethod, ClassKey, ClassMethodBuilder,
    InstanceMethodBuilder, WithKey,
};
pub use options::{CachingOptions, Expiration, StoreOptions, DEFAULT_EXPIRES_IN};
pub use registry::{CacheRegistry, CacheRegistryBuilder};
pub use store::{CacheStore, Compute};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
