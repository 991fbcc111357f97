//! # Cache Registry
//!
//! Holds the configuration every cached method reads at call time:
//!
//! - the default [`CacheStore`]
//! - the [`CacheConfig`] (key version)
//! - the [`LocaleProvider`]
//! - the verbose-logging switch and the deployment [`Environment`]
//! - an optional type resolver used to recover from
//!   [`CacheError::UnresolvedType`](crate::CacheError::UnresolvedType)
//!
//! Build one explicitly with [`CacheRegistry::builder`] and share it through an
//! `Arc`, or use the lazily created [`CacheRegistry::global`] registry, which
//! starts with a [`MemoryStore`], version 1 and the `en` locale.
//!
//! # Examples
//!
//! ```
//! use cachette_core::{CacheKey, CacheRegistry, DigestOptions, FixedLocale, MemoryStore};
//! use std::sync::Arc;
//!
//! let registry = CacheRegistry::builder()
//!     .store(Arc::new(MemoryStore::new()))
//!     .locale_provider(FixedLocale::new("fr"))
//!     .build();
//!
//! let plain = DigestOptions { no_sha: true, ..DigestOptions::default() };
//! assert_eq!(registry.digest(&CacheKey::scalar("abc"), plain), "locale:fr:version:1:abc");
//!
//! registry.bump_version();
//! assert_eq!(registry.digest(&CacheKey::scalar("abc"), plain), "locale:fr:version:2:abc");
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{
    CacheConfig, CacheKey, CacheStore, DigestOptions, Environment, FixedLocale, KeyDigest,
    LocaleProvider, MemoryStore,
};

type TypeResolver = Arc<dyn Fn(&str) + Send + Sync>;

static GLOBAL_REGISTRY: Lazy<Arc<CacheRegistry>> =
    Lazy::new(|| Arc::new(CacheRegistry::builder().build()));

pub struct CacheRegistry {
    store: RwLock<Arc<dyn CacheStore>>,
    config: RwLock<CacheConfig>,
    locale: RwLock<Arc<dyn LocaleProvider>>,
    verbose_logging: AtomicBool,
    environment: RwLock<Environment>,
    type_resolver: RwLock<Option<TypeResolver>>,
}

impl CacheRegistry {
    /// Creates a registry around `store` with default settings.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::builder().store(store).build()
    }

    pub fn builder() -> CacheRegistryBuilder {
        CacheRegistryBuilder::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<CacheRegistry> {
        Arc::clone(&*GLOBAL_REGISTRY)
    }

    pub fn store(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&*self.store.read())
    }

    pub fn set_store(&self, store: Arc<dyn CacheStore>) {
        *self.store.write() = store;
    }

    pub fn config(&self) -> CacheConfig {
        self.config.read().clone()
    }

    pub fn set_config(&self, config: CacheConfig) {
        *self.config.write() = config;
    }

    pub fn version(&self) -> u64 {
        self.config.read().version
    }

    /// Increments the key version and returns the new value. Every versioned
    /// key computed afterwards differs from the ones computed before.
    pub fn bump_version(&self) -> u64 {
        let mut config = self.config.write();
        config.version += 1;
        tracing::debug!(version = config.version, "cache key version bumped");
        config.version
    }

    pub fn current_locale(&self) -> String {
        self.locale.read().current_locale()
    }

    pub fn set_locale_provider(&self, provider: impl LocaleProvider + 'static) {
        *self.locale.write() = Arc::new(provider);
    }

    pub fn set_verbose_logging(&self, enabled: bool) {
        self.verbose_logging.store(enabled, Ordering::Relaxed);
    }

    /// Whether cached methods log their composite keys. Always `false` in a
    /// production-like environment.
    pub fn verbose_logging_enabled(&self) -> bool {
        self.verbose_logging.load(Ordering::Relaxed) && !self.environment().is_production_like()
    }

    pub fn environment(&self) -> Environment {
        *self.environment.read()
    }

    pub fn set_environment(&self, environment: Environment) {
        *self.environment.write() = environment;
    }

    /// Registers the hook called with a type name before an
    /// unresolved-type fetch is retried.
    pub fn on_unresolved_type<F>(&self, resolver: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.type_resolver.write() = Some(Arc::new(resolver));
    }

    pub(crate) fn resolve_type(&self, type_name: &str) {
        let resolver = self.type_resolver.read().clone();
        if let Some(resolver) = resolver {
            resolver(type_name);
        }
    }

    /// Snapshot of the current version and locale.
    pub fn key_digest(&self) -> KeyDigest {
        KeyDigest::new(self.version(), self.current_locale())
    }

    /// Digests `key` against the current version and locale.
    ///
    /// The locale provider is only asked when the locale step is enabled.
    pub fn digest(&self, key: &CacheKey, options: DigestOptions) -> String {
        let locale = if options.no_locale {
            String::new()
        } else {
            self.current_locale()
        };
        KeyDigest::new(self.version(), locale).digest(key, options)
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("store", &self.store.read().name())
            .field("config", &*self.config.read())
            .field("verbose_logging", &self.verbose_logging.load(Ordering::Relaxed))
            .field("environment", &self.environment())
            .finish()
    }
}

/// Builder for [`CacheRegistry`]. Unset parts take their defaults: a fresh
/// [`MemoryStore`], `CacheConfig { version: 1 }`, the `en` locale, verbose
/// logging off, `Environment::Development`.
#[derive(Default)]
pub struct CacheRegistryBuilder {
    store: Option<Arc<dyn CacheStore>>,
    config: Option<CacheConfig>,
    locale: Option<Arc<dyn LocaleProvider>>,
    verbose_logging: bool,
    environment: Environment,
}

impl CacheRegistryBuilder {
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn locale_provider(mut self, provider: impl LocaleProvider + 'static) -> Self {
        self.locale = Some(Arc::new(provider));
        self
    }

    pub fn verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn build(self) -> CacheRegistry {
        CacheRegistry {
            store: RwLock::new(
                self.store
                    .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            ),
            config: RwLock::new(self.config.unwrap_or_default()),
            locale: RwLock::new(
                self.locale
                    .unwrap_or_else(|| Arc::new(FixedLocale::default())),
            ),
            verbose_logging: AtomicBool::new(self.verbose_logging),
            environment: RwLock::new(self.environment),
            type_resolver: RwLock::new(None),
        }
    }
}
