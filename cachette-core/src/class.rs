use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::binding::validate_method_name;
use crate::method::{ClassMethodBuilder, InstanceMethodBuilder};
use crate::{
    CacheRegistry, CacheStore, CacheValue, Cacheable, CachedClassMethod, CachedInstanceMethod,
    CachingOptions, Result, ToCacheKey,
};

struct ClassInner {
    name: String,
    registry: Arc<CacheRegistry>,
    store: RwLock<Option<Arc<dyn CacheStore>>>,
    defaults: RwLock<CachingOptions>,
}

/// The caching context of one type: its name (the store key namespace), an
/// optional store override and class-wide default options.
///
/// Cloning is cheap and clones share state, so a store or default-options
/// change is seen by every method built from the class.
///
/// # Examples
///
/// ```
/// use cachette_core::{CachedClass, CacheRegistry, CachingOptions};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let class = CachedClass::with_registry("Report", Arc::new(CacheRegistry::builder().build()));
/// class.set_default_options(CachingOptions::new().expires_in(Duration::from_secs(60)));
///
/// let entries: [(&str, fn(&()) -> u32); 2] = [("daily", |_| 1), ("weekly", |_| 7)];
/// let methods = class.caches_class_methods(entries, CachingOptions::new()).unwrap();
///
/// assert_eq!(methods.len(), 2);
/// assert_eq!(methods[1].call(()).unwrap(), 7);
/// ```
#[derive(Clone)]
pub struct CachedClass {
    inner: Arc<ClassInner>,
}

impl CachedClass {
    /// A class bound to the global registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, CacheRegistry::global())
    }

    pub fn with_registry(name: impl Into<String>, registry: Arc<CacheRegistry>) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                registry,
                store: RwLock::new(None),
                defaults: RwLock::new(CachingOptions::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.inner.registry
    }

    /// The class's store override, or the registry's store.
    pub fn store(&self) -> Arc<dyn CacheStore> {
        match &*self.inner.store.read() {
            Some(store) => Arc::clone(store),
            None => self.inner.registry.store(),
        }
    }

    pub fn set_store(&self, store: Arc<dyn CacheStore>) {
        tracing::debug!(class = %self.inner.name, store = store.name(), "class store overridden");
        *self.inner.store.write() = Some(store);
    }

    /// Falls back to the registry's store again.
    pub fn reset_store(&self) {
        *self.inner.store.write() = None;
    }

    /// Merges `options` into the class defaults; set fields in `options` win.
    /// Only methods built afterwards see the change.
    pub fn set_default_options(&self, options: CachingOptions) {
        let mut defaults = self.inner.defaults.write();
        *defaults = options.merged_over(&defaults);
    }

    /// The class defaults over the library defaults.
    pub fn default_options(&self) -> CachingOptions {
        let defaults = *self.inner.defaults.read();
        defaults.merged_over(&CachingOptions::library_defaults())
    }

    /// Starts building a cached instance method named `name` around `original`.
    pub fn caches_method<R, A, V, F>(&self, name: &str, original: F) -> InstanceMethodBuilder<R, A, V>
    where
        R: Cacheable,
        V: CacheValue,
        F: Fn(&R, &A) -> V + Send + Sync + 'static,
    {
        InstanceMethodBuilder::new(self.clone(), name, Arc::new(original))
    }

    /// Starts building a cached class method named `name` around `original`.
    pub fn caches_class_method<A, V, F>(&self, name: &str, original: F) -> ClassMethodBuilder<A, V>
    where
        A: ToCacheKey,
        V: CacheValue,
        F: Fn(&A) -> V + Send + Sync + 'static,
    {
        ClassMethodBuilder::new(self.clone(), name, Arc::new(original))
    }

    /// Registers several instance methods sharing the same options.
    ///
    /// Every name is validated before anything is built; the first invalid
    /// name fails the whole call.
    pub fn caches_methods<R, A, V, F, N, I>(
        &self,
        entries: I,
        options: CachingOptions,
    ) -> Result<Vec<CachedInstanceMethod<R, A, V>>>
    where
        R: Cacheable,
        V: CacheValue,
        F: Fn(&R, &A) -> V + Send + Sync + 'static,
        N: AsRef<str>,
        I: IntoIterator<Item = (N, F)>,
    {
        let entries = validated(entries)?;
        entries
            .into_iter()
            .map(|(name, original)| {
                self.caches_method(name.as_ref(), original)
                    .options(options)
                    .build()
            })
            .collect()
    }

    /// Class-method counterpart of [`caches_methods`](Self::caches_methods).
    pub fn caches_class_methods<A, V, F, N, I>(
        &self,
        entries: I,
        options: CachingOptions,
    ) -> Result<Vec<CachedClassMethod<A, V>>>
    where
        A: ToCacheKey,
        V: CacheValue,
        F: Fn(&A) -> V + Send + Sync + 'static,
        N: AsRef<str>,
        I: IntoIterator<Item = (N, F)>,
    {
        let entries = validated(entries)?;
        entries
            .into_iter()
            .map(|(name, original)| {
                self.caches_class_method(name.as_ref(), original)
                    .options(options)
                    .build()
            })
            .collect()
    }
}

fn validated<N, F, I>(entries: I) -> Result<Vec<(N, F)>>
where
    N: AsRef<str>,
    I: IntoIterator<Item = (N, F)>,
{
    let entries: Vec<(N, F)> = entries.into_iter().collect();
    for (name, _) in &entries {
        validate_method_name(name.as_ref())?;
    }
    Ok(entries)
}

impl fmt::Debug for CachedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedClass")
            .field("name", &self.inner.name)
            .field("store", &self.store().name())
            .field("defaults", &*self.inner.defaults.read())
            .finish()
    }
}
