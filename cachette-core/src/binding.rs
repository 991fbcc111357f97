use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::{CacheError, CacheKey, CachedClass, CachingOptions, InstanceMemo, MemoSlot, Result};

/// Values a cached method can return.
///
/// Values cross the store as JSON, and are cloned into and out of instance
/// memos. Blanket-implemented for every type with the required bounds.
pub trait CacheValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

pub(crate) type AfterLoad<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// Which kind of method a binding fronts. Decides the store key namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Keys look like `<Class>:<method>:<digest>`.
    Instance,
    /// Keys look like `<Class>:class:<method>:<digest>`.
    Class,
}

impl MethodKind {
    fn store_prefix(self, class: &str, method: &str) -> String {
        match self {
            MethodKind::Instance => format!("{}:{}", class, method),
            MethodKind::Class => format!("{}:class:{}", class, method),
        }
    }
}

pub(crate) fn validate_method_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(':') {
        return Err(CacheError::InvalidMethodName(name.to_string()));
    }
    Ok(())
}

/// The wrap algorithm shared by instance and class methods.
///
/// Options are resolved once, when the binding is built: the caller's options
/// over the class defaults over the library defaults. The store is looked up
/// on every call so a class or registry can swap it at runtime.
pub(crate) struct MethodBinding<V> {
    class: CachedClass,
    method: String,
    prefix: String,
    options: CachingOptions,
    after_load: Option<AfterLoad<V>>,
    #[cfg(feature = "stats")]
    stats: Arc<CacheStats>,
}

impl<V: CacheValue> MethodBinding<V> {
    pub(crate) fn new(
        class: CachedClass,
        kind: MethodKind,
        method: &str,
        options: CachingOptions,
        after_load: Option<AfterLoad<V>>,
    ) -> Result<Self> {
        validate_method_name(method)?;

        let prefix = kind.store_prefix(class.name(), method);
        let options = options.merged_over(&class.default_options());

        Ok(Self {
            #[cfg(feature = "stats")]
            stats: crate::stats_registry::register(&prefix),
            class,
            method: method.to_string(),
            prefix,
            options,
            after_load,
        })
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn options(&self) -> &CachingOptions {
        &self.options
    }

    #[cfg(feature = "stats")]
    pub(crate) fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    pub(crate) fn digest(&self, key: &CacheKey) -> String {
        self.class
            .registry()
            .digest(key, self.options.digest_options())
    }

    pub(crate) fn store_key(&self, digest: &str) -> String {
        format!("{}:{}", self.prefix, digest)
    }

    pub(crate) fn memo_slot(&self, digest: &str) -> MemoSlot {
        MemoSlot::new(self.prefix.as_str(), digest)
    }

    /// Resolves one call: memo, then the `bypass` predicate, then the store.
    ///
    /// `bypass` is only evaluated on a memo miss. A bypassed value is memoized
    /// but never written to the store.
    pub(crate) fn resolve<B, C>(
        &self,
        memo: Option<&InstanceMemo>,
        key: &CacheKey,
        bypass: B,
        compute: C,
    ) -> Result<V>
    where
        B: FnOnce() -> bool,
        C: Fn() -> V,
    {
        let digest = self.digest(key);
        let slot = self.memo_slot(&digest);

        if let Some(value) = memo.and_then(|memo| memo.get::<V>(&slot)) {
            tracing::debug!(method = %self.prefix, digest = %digest, "memo hit");
            #[cfg(feature = "stats")]
            self.stats.record_memo_hit();
            return Ok(value);
        }

        let value = if bypass() {
            tracing::debug!(method = %self.prefix, "cache bypassed by predicate");
            #[cfg(feature = "stats")]
            self.stats.record_bypass();
            compute()
        } else {
            self.fetch(&digest, &compute)?
        };

        if let Some(memo) = memo {
            memo.insert(slot, value.clone());
        }
        Ok(value)
    }

    fn fetch(&self, digest: &str, compute: &dyn Fn() -> V) -> Result<V> {
        let key = self.store_key(digest);
        let store_options = self.options.store_options();
        let registry = self.class.registry();

        if registry.verbose_logging_enabled() {
            tracing::info!("{}", key);
            tracing::info!("{:?}", store_options);
        }

        let store = self.class.store();
        // Type names already retried during this call.
        let mut retried: HashSet<String> = HashSet::new();

        loop {
            let mut fresh: Option<V> = None;
            let result = store.fetch(&key, &store_options, &mut || {
                let value = compute();
                if let Some(after_load) = &self.after_load {
                    after_load(&value);
                }
                let payload = serde_json::to_vec(&value).map_err(CacheError::Encode)?;
                fresh = Some(value);
                Ok(payload)
            });

            match result {
                Ok(payload) => {
                    return match fresh {
                        Some(value) => {
                            #[cfg(feature = "stats")]
                            self.stats.record_miss();
                            Ok(value)
                        }
                        None => {
                            #[cfg(feature = "stats")]
                            self.stats.record_store_hit();
                            serde_json::from_slice(&payload).map_err(CacheError::Decode)
                        }
                    };
                }
                Err(CacheError::UnresolvedType { type_name, message })
                    if !retried.contains(&type_name) =>
                {
                    tracing::warn!(
                        key = %key,
                        type_name = %type_name,
                        error = %message,
                        "unresolved type while fetching, retrying once"
                    );
                    registry.resolve_type(&type_name);
                    retried.insert(type_name);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Drops the memo slot (if any) and deletes the store entry for `key`.
    pub(crate) fn clear(&self, memo: Option<&InstanceMemo>, key: &CacheKey) -> Result<bool> {
        let digest = self.digest(key);
        if let Some(memo) = memo {
            memo.remove(&self.memo_slot(&digest));
        }

        let store_key = self.store_key(&digest);
        tracing::debug!(key = %store_key, "clearing cached value");
        self.class.store().delete(&store_key)
    }
}
