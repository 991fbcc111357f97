//! # Cached Methods
//!
//! The two caching fronts built from a plain function:
//!
//! - [`CachedInstanceMethod`] wraps `Fn(&R, &A) -> V`, keys on the receiver's
//!   identity (or a `with_key` hook) and memoizes per object.
//! - [`CachedClassMethod`] wraps `Fn(&A) -> V`, keys on the argument list (or a
//!   `with_key` hook) and has no memo.
//!
//! Both expose `call` (the caching front), `clear` (the invalidator) and
//! `call_uncached` (the original). They are built through
//! [`CachedClass::caches_method`] and [`CachedClass::caches_class_method`].

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::binding::{AfterLoad, MethodBinding, MethodKind};
use crate::{CacheKey, CacheValue, CachedClass, CachingOptions, InstanceMemo, Result, ToCacheKey};

/// An object whose methods can be cached.
///
/// `cache_id` is the default key of every cached instance method (the
/// object's identifier); `cache_memo` hands out the object's memo.
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheKey, Cacheable, InstanceMemo};
///
/// struct Product {
///     id: u64,
///     memo: InstanceMemo,
/// }
///
/// impl Cacheable for Product {
///     fn cache_id(&self) -> CacheKey {
///         CacheKey::scalar(self.id)
///     }
///
///     fn cache_memo(&self) -> &InstanceMemo {
///         &self.memo
///     }
/// }
/// ```
pub trait Cacheable {
    fn cache_id(&self) -> CacheKey;
    fn cache_memo(&self) -> &InstanceMemo;
}

/// A type that owns a [`CachedClass`]: its name, store override and default
/// options. Required by the `#[caches_method]` and `#[caches_class_method]`
/// attributes.
pub trait CacheHost {
    fn cache_class() -> &'static CachedClass;
}

type Original<R, A, V> = Arc<dyn Fn(&R, &A) -> V + Send + Sync>;
type Predicate<R, A> = Arc<dyn Fn(&R, &A) -> bool + Send + Sync>;
type ClassOriginal<A, V> = Arc<dyn Fn(&A) -> V + Send + Sync>;
type ClassPredicate<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

/// What identifies the result of an instance-method call.
pub enum WithKey<R, A> {
    /// The receiver's [`Cacheable::cache_id`]. The default.
    Identity,
    /// A single attribute read off the receiver.
    Attribute(Arc<dyn Fn(&R) -> CacheKey + Send + Sync>),
    /// A function of the receiver and the call arguments.
    Call(Arc<dyn Fn(&R, &A) -> CacheKey + Send + Sync>),
}

impl<R, A> WithKey<R, A> {
    pub fn attribute<F, K>(read: F) -> Self
    where
        F: Fn(&R) -> K + Send + Sync + 'static,
        K: ToCacheKey,
    {
        WithKey::Attribute(Arc::new(move |receiver: &R| read(receiver).to_cache_key()))
    }

    pub fn call<F, K>(derive: F) -> Self
    where
        F: Fn(&R, &A) -> K + Send + Sync + 'static,
        K: ToCacheKey,
    {
        WithKey::Call(Arc::new(move |receiver: &R, args: &A| {
            derive(receiver, args).to_cache_key()
        }))
    }
}

impl<R: Cacheable, A> WithKey<R, A> {
    fn resolve(&self, receiver: &R, args: &A) -> CacheKey {
        match self {
            WithKey::Identity => receiver.cache_id(),
            WithKey::Attribute(read) => read(receiver),
            WithKey::Call(derive) => derive(receiver, args),
        }
    }
}

impl<R, A> Default for WithKey<R, A> {
    fn default() -> Self {
        WithKey::Identity
    }
}

impl<R, A> Clone for WithKey<R, A> {
    fn clone(&self) -> Self {
        match self {
            WithKey::Identity => WithKey::Identity,
            WithKey::Attribute(read) => WithKey::Attribute(Arc::clone(read)),
            WithKey::Call(derive) => WithKey::Call(Arc::clone(derive)),
        }
    }
}

impl<R, A> fmt::Debug for WithKey<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithKey::Identity => f.write_str("Identity"),
            WithKey::Attribute(_) => f.write_str("Attribute(..)"),
            WithKey::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// What identifies the result of a class-method call. There is no receiver,
/// so the default is the raw argument list.
pub enum ClassKey<A> {
    Args,
    Call(Arc<dyn Fn(&A) -> CacheKey + Send + Sync>),
}

impl<A> ClassKey<A> {
    pub fn call<F, K>(derive: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
        K: ToCacheKey,
    {
        ClassKey::Call(Arc::new(move |args: &A| derive(args).to_cache_key()))
    }
}

impl<A: ToCacheKey> ClassKey<A> {
    fn resolve(&self, args: &A) -> CacheKey {
        match self {
            ClassKey::Args => args.to_cache_key(),
            ClassKey::Call(derive) => derive(args),
        }
    }
}

impl<A> Default for ClassKey<A> {
    fn default() -> Self {
        ClassKey::Args
    }
}

impl<A> Clone for ClassKey<A> {
    fn clone(&self) -> Self {
        match self {
            ClassKey::Args => ClassKey::Args,
            ClassKey::Call(derive) => ClassKey::Call(Arc::clone(derive)),
        }
    }
}

/// A cached instance method.
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheKey, Cacheable, CachedClass, CacheRegistry, InstanceMemo, WithKey};
/// use std::sync::Arc;
///
/// struct Product {
///     id: u64,
///     base: f64,
///     memo: InstanceMemo,
/// }
///
/// impl Cacheable for Product {
///     fn cache_id(&self) -> CacheKey {
///         CacheKey::scalar(self.id)
///     }
///
///     fn cache_memo(&self) -> &InstanceMemo {
///         &self.memo
///     }
/// }
///
/// let class = CachedClass::with_registry("Product", Arc::new(CacheRegistry::builder().build()));
/// let price = class
///     .caches_method("compute_price", |p: &Product, qty: &u32| p.base * f64::from(*qty))
///     .with_key(WithKey::call(|p: &Product, qty: &u32| (p.id, *qty)))
///     .build()
///     .unwrap();
///
/// let product = Product { id: 1, base: 2.5, memo: InstanceMemo::new() };
/// assert_eq!(price.call(&product, 4).unwrap(), 10.0);
/// assert_eq!(price.call(&product, 4).unwrap(), 10.0);
/// assert!(price.clear(&product, 4).unwrap());
/// ```
pub struct CachedInstanceMethod<R, A, V> {
    binding: MethodBinding<V>,
    original: Original<R, A, V>,
    with_key: WithKey<R, A>,
    only_if: Option<Predicate<R, A>>,
}

impl<R: Cacheable, A, V: CacheValue> CachedInstanceMethod<R, A, V> {
    /// The caching front.
    ///
    /// Returns the memoized value if this object already resolved this key.
    /// Otherwise, when `only_if` is configured and false, runs the original
    /// directly; else fetches from the store, computing on a store miss. The
    /// resolved value is memoized on the object either way.
    pub fn call(&self, receiver: &R, args: A) -> Result<V> {
        let key = self.with_key.resolve(receiver, &args);
        self.binding.resolve(
            Some(receiver.cache_memo()),
            &key,
            || {
                self.only_if
                    .as_ref()
                    .map_or(false, |only_if| !only_if(receiver, &args))
            },
            || (self.original)(receiver, &args),
        )
    }

    /// The invalidator: drops the object's memo slot and deletes the store
    /// entry for this key. Returns `true` if the store held an entry. Never
    /// runs the original.
    pub fn clear(&self, receiver: &R, args: A) -> Result<bool> {
        let key = self.with_key.resolve(receiver, &args);
        self.binding.clear(Some(receiver.cache_memo()), &key)
    }

    /// Runs the wrapped method without touching memo or store.
    pub fn call_uncached(&self, receiver: &R, args: A) -> V {
        (self.original)(receiver, &args)
    }

    /// The composite store key this call would use.
    pub fn store_key(&self, receiver: &R, args: &A) -> String {
        let key = self.with_key.resolve(receiver, args);
        self.binding.store_key(&self.binding.digest(&key))
    }

    /// Whether `receiver` already memoized this call.
    pub fn is_memoized(&self, receiver: &R, args: &A) -> bool {
        let key = self.with_key.resolve(receiver, args);
        let slot = self.binding.memo_slot(&self.binding.digest(&key));
        receiver.cache_memo().contains(&slot)
    }

    pub fn name(&self) -> &str {
        self.binding.method()
    }

    /// The effective options after merging.
    pub fn options(&self) -> &CachingOptions {
        self.binding.options()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &Arc<CacheStats> {
        self.binding.stats()
    }
}

/// Builder returned by [`CachedClass::caches_method`].
pub struct InstanceMethodBuilder<R, A, V> {
    class: CachedClass,
    name: String,
    original: Original<R, A, V>,
    options: CachingOptions,
    with_key: WithKey<R, A>,
    only_if: Option<Predicate<R, A>>,
    after_load: Option<AfterLoad<V>>,
}

impl<R: Cacheable, A, V: CacheValue> InstanceMethodBuilder<R, A, V> {
    pub(crate) fn new(class: CachedClass, name: &str, original: Original<R, A, V>) -> Self {
        Self {
            class,
            name: name.to_string(),
            original,
            options: CachingOptions::new(),
            with_key: WithKey::Identity,
            only_if: None,
            after_load: None,
        }
    }

    /// Per-method options; they win over the class defaults.
    pub fn options(mut self, options: CachingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_key(mut self, with_key: WithKey<R, A>) -> Self {
        self.with_key = with_key;
        self
    }

    /// When `predicate` returns false the original runs directly and the store
    /// is neither read nor written.
    pub fn only_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R, &A) -> bool + Send + Sync + 'static,
    {
        self.only_if = Some(Arc::new(predicate));
        self
    }

    /// Called with every freshly computed value, before it is stored.
    pub fn after_load<F>(mut self, callback: F) -> Self
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.after_load = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<CachedInstanceMethod<R, A, V>> {
        let binding = MethodBinding::new(
            self.class,
            MethodKind::Instance,
            &self.name,
            self.options,
            self.after_load,
        )?;

        Ok(CachedInstanceMethod {
            binding,
            original: self.original,
            with_key: self.with_key,
            only_if: self.only_if,
        })
    }
}

/// A cached class-level method. Results are shared through the store only;
/// there is no memo.
///
/// # Examples
///
/// ```
/// use cachette_core::{CachedClass, CacheRegistry};
/// use std::sync::Arc;
///
/// let class = CachedClass::with_registry("Catalog", Arc::new(CacheRegistry::builder().build()));
/// let top = class
///     .caches_class_method("top_sellers", |args: &(usize,)| (0..args.0 as u32).collect::<Vec<_>>())
///     .build()
///     .unwrap();
///
/// assert_eq!(top.call((3,)).unwrap(), vec![0, 1, 2]);
/// assert!(top.store_key(&(3,)).starts_with("Catalog:class:top_sellers:"));
/// ```
pub struct CachedClassMethod<A, V> {
    binding: MethodBinding<V>,
    original: ClassOriginal<A, V>,
    with_key: ClassKey<A>,
    only_if: Option<ClassPredicate<A>>,
}

impl<A: ToCacheKey, V: CacheValue> CachedClassMethod<A, V> {
    /// The caching front: fetches from the store, computing on a miss, unless
    /// `only_if` is configured and false.
    pub fn call(&self, args: A) -> Result<V> {
        let key = self.with_key.resolve(&args);
        self.binding.resolve(
            None,
            &key,
            || {
                self.only_if
                    .as_ref()
                    .map_or(false, |only_if| !only_if(&args))
            },
            || (self.original)(&args),
        )
    }

    /// Deletes the store entry for this key.
    pub fn clear(&self, args: A) -> Result<bool> {
        let key = self.with_key.resolve(&args);
        self.binding.clear(None, &key)
    }

    pub fn call_uncached(&self, args: A) -> V {
        (self.original)(&args)
    }

    pub fn store_key(&self, args: &A) -> String {
        let key = self.with_key.resolve(args);
        self.binding.store_key(&self.binding.digest(&key))
    }

    pub fn name(&self) -> &str {
        self.binding.method()
    }

    pub fn options(&self) -> &CachingOptions {
        self.binding.options()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &Arc<CacheStats> {
        self.binding.stats()
    }
}

/// Builder returned by [`CachedClass::caches_class_method`].
pub struct ClassMethodBuilder<A, V> {
    class: CachedClass,
    name: String,
    original: ClassOriginal<A, V>,
    options: CachingOptions,
    with_key: ClassKey<A>,
    only_if: Option<ClassPredicate<A>>,
    after_load: Option<AfterLoad<V>>,
}

impl<A: ToCacheKey, V: CacheValue> ClassMethodBuilder<A, V> {
    pub(crate) fn new(class: CachedClass, name: &str, original: ClassOriginal<A, V>) -> Self {
        Self {
            class,
            name: name.to_string(),
            original,
            options: CachingOptions::new(),
            with_key: ClassKey::Args,
            only_if: None,
            after_load: None,
        }
    }

    pub fn options(mut self, options: CachingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_key(mut self, with_key: ClassKey<A>) -> Self {
        self.with_key = with_key;
        self
    }

    pub fn only_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.only_if = Some(Arc::new(predicate));
        self
    }

    pub fn after_load<F>(mut self, callback: F) -> Self
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.after_load = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<CachedClassMethod<A, V>> {
        let binding = MethodBinding::new(
            self.class,
            MethodKind::Class,
            &self.name,
            self.options,
            self.after_load,
        )?;

        Ok(CachedClassMethod {
            binding,
            original: self.original,
            with_key: self.with_key,
            only_if: self.only_if,
        })
    }
}
