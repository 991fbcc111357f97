// Tests for the one-shot retry on unresolved-type store errors
//
// A store that cannot resolve a type referenced by a stored entry fails with
// `CacheError::UnresolvedType`. The binder asks the registry's resolver to
// load the type and retries the fetch once per type name.

use cachette::{
    CacheError, CacheRegistry, CacheStore, CachedClass, Compute, MemoryStore, Result,
    StoreOptions,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fails until the resolver has loaded every type in `missing`.
struct LazyTypeStore {
    inner: MemoryStore,
    missing: Mutex<Vec<String>>,
    loaded: Arc<Mutex<HashSet<String>>>,
    fetches: AtomicUsize,
}

impl CacheStore for LazyTypeStore {
    fn fetch(&self, key: &str, options: &StoreOptions, compute: Compute<'_>) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let loaded = self.loaded.lock().clone();
        let unresolved = self
            .missing
            .lock()
            .iter()
            .find(|name| !loaded.contains(*name))
            .cloned();

        match unresolved {
            Some(name) => Err(CacheError::unresolved_type(
                name.clone(),
                format!("undefined class/module {}", name),
            )),
            None => self.inner.fetch(key, options, compute),
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key)
    }
}

fn setup(missing: &[&str], resolvable: bool) -> (Arc<LazyTypeStore>, CachedClass) {
    let loaded = Arc::new(Mutex::new(HashSet::new()));
    let store = Arc::new(LazyTypeStore {
        inner: MemoryStore::new(),
        missing: Mutex::new(missing.iter().map(|name| name.to_string()).collect()),
        loaded: Arc::clone(&loaded),
        fetches: AtomicUsize::new(0),
    });

    let registry = Arc::new(CacheRegistry::new(store.clone()));
    if resolvable {
        registry.on_unresolved_type(move |name| {
            loaded.lock().insert(name.to_string());
        });
    }

    (store, CachedClass::with_registry("Invoice", registry))
}

#[test]
fn test_resolved_type_retries_once_and_succeeds() {
    let (store, class) = setup(&["LineItem"], true);
    let method = class
        .caches_class_method("lines", |_: &()| vec!["a".to_string()])
        .build()
        .unwrap();

    assert_eq!(method.call(()).unwrap(), vec!["a".to_string()]);
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unresolvable_type_propagates_after_one_retry() {
    let (store, class) = setup(&["LineItem"], false);
    let method = class
        .caches_class_method("lines", |_: &()| 1u8)
        .build()
        .unwrap();

    let err = method.call(()).unwrap_err();
    assert!(matches!(err, CacheError::UnresolvedType { ref type_name, .. } if type_name == "LineItem"));
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_each_missing_type_gets_one_retry() {
    let (store, class) = setup(&["LineItem", "TaxRate"], true);
    let method = class
        .caches_class_method("lines", |_: &()| 3u8)
        .build()
        .unwrap();

    assert_eq!(method.call(()).unwrap(), 3);
    assert_eq!(store.fetches.load(Ordering::SeqCst), 3);
}

#[test]
fn test_other_store_errors_are_not_retried() {
    struct DownStore(AtomicUsize);

    impl CacheStore for DownStore {
        fn fetch(&self, _: &str, _: &StoreOptions, _: Compute<'_>) -> Result<Vec<u8>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::store(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }

        fn delete(&self, _: &str) -> Result<bool> {
            Ok(false)
        }
    }

    let store = Arc::new(DownStore(AtomicUsize::new(0)));
    let class = CachedClass::with_registry("Invoice", Arc::new(CacheRegistry::new(store.clone())));
    let method = class
        .caches_class_method("lines", |_: &()| 1u8)
        .build()
        .unwrap();

    assert!(matches!(method.call(()), Err(CacheError::Store(_))));
    assert_eq!(store.0.load(Ordering::SeqCst), 1);
}
