// Tests for cached class methods
//
// Class methods have no memo: every call goes to the store, keyed by the
// argument list unless a key function is given.

mod common;

use cachette::{CacheKey, CachedClass, CachingOptions, ClassKey};
use common::spy_registry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn catalog() -> (Arc<common::SpyStore>, CachedClass) {
    let (store, registry) = spy_registry();
    (store, CachedClass::with_registry("Catalog", registry))
}

#[test]
fn test_results_shared_through_store() {
    let (store, class) = catalog();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let best_sellers = class
        .caches_class_method("best_sellers", move |args: &(String, usize)| {
            counter.fetch_add(1, Ordering::SeqCst);
            (0..args.1 as u64).collect::<Vec<_>>()
        })
        .build()
        .unwrap();

    let first = best_sellers.call(("books".to_string(), 3)).unwrap();
    let second = best_sellers.call(("books".to_string(), 3)).unwrap();

    assert_eq!(first, vec![0, 1, 2]);
    assert_eq!(first, second);
    // No memo: both calls reach the store, only the first computes
    assert_eq!(store.fetches(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_class_namespace_in_store_key() {
    let (store, class) = catalog();
    let best_sellers = class
        .caches_class_method("best_sellers", |args: &(String, usize)| args.1)
        .options(CachingOptions::new().no_sha(true))
        .build()
        .unwrap();

    best_sellers.call(("books".to_string(), 10)).unwrap();
    assert_eq!(
        store.last_key().unwrap(),
        "Catalog:class:best_sellers:version:1:books:10"
    );

    let hashed = class
        .caches_class_method("best_sellers", |args: &(String, usize)| args.1)
        .build()
        .unwrap();
    assert_eq!(
        hashed.store_key(&("books".to_string(), 10)),
        "Catalog:class:best_sellers:24af57664cc76a8dea01e393dc4ff8b99e2e48cb"
    );
}

#[test]
fn test_argument_lists_are_distinct_keys() {
    let (store, class) = catalog();
    let square = class
        .caches_class_method("square", |args: &(i64,)| args.0 * args.0)
        .build()
        .unwrap();

    assert_eq!(square.call((3,)).unwrap(), 9);
    assert_eq!(square.call((4,)).unwrap(), 16);
    assert_eq!(square.call((3,)).unwrap(), 9);
    assert_eq!(store.computes(), 2);
}

#[test]
fn test_key_function() {
    let (store, class) = catalog();
    let lookup = class
        .caches_class_method("lookup", |args: &(String, u32)| format!("{}-{}", args.0, args.1))
        .with_key(ClassKey::call(|args: &(String, u32)| args.0.to_lowercase()))
        .build()
        .unwrap();

    let first = lookup.call(("ABC".to_string(), 1)).unwrap();
    let second = lookup.call(("abc".to_string(), 2)).unwrap();

    assert_eq!(first, "ABC-1");
    assert_eq!(second, "ABC-1");
    assert_eq!(store.computes(), 1);
}

#[test]
fn test_map_arguments_are_order_independent() {
    let (store, class) = catalog();
    let search = class
        .caches_class_method("search", |filters: &CacheKey| filters.normalize())
        .options(CachingOptions::new().no_sha(true))
        .build()
        .unwrap();

    search.call(CacheKey::map([("b", 2), ("a", 1)])).unwrap();
    search.call(CacheKey::map([("a", 1), ("b", 2)])).unwrap();

    assert_eq!(store.computes(), 1);
    assert_eq!(
        store.last_key().unwrap(),
        "Catalog:class:search:version:1:a:1:b:2"
    );
}

#[test]
fn test_clear_deletes_store_entry_only() {
    let (store, class) = catalog();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let total = class
        .caches_class_method("total", move |args: &(u32, u32)| {
            counter.fetch_add(1, Ordering::SeqCst);
            args.0 + args.1
        })
        .build()
        .unwrap();

    total.call((1, 2)).unwrap();
    assert!(total.clear((1, 2)).unwrap());
    assert!(!total.clear((1, 2)).unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    total.call((1, 2)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.deletes(), 2);
}

#[test]
fn test_class_store_override() {
    let (registry_store, class) = catalog();
    let own = common::SpyStore::new();
    class.set_store(own.clone());

    let answer = class
        .caches_class_method("answer", |_: &()| 42u8)
        .build()
        .unwrap();
    answer.call(()).unwrap();

    assert_eq!(own.fetches(), 1);
    assert_eq!(registry_store.fetches(), 0);

    class.reset_store();
    answer.call(()).unwrap();
    assert_eq!(registry_store.fetches(), 1);
}
