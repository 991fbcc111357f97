// Tests for the #[caches_method] and #[caches_class_method] attributes

mod common;

use cachette::{
    caches_class_method, caches_method, CacheHost, CacheKey, CacheRegistry, Cacheable,
    CachedClass, InstanceMemo,
};
use common::SpyStore;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static PRODUCT_STORE: Lazy<Arc<SpyStore>> = Lazy::new(SpyStore::new);

static PRODUCT_CLASS: Lazy<CachedClass> = Lazy::new(|| {
    let store: Arc<SpyStore> = Arc::clone(&*PRODUCT_STORE);
    CachedClass::with_registry("Product", Arc::new(CacheRegistry::new(store)))
});

static PRICE_CALLS: AtomicU32 = AtomicU32::new(0);
static TOTAL_CALLS: AtomicU32 = AtomicU32::new(0);
static SEARCH_CALLS: AtomicU32 = AtomicU32::new(0);
static LOADED: AtomicU32 = AtomicU32::new(0);

struct Product {
    id: u64,
    sku: String,
    base_price: f64,
    discontinued: bool,
    memo: InstanceMemo,
}

impl Product {
    fn new(id: u64, sku: &str, base_price: f64) -> Self {
        Self {
            id,
            sku: sku.to_string(),
            base_price,
            discontinued: false,
            memo: InstanceMemo::new(),
        }
    }
}

impl Cacheable for Product {
    fn cache_id(&self) -> CacheKey {
        CacheKey::scalar(self.id)
    }

    fn cache_memo(&self) -> &InstanceMemo {
        &self.memo
    }
}

impl CacheHost for Product {
    fn cache_class() -> &'static CachedClass {
        &PRODUCT_CLASS
    }
}

fn is_sellable(product: &Product, _quantity: &u32) -> bool {
    !product.discontinued
}

fn quantity_key(product: &Product, quantity: &u32) -> String {
    format!("{}x{}", product.sku, quantity)
}

fn count_load(_: &f64) {
    LOADED.fetch_add(1, Ordering::SeqCst);
}

impl Product {
    #[caches_method(expires_in = 3600, no_sha)]
    fn compute_price(&self) -> f64 {
        PRICE_CALLS.fetch_add(1, Ordering::SeqCst);
        self.base_price * 1.5
    }

    #[caches_method(
        with_key = quantity_key,
        only_if = is_sellable,
        after_load = count_load,
        no_version,
        no_sha
    )]
    fn total(&self, quantity: u32) -> f64 {
        TOTAL_CALLS.fetch_add(1, Ordering::SeqCst);
        self.base_price * f64::from(quantity)
    }

    #[caches_method(with_key = "sku", name = "label_v2", no_sha = true)]
    fn label(&self) -> String {
        format!("{} ({})", self.sku, self.id)
    }

    #[caches_class_method(expires_in = "never", no_sha)]
    fn search(category: String, limit: usize) -> Vec<u64> {
        SEARCH_CALLS.fetch_add(1, Ordering::SeqCst);
        let offset = if category.is_empty() { 100 } else { 0 };
        (1..=limit as u64).map(|n| n + offset).collect()
    }
}

#[test]
fn test_original_method_is_untouched() {
    let product = Product::new(100, "ORIG", 2.0);
    assert_eq!(product.compute_price(), 3.0);
    assert_eq!(product.compute_price(), 3.0);
    assert!(product.memo.is_empty());
    assert!(!PRODUCT_STORE
        .inner
        .contains_key("Product:compute_price:version:1:100"));
}

#[test]
fn test_via_cache_memoizes_and_clears() {
    let product = Product::new(101, "VIA", 10.0);

    assert_eq!(product.compute_price_via_cache().unwrap(), 15.0);
    assert_eq!(product.compute_price_via_cache().unwrap(), 15.0);
    assert!(PRODUCT_STORE
        .inner
        .contains_key("Product:compute_price:version:1:101"));

    assert!(product.clear_cache_compute_price().unwrap());
    assert!(!PRODUCT_STORE
        .inner
        .contains_key("Product:compute_price:version:1:101"));
    assert!(product.memo.is_empty());
}

#[test]
fn test_hooks_from_attributes() {
    let product = Product::new(102, "HOOK", 4.0);
    let before = TOTAL_CALLS.load(Ordering::SeqCst);
    let loaded_before = LOADED.load(Ordering::SeqCst);

    assert_eq!(product.total_via_cache(3).unwrap(), 12.0);
    assert_eq!(product.total_via_cache(3).unwrap(), 12.0);
    assert!(PRODUCT_STORE.inner.contains_key("Product:total:HOOKx3"));
    assert_eq!(TOTAL_CALLS.load(Ordering::SeqCst), before + 1);
    assert_eq!(LOADED.load(Ordering::SeqCst), loaded_before + 1);

    let mut discontinued = Product::new(103, "GONE", 4.0);
    discontinued.discontinued = true;
    assert_eq!(discontinued.total_via_cache(2).unwrap(), 8.0);
    assert!(!PRODUCT_STORE.inner.contains_key("Product:total:GONEx2"));
}

#[test]
fn test_field_key_and_custom_name() {
    let first = Product::new(104, "SHARED", 1.0);
    let second = Product::new(105, "SHARED", 1.0);

    assert_eq!(first.label_via_cache().unwrap(), "SHARED (104)");
    // Keyed on the SKU, so the second product reads the first one's entry
    assert_eq!(second.label_via_cache().unwrap(), "SHARED (104)");
    assert!(PRODUCT_STORE
        .inner
        .contains_key("Product:label_v2:version:1:SHARED"));
}

#[test]
fn test_class_method_companions() {
    let before = SEARCH_CALLS.load(Ordering::SeqCst);

    let first = Product::search_via_cache("garden".to_string(), 3).unwrap();
    let second = Product::search_via_cache("garden".to_string(), 3).unwrap();

    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(first, second);
    assert_eq!(SEARCH_CALLS.load(Ordering::SeqCst), before + 1);
    assert!(PRODUCT_STORE
        .inner
        .contains_key("Product:class:search:version:1:garden:3"));

    assert!(Product::clear_cache_search("garden".to_string(), 3).unwrap());
    assert!(!Product::clear_cache_search("garden".to_string(), 3).unwrap());
}
