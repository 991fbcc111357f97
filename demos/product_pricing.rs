use cachette::{
    bump_cache_version, caches_class_method, caches_method, CacheHost, CacheKey, Cacheable,
    CachedClass, CachingOptions, InstanceMemo,
};
use once_cell::sync::Lazy;
use std::time::Duration;

/// Example demonstrating cached instance and class methods.
///
/// A product computes its price slowly. The first call per product goes to
/// the store; repeated calls on the same object are served from its memo;
/// a second object with the same id reads the store entry.

static PRODUCT_CLASS: Lazy<CachedClass> = Lazy::new(|| {
    let class = CachedClass::new("Product");
    class.set_default_options(CachingOptions::new().expires_in(Duration::from_secs(600)));
    class
});

struct Product {
    id: u64,
    base_price: f64,
    category: String,
    memo: InstanceMemo,
}

impl Product {
    fn new(id: u64, base_price: f64, category: &str) -> Self {
        Self {
            id,
            base_price,
            category: category.to_string(),
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

impl Product {
    #[caches_method(expires_in = 3600)]
    fn compute_price(&self) -> f64 {
        println!("  computing price for product {}", self.id);
        std::thread::sleep(Duration::from_millis(100));
        (self.base_price * 1.21 * 100.0).round() / 100.0
    }

    #[caches_class_method(no_locale = false)]
    fn category_size(category: String) -> usize {
        println!("  counting products in {}", category);
        category.len() * 3
    }
}

fn main() -> Result<(), cachette::CacheError> {
    tracing_subscriber::fmt().with_target(false).init();
    cachette::CacheRegistry::global().set_verbose_logging(true);

    println!("=== Product Pricing Example ===\n");

    let product = Product::new(42, 19.99, "books");
    println!("First call (store miss):");
    println!("  price = {}", product.compute_price_via_cache()?);

    println!("\nSame object again (memo hit):");
    println!("  price = {}", product.compute_price_via_cache()?);

    let reloaded = Product::new(42, 19.99, "books");
    println!("\nAnother object with the same id (store hit):");
    println!("  price = {}", reloaded.compute_price_via_cache()?);

    println!("\nClass method keyed by its arguments:");
    println!(
        "  {} products",
        Product::category_size_via_cache(reloaded.category.clone())?
    );
    println!(
        "  {} products",
        Product::category_size_via_cache(reloaded.category.clone())?
    );

    println!("\nClearing the cached price:");
    println!("  cleared = {}", reloaded.clear_cache_compute_price()?);
    println!("  price = {}", reloaded.compute_price_via_cache()?);

    println!("\nBumping the key version orphans every versioned entry:");
    bump_cache_version();
    let fresh = Product::new(42, 19.99, "books");
    println!("  price = {}", fresh.compute_price_via_cache()?);

    #[cfg(feature = "stats")]
    {
        if let Some(stats) = cachette::stats_registry::get("Product:compute_price") {
            println!("\n📊 compute_price statistics:");
            println!("  Memo hits:  {}", stats.memo_hits());
            println!("  Store hits: {}", stats.store_hits());
            println!("  Misses:     {}", stats.misses());
            println!("  Hit rate:   {:.2}%", stats.hit_rate() * 100.0);
        }
    }

    Ok(())
}
