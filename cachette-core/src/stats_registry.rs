use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::CacheStats;

/// Global registry for cached-method statistics.
///
/// Statistics are indexed by `"<Class>:<method>"` for instance methods and
/// `"<Class>:class:<method>"` for class methods, the same prefix the method
/// uses for its store keys. Binders register themselves when built, so the
/// counters survive binders being rebuilt for every call.
///
/// The registry is process-wide and does not know about
/// [`CacheRegistry`](crate::CacheRegistry) instances: classes with the same
/// name share counters even when they belong to different registries. Give
/// classes distinct names to count them separately.
///
/// # Examples
///
/// ```
/// use cachette_core::stats_registry;
///
/// if let Some(stats) = stats_registry::get("Product:compute_price") {
///     println!("Hits: {}", stats.hits());
///     println!("Misses: {}", stats.misses());
/// }
///
/// for name in stats_registry::list() {
///     println!("Cached method: {}", name);
/// }
/// ```
static STATS_REGISTRY: Lazy<RwLock<HashMap<String, Arc<CacheStats>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the statistics registered under `name`, registering fresh ones
/// first if needed.
pub fn register(name: &str) -> Arc<CacheStats> {
    if let Some(stats) = STATS_REGISTRY.read().get(name) {
        return Arc::clone(stats);
    }

    let mut registry = STATS_REGISTRY.write();
    Arc::clone(
        registry
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CacheStats::new())),
    )
}

/// Get the live statistics for a cached method by name.
pub fn get(name: &str) -> Option<Arc<CacheStats>> {
    STATS_REGISTRY.read().get(name).cloned()
}

/// List all registered cached method names.
pub fn list() -> Vec<String> {
    STATS_REGISTRY.read().keys().cloned().collect()
}

/// Remove every registration. Counters held by live binders keep working but
/// are no longer reachable from the registry.
pub fn clear() {
    STATS_REGISTRY.write().clear();
}

/// Reset the counters of one cached method. Returns `false` if `name` is not
/// registered.
pub fn reset(name: &str) -> bool {
    match STATS_REGISTRY.read().get(name) {
        Some(stats) => {
            stats.reset();
            true
        }
        None => false,
    }
}
