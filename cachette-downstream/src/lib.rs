//! A crate that uses the caching macros with `cachette` as its only cache
//! dependency.

use cachette::{
    caches_class_method, caches_method, CacheHost, CacheKey, CacheRegistry, Cacheable,
    CachedClass, InstanceMemo,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub static SHIPMENT_CLASS: Lazy<CachedClass> = Lazy::new(|| {
    CachedClass::with_registry("Shipment", Arc::new(CacheRegistry::builder().build()))
});

pub struct Shipment {
    pub id: u64,
    pub weight_kg: f64,
    pub memo: InstanceMemo,
}

impl Shipment {
    pub fn new(id: u64, weight_kg: f64) -> Self {
        Self {
            id,
            weight_kg,
            memo: InstanceMemo::new(),
        }
    }

    #[caches_method(expires_in = 3600)]
    pub fn postage(&self) -> f64 {
        4.5 + self.weight_kg * 1.2
    }

    #[caches_class_method(expires_in = "never")]
    pub fn zone_rate(zone: String) -> f64 {
        if zone == "domestic" {
            1.0
        } else {
            2.5
        }
    }
}

impl Cacheable for Shipment {
    fn cache_id(&self) -> CacheKey {
        CacheKey::scalar(self.id)
    }

    fn cache_memo(&self) -> &InstanceMemo {
        &self.memo
    }
}

impl CacheHost for Shipment {
    fn cache_class() -> &'static CachedClass {
        &SHIPMENT_CLASS
    }
}
