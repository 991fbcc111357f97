use cachette_core::{
    CacheKey, CacheRegistry, CachedClass, Cacheable, CachingOptions, DigestOptions, InstanceMemo,
    KeyDigest,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;

struct Item {
    id: u64,
    memo: InstanceMemo,
}

impl Cacheable for Item {
    fn cache_id(&self) -> CacheKey {
        CacheKey::scalar(self.id)
    }

    fn cache_memo(&self) -> &InstanceMemo {
        &self.memo
    }
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    let digest = KeyDigest::new(1, "en");

    for size in [1, 10, 100].iter() {
        let key = CacheKey::list((0..*size).map(|i| format!("part{}", i)));
        group.bench_with_input(BenchmarkId::new("sha1", size), &key, |b, key| {
            b.iter(|| digest.digest(black_box(key), DigestOptions::default()));
        });
        group.bench_with_input(BenchmarkId::new("plain", size), &key, |b, key| {
            let options = DigestOptions {
                no_sha: true,
                ..DigestOptions::default()
            };
            b.iter(|| digest.digest(black_box(key), options));
        });
    }

    group.finish();
}

fn bench_map_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_normalization");

    for size in [10, 100, 1000].iter() {
        let key = CacheKey::map((0..*size).rev().map(|i| (format!("k{}", i), i)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &key, |b, key| {
            b.iter(|| black_box(key).normalize());
        });
    }

    group.finish();
}

fn bench_cached_method(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_method");
    let class = CachedClass::with_registry("Item", Arc::new(CacheRegistry::builder().build()));
    let method = class
        .caches_method("double", |item: &Item, _: &()| item.id * 2)
        .options(CachingOptions::new().never_expires())
        .build()
        .unwrap();

    let item = Item {
        id: 7,
        memo: InstanceMemo::new(),
    };
    method.call(&item, ()).unwrap();

    group.bench_function("memo_hit", |b| {
        b.iter(|| method.call(black_box(&item), ()).unwrap());
    });

    group.bench_function("store_hit", |b| {
        b.iter(|| {
            let fresh = Item {
                id: 7,
                memo: InstanceMemo::new(),
            };
            method.call(black_box(&fresh), ()).unwrap()
        });
    });

    group.finish();
}

fn bench_concurrent_store_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_store_hits");
    let class = CachedClass::with_registry("Item", Arc::new(CacheRegistry::builder().build()));
    let method = Arc::new(
        class
            .caches_class_method("square", |args: &(u64,)| args.0 * args.0)
            .build()
            .unwrap(),
    );

    for threads in [2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let method = Arc::clone(&method);
                        thread::spawn(move || {
                            for i in 0..100u64 {
                                method.call((i % 10 + t as u64,)).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_digest,
    bench_map_normalization,
    bench_cached_method,
    bench_concurrent_store_hits
);
criterion_main!(benches);
