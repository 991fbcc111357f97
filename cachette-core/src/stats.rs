use std::sync::atomic::{AtomicU64, Ordering};

/// Access statistics for one cached method.
///
/// Every call through a caching front ends in exactly one of four outcomes:
///
/// * **memo hit** - served from the object's [`InstanceMemo`](crate::InstanceMemo)
/// * **store hit** - served from the store without computing
/// * **miss** - the original method ran inside the store's `fetch`
/// * **bypass** - the `if` predicate was false and the original ran directly
///
/// # Thread Safety
///
/// All operations are thread-safe using atomic operations with `Relaxed` ordering,
/// which provides the best performance while still maintaining consistency.
///
/// # Examples
///
/// ```
/// use cachette_core::CacheStats;
///
/// let stats = CacheStats::new();
///
/// stats.record_memo_hit();
/// stats.record_store_hit();
/// stats.record_miss();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.total_accesses(), 3);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    memo_hits: AtomicU64,
    store_hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` instance with zero counters.
    pub fn new() -> Self {
        Self {
            memo_hits: AtomicU64::new(0),
            store_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypasses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_memo_hit(&self) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_store_hit(&self) {
        self.store_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a computation inside the store's `fetch`.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a call that skipped the store because its `if` predicate was false.
    #[inline]
    pub fn record_bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn memo_hits(&self) -> u64 {
        self.memo_hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_hits(&self) -> u64 {
        self.store_hits.load(Ordering::Relaxed)
    }

    /// Memo hits plus store hits.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.memo_hits() + self.store_hits()
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bypasses(&self) -> u64 {
        self.bypasses.load(Ordering::Relaxed)
    }

    /// Returns the total number of cache accesses (hits + misses). Bypassed
    /// calls never reach the cache and are not counted.
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Calculates and returns the cache hit rate as a fraction (0.0 to 1.0).
    ///
    /// Returns 0.0 if there have been no accesses.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Calculates and returns the cache miss rate as a fraction (0.0 to 1.0).
    #[inline]
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Resets all statistics counters to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachette_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_store_hit();
    /// stats.record_bypass();
    ///
    /// stats.reset();
    /// assert_eq!(stats.total_accesses(), 0);
    /// assert_eq!(stats.bypasses(), 0);
    /// ```
    pub fn reset(&self) {
        self.memo_hits.store(0, Ordering::Relaxed);
        self.store_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.bypasses.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            memo_hits: AtomicU64::new(self.memo_hits()),
            store_hits: AtomicU64::new(self.store_hits()),
            misses: AtomicU64::new(self.misses()),
            bypasses: AtomicU64::new(self.bypasses()),
        }
    }
}
