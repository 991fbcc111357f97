use std::time::Instant;

use crate::Expiration;

/// Internal wrapper that tracks when a payload was written to a store.
/// Used for `expires_in` support.
///
/// Each stored payload is wrapped in a `CacheEntry` which records the
/// insertion timestamp using `Instant::now()` together with the expiration
/// requested by the writer.
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheEntry, Expiration};
/// use std::time::Duration;
///
/// let entry = CacheEntry::new(42, Expiration::After(Duration::from_secs(60)));
/// assert_eq!(entry.value, 42);
/// assert!(!entry.is_expired());
///
/// let forever = CacheEntry::new("data", Expiration::Never);
/// assert!(!forever.is_expired());
/// ```
#[derive(Clone, Debug)]
pub struct CacheEntry<R> {
    pub value: R,
    pub inserted_at: Instant,
    pub expires_in: Expiration,
}

impl<R> CacheEntry<R> {
    /// Creates a new cache entry with the current timestamp.
    pub fn new(value: R, expires_in: Expiration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            expires_in,
        }
    }

    /// Returns true once the entry is older than its expiration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachette_core::{CacheEntry, Expiration};
    /// use std::thread;
    /// use std::time::Duration;
    ///
    /// let entry = CacheEntry::new("data", Expiration::After(Duration::from_millis(50)));
    /// assert!(!entry.is_expired());
    ///
    /// thread::sleep(Duration::from_millis(80));
    /// assert!(entry.is_expired());
    /// ```
    pub fn is_expired(&self) -> bool {
        match self.expires_in {
            Expiration::Never => false,
            Expiration::After(ttl) => self.inserted_at.elapsed() >= ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_new_entry_not_expired() {
        let entry = CacheEntry::new(42, Expiration::After(Duration::from_secs(10)));
        assert_eq!(entry.value, 42);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("data", Expiration::After(Duration::from_millis(100)));
        thread::sleep(Duration::from_millis(200));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_never_expires() {
        let entry = CacheEntry::new(100, Expiration::Never);
        thread::sleep(Duration::from_millis(50));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(1, Expiration::After(Duration::ZERO));
        assert!(entry.is_expired());
    }
}
