use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies one memoized result on an object: the cached method's qualified
/// name (`<Class>:<method>`, the prefix of its store keys) plus the digest of
/// the key it was called with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemoSlot {
    method: String,
    digest: String,
}

impl MemoSlot {
    pub fn new(method: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            digest: digest.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Per-object memo of resolved cached-method results.
///
/// Embed one in every type whose methods are cached and hand it out through
/// [`Cacheable::cache_memo`](crate::Cacheable::cache_memo). A filled slot means
/// the store is not consulted again for that method and key during the
/// object's lifetime. Slots are only removed one at a time, by the method's
/// `clear` operation.
///
/// Values of any type can share one memo; a slot is read back with the type it
/// was written with. A value that is legitimately `None` or `false` still
/// occupies its slot.
///
/// # Thread Safety
///
/// The map sits behind a `parking_lot::Mutex` so objects holding a memo stay
/// `Sync`, but the memo is meant for a single writer per object (typically a
/// request-scoped value). The lock is never held while a method computes, so
/// two threads racing on one object may both compute the same slot.
///
/// # Examples
///
/// ```
/// use cachette_core::{InstanceMemo, MemoSlot};
///
/// let memo = InstanceMemo::new();
/// let slot = MemoSlot::new("Product:price", "abc123");
///
/// memo.insert(slot.clone(), Some(19.99f64));
/// assert_eq!(memo.get::<Option<f64>>(&slot), Some(Some(19.99)));
///
/// assert!(memo.remove(&slot));
/// assert!(memo.get::<Option<f64>>(&slot).is_none());
/// ```
#[derive(Default)]
pub struct InstanceMemo {
    slots: Mutex<HashMap<MemoSlot, Arc<dyn Any + Send + Sync>>>,
}

impl InstanceMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the value in `slot`, if one of type `V` is present.
    pub fn get<V: Clone + 'static>(&self, slot: &MemoSlot) -> Option<V> {
        let slots = self.slots.lock();
        slots
            .get(slot)
            .and_then(|value| value.downcast_ref::<V>())
            .cloned()
    }

    pub fn insert<V: Send + Sync + 'static>(&self, slot: MemoSlot, value: V) {
        self.slots.lock().insert(slot, Arc::new(value));
    }

    /// Removes `slot`. Returns `true` when it was filled.
    pub fn remove(&self, slot: &MemoSlot) -> bool {
        self.slots.lock().remove(slot).is_some()
    }

    pub fn contains(&self, slot: &MemoSlot) -> bool {
        self.slots.lock().contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

/// A cloned object starts with the same memoized results.
impl Clone for InstanceMemo {
    fn clone(&self) -> Self {
        Self {
            slots: Mutex::new(self.slots.lock().clone()),
        }
    }
}

impl fmt::Debug for InstanceMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("InstanceMemo")
            .field("slots", &slots.keys().collect::<Vec<_>>())
            .finish()
    }
}
