use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ---------------------------------------------------------------------------
// LoadCache – compute-if-absent memoisation of expensive loads
// ---------------------------------------------------------------------------

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Memoises loader results by key for the lifetime of the cache.
///
/// Each key owns a slot with its own lock, so concurrent callers asking for
/// the same key wait for the first load instead of repeating it, while loads
/// of different keys proceed independently. Failed loads are not stored; the
/// next request for that key runs the loader again.
pub struct LoadCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    computations: AtomicUsize,
}

impl<K, V> Default for LoadCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A loader that panicked leaves its slot empty, which is still valid.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K: Eq + Hash + Clone, V> LoadCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `load` only if no value
    /// has been stored yet.
    pub fn get_or_try_load<E>(
        &self,
        key: &K,
        load: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut value = lock(&slot);
        if let Some(cached) = value.as_ref() {
            log::debug!("cache hit");
            return Ok(Arc::clone(cached));
        }

        self.computations.fetch_add(1, Ordering::Relaxed);
        let loaded = Arc::new(load(key)?);
        *value = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Cached value for `key`, if a load already completed.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = lock(&self.slots).get(key).cloned()?;
        let value = lock(&slot);
        value.clone()
    }

    /// Drop every entry. Loads already in flight finish into detached slots.
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a loader has been invoked.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}
