//! Compute-once asset cache
//!
//! Each key owns a slot with its own lock. The map lock is only held long
//! enough to find or create the slot, so different keys build in parallel
//! while concurrent requests for the same key wait for the first builder.
//! A failed build leaves the slot empty and the next request tries again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

pub struct AssetCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for AssetCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache").field("len", &self.len()).finish()
    }
}

// A panicking builder leaves at worst an empty slot, which is a valid state.
fn lock<G>(m: &Mutex<G>) -> MutexGuard<'_, G> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, building it with `build` on first use
    ///
    /// Keys are compared case-insensitively.
    pub fn get_or_try_insert<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let key = key.to_uppercase();
        let slot = lock(&self.slots).entry(key).or_default().clone();

        let mut value = lock(&slot);
        if let Some(existing) = value.as_ref() {
            return Ok(existing.clone());
        }
        let built = Arc::new(build()?);
        *value = Some(built.clone());
        Ok(built)
    }

    /// Cached value for `key`, without building
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let slot = lock(&self.slots).get(&key.to_uppercase())?.clone();
        let value = lock(&slot);
        value.clone()
    }

    /// Whether a built value exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of built values
    ///
    /// Waits for builds in flight, but never while holding the map lock.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<T>> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached value
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }
}
