use super::byteview::ByteView;
use super::lru::LruStore;

use parking_lot::Mutex;

/// Thread-safe front for one group's `LruStore`.
///
/// A single lock covers every access, eviction cascades included: the recency list and
/// the index inside the store only stay consistent when mutated together. The store
/// itself is built on the first `add`, so groups that never load anything cost nothing.
pub struct GuardedStore {
    cache_bytes: usize,
    inner: Mutex<Option<LruStore<ByteView>>>,
}

impl GuardedStore {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            inner: Mutex::new(None),
        }
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let store = inner.get_or_insert_with(|| {
            tracing::debug!("Allocating LRU store ({} bytes)", self.cache_bytes);
            LruStore::new(self.cache_bytes, None)
        });
        store.add(key, value);
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        inner.as_mut()?.get(key).cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map(|store| store.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> usize {
        self.inner
            .lock()
            .as_ref()
            .map(|store| store.bytes())
            .unwrap_or(0)
    }
}
