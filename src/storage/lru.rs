//! Byte-bounded LRU store.
//!
//! Recency bookkeeping is delegated to `lru::LruCache` (used unbounded); this type layers
//! size accounting and byte-budget eviction on top of it. Not thread-safe on its own,
//! see `GuardedStore`.

use lru::LruCache;

/// Anything that can report its size in bytes.
pub trait Value {
    fn len(&self) -> usize;
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}

/// Invoked with each evicted entry, after it has been removed from the store.
pub type OnEvicted<V> = Box<dyn FnMut(String, V) + Send>;

pub struct LruStore<V: Value> {
    /// Budget in bytes; 0 means unbounded.
    max_bytes: usize,
    /// Sum of `key.len() + value.len()` over resident entries.
    nbytes: usize,
    entries: LruCache<String, V>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: Value> LruStore<V> {
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted<V>>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            entries: LruCache::unbounded(),
            on_evicted,
        }
    }

    /// Looks up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Inserts or replaces `key`, then evicts from the cold end until the budget holds.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let key_len = key.len();
        let value_len = value.len();

        match self.entries.put(key, value) {
            Some(old) => {
                self.nbytes -= old.len();
                self.nbytes += value_len;
            }
            None => self.nbytes += key_len + value_len,
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    /// Drops the least recently used entry, if any.
    pub fn remove_oldest(&mut self) {
        if let Some((key, value)) = self.entries.pop_lru() {
            self.nbytes -= key.len() + value.len();
            if let Some(on_evicted) = self.on_evicted.as_mut() {
                on_evicted(key, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}
