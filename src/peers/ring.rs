use std::collections::HashMap;
use std::sync::Arc;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Consistent-hash ring mapping arbitrary keys to member identifiers.
///
/// Each member is placed `replicas` times, at `hash("{i}{member}")` for `i` in `0..replicas`.
/// A key belongs to the member owning the first virtual node at or after `hash(key)`,
/// wrapping around to the start of the ring. Adding a member therefore only moves the keys
/// that now land on one of its virtual nodes.
///
/// The ring does no locking of its own; `HttpPool` keeps it behind a lock.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted, distinct virtual-node hashes; `replicas` entries per member added.
    keys: Vec<u32>,
    /// Virtual-node hash -> member. A colliding hash keeps one ring slot and maps to the
    /// member added last.
    hash_map: HashMap<u32, String>,
}

impl HashRing {
    /// Creates a ring hashing with CRC32 (IEEE) unless `hash` is given.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(|| Arc::new(crc32fast::hash) as HashFn),
            replicas,
            keys: Vec::new(),
            hash_map: HashMap::new(),
        }
    }

    pub fn add<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for member in members {
            let member = member.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, member).as_bytes());
                if self.hash_map.insert(hash, member.to_string()).is_none() {
                    self.keys.push(hash);
                }
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the member owning `key`, or `None` while the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);

        self.hash_map
            .get(&self.keys[idx % self.keys.len()])
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}
