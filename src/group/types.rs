use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type-erased origin loader: takes a key, resolves to its bytes.
pub type GetterFn =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>> + Send + Sync>;

/// The origin a group falls back to when neither its own cache nor its peers have a key.
///
/// Any async closure `Fn(String) -> Future<Output = anyhow::Result<Vec<u8>>>` will do.
#[derive(Clone)]
pub struct Getter {
    load: GetterFn,
}

impl Getter {
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        // Box::pin erases the concrete future so any closure fits the same slot.
        let load: GetterFn = Arc::new(move |key: String| {
            Box::pin(load(key)) as Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>>
        });
        Self { load }
    }

    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.load)(key.to_string()).await
    }
}

/// Running counters for one group.
#[derive(Debug, Default)]
pub struct GroupStats {
    /// Calls to `get` with a non-empty key.
    pub gets: AtomicU64,
    /// Gets served from the local cache.
    pub cache_hits: AtomicU64,
    /// Gets that missed the local cache.
    pub loads: AtomicU64,
    /// Loads that actually ran after coalescing.
    pub loads_deduped: AtomicU64,
    pub peer_loads: AtomicU64,
    pub peer_errors: AtomicU64,
    /// Successful origin loads.
    pub local_loads: AtomicU64,
    pub local_load_errs: AtomicU64,
}

impl GroupStats {
    pub fn snapshot(&self) -> GroupStatsSnapshot {
        GroupStatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            loads_deduped: self.loads_deduped.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_load_errs: self.local_load_errs.load(Ordering::Relaxed),
        }
    }
}

pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Point-in-time copy of `GroupStats`, served by the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatsSnapshot {
    pub gets: u64,
    pub cache_hits: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub local_loads: u64,
    pub local_load_errs: u64,
}
