//! Group (cache namespace)
//!
//! Composes the local store, the peer picker, the coalescer and the origin loader into
//! the read-through lookup:
//!
//! 1. **Local check**: an empty key is rejected; a hit in the `GuardedStore` returns at once.
//! 2. **Coalesce**: a miss enters the `FlightGroup` under its key, so concurrent misses for the
//!    same key share one load. The load runs on its own task and finishes even if its callers
//!    are dropped.
//! 3. **Peer attempt**: if peers are registered and the ring assigns the key to another node,
//!    the value is fetched from it. A failed fetch is logged and falls through.
//! 4. **Origin load**: the `Getter` is called; its bytes are copied into a `ByteView` and cached.
//!    An origin error is returned as is and nothing is cached.
//!
//! Values fetched from a peer are returned without being cached locally; the owning peer
//! keeps the authoritative copy.

use super::types::{Getter, GroupStats, GroupStatsSnapshot, incr};
use crate::coalesce::flight::FlightGroup;
use crate::error::{CacheError, CacheResult};
use crate::peers::types::{PeerFetcher, PeerPicker};
use crate::storage::byteview::ByteView;
use crate::storage::guarded::GuardedStore;

use std::sync::{Arc, OnceLock};

pub struct Group {
    name: String,
    getter: Getter,
    main_cache: GuardedStore,
    /// Bound at most once, see `register_peers`.
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: FlightGroup<CacheResult<ByteView>>,
    stats: GroupStats,
}

impl Group {
    pub(crate) fn new(name: &str, cache_bytes: usize, getter: Getter) -> Self {
        Self {
            name: name.to_string(),
            getter,
            main_cache: GuardedStore::new(cache_bytes),
            peers: OnceLock::new(),
            loader: FlightGroup::new(),
            stats: GroupStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds the peer picker consulted on misses.
    ///
    /// Peers can be registered once per group. A second call returns `CacheError::Config`
    /// and leaves the first picker in place; callers should treat it as fatal.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> CacheResult<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "register_peers called more than once for group {}",
                self.name
            ))
        })?;

        tracing::info!("[{}] Peer picker registered", self.name);
        Ok(())
    }

    /// Looks `key` up in the local cache, loading it on a miss.
    ///
    /// The load of a missing key runs on its own task and always completes, even if every
    /// caller waiting on it goes away; its result still lands in the cache.
    pub async fn get(self: &Arc<Self>, key: &str) -> CacheResult<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required"));
        }
        incr(&self.stats.gets);

        if let Some(value) = self.main_cache.get(key) {
            tracing::debug!("[{}] Cache hit for {}", self.name, key);
            incr(&self.stats.cache_hits);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(self: &Arc<Self>, key: &str) -> CacheResult<ByteView> {
        incr(&self.stats.loads);

        let group = Arc::clone(self);
        let owned_key = key.to_string();

        self.loader
            .run(key, move || async move { group.load_once(&owned_key).await })
            .await
    }

    /// The body of a coalesced load: owning peer first, origin as the fallback.
    async fn load_once(&self, key: &str) -> CacheResult<ByteView> {
        incr(&self.stats.loads_deduped);

        if let Some(peers) = self.peers.get()
            && let Some(peer) = peers.pick_peer(key)
        {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    incr(&self.stats.peer_loads);
                    return Ok(value);
                }
                Err(e) => {
                    incr(&self.stats.peer_errors);
                    tracing::warn!(
                        "[{}] Failed to get {} from peer {}: {}",
                        self.name,
                        key,
                        peer.peer_id(),
                        e
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> CacheResult<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> CacheResult<ByteView> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                incr(&self.stats.local_load_errs);
                tracing::debug!("[{}] Origin failed for {}: {}", self.name, key, e);
                return Err(CacheError::origin(e));
            }
        };

        let value = ByteView::copy_from(&bytes);
        self.populate_cache(key, value.clone());
        incr(&self.stats.local_loads);

        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }

    pub fn stats(&self) -> GroupStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of entries resident in the local cache.
    pub fn cached_entries(&self) -> usize {
        self.main_cache.len()
    }

    pub fn cached_bytes(&self) -> usize {
        self.main_cache.bytes()
    }
}
