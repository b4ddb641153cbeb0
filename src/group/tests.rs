//! Group Module Tests
//!
//! Exercises the read-through lookup end to end with in-memory origins and stub peers.
//!
//! ## Test Scopes
//! - **Origin Path**: Miss -> origin -> cache, hits, invalid keys, origin errors.
//! - **Coalescing**: Concurrent misses share one origin call.
//! - **Peer Path**: Remote hits, remote failures falling back to the origin, local ownership.
//! - **Registry**: Lookup, duplicate names, double peer registration.

#[cfg(test)]
mod tests {
    use crate::error::CacheError;
    use crate::group::registry::GroupRegistry;
    use crate::peers::types::{FetchFuture, PeerFetcher, PeerPicker};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn db() -> HashMap<&'static str, &'static str> {
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
    }

    type LoadCounts = Arc<Mutex<HashMap<String, usize>>>;

    /// Registers a `scores` group backed by `db()`, counting origin calls per key.
    fn scores_group(
        registry: &GroupRegistry,
        delay: Duration,
    ) -> (Arc<crate::group::group::Group>, LoadCounts) {
        let counts: LoadCounts = Arc::new(Mutex::new(HashMap::new()));
        let counts_clone = counts.clone();

        let group = registry
            .create_group("scores", 2 << 10, move |key: String| {
                let counts = counts_clone.clone();
                async move {
                    *counts.lock().entry(key.clone()).or_insert(0) += 1;
                    tokio::time::sleep(delay).await;
                    match db().get(key.as_str()) {
                        Some(value) => Ok(value.as_bytes().to_vec()),
                        None => Err(anyhow::anyhow!("{} not exist", key)),
                    }
                }
            })
            .unwrap();

        (group, counts)
    }

    fn load_count(counts: &LoadCounts, key: &str) -> usize {
        counts.lock().get(key).copied().unwrap_or(0)
    }

    struct StubPeer {
        id: String,
        value: Option<Vec<u8>>,
        fetches: AtomicUsize,
    }

    impl StubPeer {
        fn new(id: &str, value: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                value: value.map(|v| v.as_bytes().to_vec()),
                fetches: AtomicUsize::new(0),
            })
        }
    }

    impl PeerFetcher for StubPeer {
        fn fetch<'a>(&'a self, _group: &'a str, _key: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                match &self.value {
                    Some(value) => Ok(value.clone()),
                    None => Err(CacheError::peer("connection refused")),
                }
            })
        }

        fn peer_id(&self) -> &str {
            &self.id
        }
    }

    struct StubPicker {
        peer: Option<Arc<StubPeer>>,
    }

    impl PeerPicker for StubPicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
            self.peer.clone().map(|peer| peer as Arc<dyn PeerFetcher>)
        }
    }

    // ============================================================
    // ORIGIN PATH TESTS
    // ============================================================

    #[tokio::test]
    async fn test_get_loads_once_then_hits_cache() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);

        for (key, value) in db() {
            let view = group.get(key).await.unwrap();
            assert_eq!(view.to_string(), value);
            assert_eq!(load_count(&counts, key), 1);

            // Second lookup is served locally
            let view = group.get(key).await.unwrap();
            assert_eq!(view.to_string(), value);
            assert_eq!(load_count(&counts, key), 1, "cache {} miss", key);
        }

        let stats = group.stats();
        assert_eq!(stats.gets, 6);
        assert_eq!(stats.cache_hits, 3);
        assert_eq!(stats.local_loads, 3);
        assert_eq!(group.cached_entries(), 3);
    }

    #[tokio::test]
    async fn test_get_empty_key_is_rejected() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);

        let err = group.get("").await.unwrap_err();

        assert!(matches!(err, CacheError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "key is required");
        assert!(counts.lock().is_empty(), "origin must not be called");
        assert_eq!(group.stats().gets, 0);
    }

    #[tokio::test]
    async fn test_get_unknown_key_propagates_origin_error() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);

        let err = group.get("Unknown").await.unwrap_err();

        assert!(matches!(err, CacheError::Origin(_)));
        assert_eq!(err.to_string(), "Unknown not exist");
        assert_eq!(group.cached_entries(), 0, "failed loads must not be cached");

        // Nothing was cached, so the origin is asked again
        assert!(group.get("Unknown").await.is_err());
        assert_eq!(load_count(&counts, "Unknown"), 2);
        assert_eq!(group.stats().local_load_errs, 2);
    }

    #[tokio::test]
    async fn test_origin_buffer_is_copied() {
        let registry = GroupRegistry::new();
        let group = registry
            .create_group("bytes", 0, |key: String| async move { Ok(key.into_bytes()) })
            .unwrap();

        let view = group.get("abc").await.unwrap();

        assert_eq!(view.byte_slice(), b"abc".to_vec());
        assert_eq!(group.cached_bytes(), 6);
    }

    // ============================================================
    // COALESCING TESTS
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_origin_call() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::from_millis(100));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("Tom").await }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().to_string(), "630");
        }

        assert_eq!(load_count(&counts, "Tom"), 1);
        assert_eq!(group.stats().loads_deduped, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dropped_caller_does_not_restart_shared_load() {
        // ARRANGE: a slow origin and two overlapping callers for the same key
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::from_millis(300));

        let first = {
            let group = group.clone();
            tokio::spawn(async move { group.get("Tom").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = {
            let group = group.clone();
            tokio::spawn(async move { group.get("Tom").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // ACT: the caller that started the load disconnects
        first.abort();

        // ASSERT: the remaining caller gets the result of the same origin call
        let view = tokio::time::timeout(Duration::from_secs(5), second)
            .await
            .expect("second caller hung")
            .unwrap()
            .unwrap();
        assert_eq!(view.to_string(), "630");
        assert_eq!(load_count(&counts, "Tom"), 1);
        assert_eq!(group.stats().loads_deduped, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_load_completes_after_all_callers_leave() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::from_millis(100));

        let caller = {
            let group = group.clone();
            tokio::spawn(async move { group.get("Jack").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        caller.abort();

        // The detached load still finishes and populates the cache
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(group.cached_entries(), 1);

        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(load_count(&counts, "Jack"), 1);
        assert_eq!(group.stats().cache_hits, 1);
    }

    // ============================================================
    // PEER PATH TESTS
    // ============================================================

    #[tokio::test]
    async fn test_remote_hit_is_returned_but_not_cached() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);
        let peer = StubPeer::new("http://peer-b", Some("remote-630"));
        group
            .register_peers(Arc::new(StubPicker {
                peer: Some(peer.clone()),
            }))
            .unwrap();

        assert_eq!(group.get("Tom").await.unwrap().to_string(), "remote-630");
        assert_eq!(group.get("Tom").await.unwrap().to_string(), "remote-630");

        // Every lookup goes back to the owning peer
        assert_eq!(peer.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(load_count(&counts, "Tom"), 0);
        assert_eq!(group.cached_entries(), 0);
        assert_eq!(group.stats().peer_loads, 2);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_origin() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);
        let peer = StubPeer::new("http://peer-down", None);
        group
            .register_peers(Arc::new(StubPicker {
                peer: Some(peer.clone()),
            }))
            .unwrap();

        let view = group.get("Jack").await.unwrap();

        assert_eq!(view.to_string(), "589");
        assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(load_count(&counts, "Jack"), 1);
        assert_eq!(group.stats().peer_errors, 1);

        // The origin result was cached, so the peer is not asked again
        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(peer.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_peer_failure_and_origin_failure_surfaces_origin_error() {
        let registry = GroupRegistry::new();
        let (group, _counts) = scores_group(&registry, Duration::ZERO);
        group
            .register_peers(Arc::new(StubPicker {
                peer: Some(StubPeer::new("http://peer-down", None)),
            }))
            .unwrap();

        let err = group.get("Nobody").await.unwrap_err();

        assert!(matches!(err, CacheError::Origin(_)));
        assert_eq!(err.to_string(), "Nobody not exist");
    }

    #[tokio::test]
    async fn test_locally_owned_key_skips_peers() {
        let registry = GroupRegistry::new();
        let (group, counts) = scores_group(&registry, Duration::ZERO);
        group
            .register_peers(Arc::new(StubPicker { peer: None }))
            .unwrap();

        assert_eq!(group.get("Sam").await.unwrap().to_string(), "567");
        assert_eq!(load_count(&counts, "Sam"), 1);
        assert_eq!(group.stats().peer_loads, 0);
    }

    // ============================================================
    // REGISTRY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_registry_lookup_by_name() {
        let registry = GroupRegistry::new();
        let (group, _counts) = scores_group(&registry, Duration::ZERO);

        let found = registry.get_group("scores").expect("group should be registered");
        assert!(Arc::ptr_eq(&found, &group));
        assert_eq!(found.name(), "scores");
        assert!(registry.get_group("missing").is_none());
        assert_eq!(registry.names(), vec!["scores".to_string()]);
    }

    #[tokio::test]
    async fn test_registry_rejects_duplicate_name() {
        let registry = GroupRegistry::new();
        let (first, _counts) = scores_group(&registry, Duration::ZERO);

        let result = registry.create_group("scores", 0, |_key: String| async { Ok(Vec::new()) });

        let err = result.err().expect("duplicate name should fail");
        assert!(err.is_config());
        assert!(Arc::ptr_eq(&registry.get_group("scores").unwrap(), &first));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_registries_are_isolated() {
        let a = GroupRegistry::new();
        let b = GroupRegistry::new();
        let _ = scores_group(&a, Duration::ZERO);

        assert!(a.get_group("scores").is_some());
        assert!(b.get_group("scores").is_none());
        assert!(b.is_empty());
    }

    #[tokio::test]
    async fn test_register_peers_twice_is_a_config_error() {
        let registry = GroupRegistry::new();
        let (group, _counts) = scores_group(&registry, Duration::ZERO);
        let first = StubPeer::new("http://first", Some("from-first"));

        group
            .register_peers(Arc::new(StubPicker {
                peer: Some(first.clone()),
            }))
            .unwrap();
        let err = group
            .register_peers(Arc::new(StubPicker {
                peer: Some(StubPeer::new("http://second", Some("from-second"))),
            }))
            .unwrap_err();

        assert!(err.is_config());
        // The first picker stays bound
        assert_eq!(group.get("Tom").await.unwrap().to_string(), "from-first");
    }
}
