//! HTTP Peer Pool
//!
//! The node's view of the cluster: its own address, the consistent-hash ring of peer
//! addresses and one `HttpFetcher` per peer. Implements `PeerPicker` for groups.

use super::client::HttpFetcher;
use super::protocol::{DEFAULT_BASE_PATH, DEFAULT_FETCH_TIMEOUT, DEFAULT_REPLICAS};
use crate::peers::ring::{HashFn, HashRing};
use crate::peers::types::{PeerFetcher, PeerPicker};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct HttpPool {
    /// This node's address, e.g. `http://127.0.0.1:8001`. Keys the ring assigns to it
    /// are served locally.
    self_url: String,
    base_path: String,
    replicas: usize,
    hash: Option<HashFn>,
    timeout: Duration,
    http_client: reqwest::Client,
    /// Ring and fetchers change together; lookups never see one without the other.
    state: RwLock<PoolState>,
}

struct PoolState {
    ring: HashRing,
    fetchers: HashMap<String, Arc<HttpFetcher>>,
}

impl HttpPool {
    pub fn new(self_url: &str) -> Self {
        Self {
            self_url: self_url.trim_end_matches('/').to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
            http_client: reqwest::Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS, None),
                fetchers: HashMap::new(),
            }),
        }
    }

    /// Overrides the path prefix; it is normalised to start and end with `/`.
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        let trimmed = base_path.trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self.state.write().ring = HashRing::new(replicas, self.hash.clone());
        self
    }

    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.state.write().ring = HashRing::new(self.replicas, Some(hash.clone()));
        self.hash = Some(hash);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Replaces the peer set. `peers` should include this node's own address.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|p| p.as_ref().trim_end_matches('/').to_string())
            .collect();

        let mut ring = HashRing::new(self.replicas, self.hash.clone());
        ring.add(&peers);
        let fetchers = peers
            .iter()
            .map(|peer| (peer.clone(), self.fetcher_for(peer)))
            .collect();

        *self.state.write() = PoolState { ring, fetchers };
        tracing::info!("[Server {}] Peer set: {:?}", self.self_url, peers);
    }

    /// Adds peers to the current ring, leaving existing placements in place except for
    /// keys the new peers take over.
    pub fn add_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.write();
        let mut added = Vec::new();

        for peer in peers {
            let peer = peer.as_ref().trim_end_matches('/').to_string();
            if state.fetchers.contains_key(&peer) {
                continue;
            }
            let fetcher = self.fetcher_for(&peer);
            state.fetchers.insert(peer.clone(), fetcher);
            added.push(peer);
        }

        state.ring.add(&added);
        tracing::info!("[Server {}] Added peers: {:?}", self.self_url, added);
    }

    /// Addresses of the current peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.read().fetchers.keys().cloned().collect();
        peers.sort();
        peers
    }

    fn fetcher_for(&self, peer: &str) -> Arc<HttpFetcher> {
        Arc::new(HttpFetcher::new(
            peer,
            &self.base_path,
            self.http_client.clone(),
            self.timeout,
        ))
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;

        if peer.is_empty() || peer == self.self_url {
            return None;
        }

        tracing::debug!("[Server {}] Pick peer {} for {}", self.self_url, peer, key);
        let fetcher = state.fetchers.get(peer)?.clone();
        Some(fetcher as Arc<dyn PeerFetcher>)
    }
}
