use crate::error::CacheResult;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by `PeerFetcher::fetch`.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = CacheResult<Vec<u8>>> + Send + 'a>>;

/// Chooses which peer owns a key.
///
/// Returning `None` means the key belongs to this node (or there are no peers)
/// and should be served locally.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// Client side of a remote peer: fetches `key` from the peer's copy of `group`.
pub trait PeerFetcher: Send + Sync {
    fn fetch<'a>(&'a self, group: &'a str, key: &'a str) -> FetchFuture<'a>;

    /// Identifier of the peer, used in logs.
    fn peer_id(&self) -> &str;
}
