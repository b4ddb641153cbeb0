//! Cache Error Taxonomy
//!
//! Every failure a lookup can produce. The type is `Clone` because a single coalesced
//! load hands the same outcome to every caller that joined it.
//!
//! - **`InvalidArgument`**: rejected before any work happens (empty key).
//! - **`Origin`**: the origin loader failed; its error is carried verbatim and nothing is cached.
//! - **`Peer`**: a remote fetch failed. Inside a group this only triggers the origin fallback.
//! - **`Config`**: misuse at wiring time (peers registered twice, duplicate group name).
//!   Unrecoverable: the node refuses to start when it sees one.
//! - **`NoSuchGroup`**: a peer asked for a namespace this node never registered.

use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("{0}")]
    Origin(Arc<anyhow::Error>),

    #[error("peer fetch failed: {0}")]
    Peer(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no such group: {0}")]
    NoSuchGroup(String),
}

impl CacheError {
    pub fn origin(err: anyhow::Error) -> Self {
        Self::Origin(Arc::new(err))
    }

    pub fn peer(err: impl std::fmt::Display) -> Self {
        Self::Peer(err.to_string())
    }

    /// True for the errors that indicate a wiring mistake rather than a runtime condition.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
