use super::protocol::{Request, decode_response};
use crate::error::CacheError;
use crate::peers::types::{FetchFuture, PeerFetcher};

use anyhow::{Context, Result};
use std::time::Duration;

/// HTTP client for one remote peer.
pub struct HttpFetcher {
    /// Peer address as registered in the ring, e.g. `http://127.0.0.1:8002`.
    peer: String,
    /// `peer` followed by the base path; request paths are appended to it.
    base_url: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(peer: &str, base_path: &str, http_client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            peer: peer.to_string(),
            base_url: format!("{}{}", peer, base_path),
            http_client,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, request: &Request) -> Result<Vec<u8>> {
        let url = request.url(&self.base_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(anyhow::anyhow!("server returned: {}", response.status()));
        }

        let body = response.bytes().await.context("reading response body")?;
        let value = decode_response(&body).context("decoding response body")?;

        Ok(value)
    }
}

impl PeerFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, group: &'a str, key: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let request = Request {
                group: group.to_string(),
                key: key.to_string(),
            };

            self.get(&request)
                .await
                .map_err(|e| CacheError::Peer(format!("{:#}", e)))
        })
    }

    fn peer_id(&self) -> &str {
        &self.peer
    }
}
