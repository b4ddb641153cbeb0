//! Peer Wire Protocol
//!
//! Defines the endpoints and the messages exchanged between cache nodes.
//!
//! A peer fetch is `GET {peer}{base_path}{group}/{key}` with both segments percent-encoded.
//! A successful reply is `200 OK` whose body is an encoded `Response`; any other status is
//! a failed fetch. Messages use the protobuf encoding, so nodes written against the same
//! `.proto` shape (`bytes value = 1`) interoperate.

use prost::Message;
use std::time::Duration;

// --- Endpoints and defaults ---

/// Path prefix under which a node serves its groups to peers.
pub const DEFAULT_BASE_PATH: &str = "/_cache/";
/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;
/// Upper bound on a single peer fetch; callers coalesced behind the key wait at most
/// this long before the origin fallback runs.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Front API: `GET /api?key=<key>` returns the raw value bytes.
pub const ENDPOINT_API: &str = "/api";
/// Front API: group counters as JSON.
pub const ENDPOINT_API_STATS: &str = "/api/stats";

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

// --- Messages ---

/// Identifies the value a node asks a peer for.
#[derive(Clone, PartialEq, Message)]
pub struct Request {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

/// Body of a successful peer reply.
#[derive(Clone, PartialEq, Message)]
pub struct Response {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

impl Request {
    /// Builds the URL of this request against a peer's `base_url` (peer address + base path).
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}/{}",
            base_url,
            urlencoding::encode(&self.group),
            urlencoding::encode(&self.key)
        )
    }
}

pub fn encode_response(value: Vec<u8>) -> Vec<u8> {
    Response { value }.encode_to_vec()
}

pub fn decode_response(body: &[u8]) -> Result<Vec<u8>, prost::DecodeError> {
    Ok(Response::decode(body)?.value)
}
