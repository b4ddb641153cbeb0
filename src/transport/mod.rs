//! HTTP Transport Module
//!
//! Carries peer fetches between nodes and exposes the client-facing API.
//!
//! ## Submodules
//! - **`protocol`**: Endpoints, defaults and the protobuf-encoded reply envelope.
//! - **`client`**: `HttpFetcher`, the reqwest-based remote fetch for one peer.
//! - **`pool`**: `HttpPool`, the peer set on a hash ring; picks the owner of each key.
//! - **`handlers`**: Axum routers and handlers for the peer endpoint and the front API.

pub mod client;
pub mod handlers;
pub mod pool;
pub mod protocol;
