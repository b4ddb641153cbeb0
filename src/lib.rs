//! Distributed Read-Through Cache Library
//!
//! This library crate defines the core modules of a cache node.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! A node is assembled from loosely coupled subsystems:
//!
//! - **`storage`**: The local memory layer. An immutable `ByteView` value type, a byte-bounded
//!   LRU store with an eviction callback, and a lazily built, mutex-guarded wrapper around it.
//! - **`peers`**: Peer selection. A consistent-hash ring with virtual nodes and the
//!   `PeerPicker`/`PeerFetcher` traits a group uses to reach other nodes.
//! - **`coalesce`**: Request coalescing. Concurrent loads of the same key share one execution.
//! - **`group`**: The read-through namespace (`Group`) and the `GroupRegistry` that maps names
//!   to groups.
//! - **`transport`**: HTTP plumbing. The peer pool, the peer client, the server handlers and
//!   the wire messages.
//! - **`error`**: The `CacheError` type shared by all of the above.

pub mod coalesce;
pub mod error;
pub mod group;
pub mod peers;
pub mod storage;
pub mod transport;
