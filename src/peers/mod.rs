//! Peer Placement Module
//!
//! Decides which node of the cluster owns a key.
//!
//! ## Core Mechanisms
//! - **Consistent Hashing**: `HashRing` places every member at `replicas` virtual points and
//!   assigns a key to the nearest point clockwise. Adding a member only remaps the keys that
//!   fall onto its new points.
//! - **Collaborator Contracts**: `PeerPicker` (key -> remote peer, or "serve locally") and
//!   `PeerFetcher` (remote fetch of `group`/`key`). The HTTP implementation lives in `transport`.

pub mod ring;
pub mod types;
