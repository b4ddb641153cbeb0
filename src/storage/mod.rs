//! Local Storage Module
//!
//! The in-process half of the cache: where a group keeps the values it loaded itself.
//!
//! ## Core Concepts
//! - **`ByteView`**: Immutable payload handed out to callers; clones share one allocation.
//! - **`LruStore`**: Recency-ordered map bounded by a byte budget (`len(key) + len(value)` per
//!   entry), evicting least recently used entries first and reporting each eviction.
//! - **`GuardedStore`**: Mutex around a lazily built `LruStore`, safe to share across tasks.

pub mod byteview;
pub mod guarded;
pub mod lru;
