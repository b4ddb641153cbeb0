//! Request Coalescing Module
//!
//! Deduplicates concurrent loads that share a key, so a burst of misses for one key turns
//! into a single peer fetch or origin call.
//!
//! ## Guarantees
//! - At most one execution per key is in flight at any instant.
//! - Every caller that joined an execution sees the same outcome, errors included.
//! - Calls that do not overlap each run their own execution; nothing is remembered.

pub mod flight;
