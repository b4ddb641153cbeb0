//! Group Module
//!
//! A group is a named cache namespace with its own origin loader and byte budget.
//!
//! ## Submodules
//! - **`group`**: The read-through `get` state machine (local cache -> peer -> origin).
//! - **`registry`**: Name -> group lookup shared by the HTTP surfaces.
//! - **`types`**: The `Getter` origin capability and per-group statistics.

pub mod group;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
