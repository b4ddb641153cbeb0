//! Group Registry
//!
//! Maps group names to live `Group`s. One registry is built at start-up and shared by
//! reference with everything that resolves groups by name (the peer HTTP handler, the
//! front API), instead of living in a global.

use super::group::Group;
use super::types::Getter;
use crate::error::{CacheError, CacheResult};

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Registry of the groups served by this process.
///
/// Lookups take the read lock and run concurrently; registration takes the write lock.
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a group named `name` with a cache budget of `cache_bytes` (0 = unbounded)
    /// and registers it.
    ///
    /// # Arguments
    /// * `name` - Unique group name; also the first path segment peers use to reach it.
    /// * `cache_bytes` - Local cache budget in bytes.
    /// * `getter` - Origin loader called on misses the peers cannot serve.
    ///
    /// # Returns
    /// * `Err(CacheError::Config)` if a group with that name already exists. Like a second
    ///   `register_peers`, this is a wiring mistake and should abort start-up.
    pub fn create_group<F, Fut>(
        &self,
        name: &str,
        cache_bytes: usize,
        getter: F,
    ) -> CacheResult<Arc<Group>>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        self.create_group_with(name, cache_bytes, Getter::new(getter))
    }

    /// Same as `create_group`, for an already type-erased `Getter`.
    pub fn create_group_with(
        &self,
        name: &str,
        cache_bytes: usize,
        getter: Getter,
    ) -> CacheResult<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(name) {
            return Err(CacheError::Config(format!("group {} already exists", name)));
        }

        let group = Arc::new(Group::new(name, cache_bytes, getter));
        groups.insert(name.to_string(), group.clone());

        tracing::info!("Created group {} ({} bytes)", name, cache_bytes);
        Ok(group)
    }

    /// Looks up a group by name.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns the names of all registered groups.
    pub fn names(&self) -> Vec<String> {
        self.groups.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }
}
