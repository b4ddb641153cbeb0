use super::lru::Value;
use std::fmt;
use std::sync::Arc;

/// Immutable view over a cached value.
///
/// The payload is never mutated after construction, so clones share one allocation.
/// Callers that want to own the bytes get a copy through `byte_slice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    b: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new view. Used for data coming from outside the cache
    /// (origin loaders, peer responses) whose buffers the caller may keep reusing.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self { b: Arc::from(bytes) }
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns an owned copy of the payload.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.b.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self { b: Arc::from(bytes) }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::copy_from(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.b))
    }
}
