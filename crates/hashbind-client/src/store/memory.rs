#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::{BlobKind, BlobStore};
use crate::error::StoreError;

/// In-memory blob store for tests and ephemeral sessions.
///
/// Clones share the same map. Uses `lock().expect()`, which panics if the
/// mutex is poisoned; acceptable for test code.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<HashMap<(String, BlobKind), Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    #[allow(clippy::expect_used)]
    async fn get(&self, identity: &str, kind: BlobKind) -> Result<Option<Vec<u8>>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner.get(&(identity.to_string(), kind)).cloned())
    }

    #[allow(clippy::expect_used)]
    async fn put(&self, identity: &str, kind: BlobKind, blob: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.insert((identity.to_string(), kind), blob.to_vec());
        Ok(())
    }
}
