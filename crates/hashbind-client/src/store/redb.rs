//! Redb-backed durable blob store.
//!
//! Uses Redb's ACID transactions, so a blob is either fully replaced or left
//! as it was.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};

use super::{BlobKind, BlobStore};
use crate::error::StoreError;

/// Table: blobs
/// Key: `<identity>\0<kind>` as UTF-8 bytes
/// Value: sealed blob (nonce || ciphertext+tag)
const BLOBS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("blobs");

/// Durable blob store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbBlobStore {
    db: Arc<Database>,
}

impl RedbBlobStore {
    /// Open or create a Redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(|e| StoreError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StoreError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(BLOBS).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn key(identity: &str, kind: BlobKind) -> Vec<u8> {
        let mut key = Vec::with_capacity(identity.len() + 1 + kind.as_str().len());
        key.extend_from_slice(identity.as_bytes());
        key.push(0);
        key.extend_from_slice(kind.as_str().as_bytes());
        key
    }
}

impl BlobStore for RedbBlobStore {
    async fn get(&self, identity: &str, kind: BlobKind) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Io(e.to_string()))?;
        let table = txn.open_table(BLOBS).map_err(|e| StoreError::Io(e.to_string()))?;

        let value = table
            .get(Self::key(identity, kind).as_slice())
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    async fn put(&self, identity: &str, kind: BlobKind, blob: &[u8]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(|e| StoreError::Io(e.to_string()))?;
        {
            let mut table = txn.open_table(BLOBS).map_err(|e| StoreError::Io(e.to_string()))?;
            table
                .insert(Self::key(identity, kind).as_slice(), blob)
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}
