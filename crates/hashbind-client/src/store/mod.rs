//! Persistence collaborator.
//!
//! Opaque get/put of one sealed blob per [`BlobKind`], addressed by the
//! logged-in identity. The store never sees plaintext: everything handed to
//! it has already been through the vault.
//!
//! The trait is async because production backends sit behind the network.
//! [`MemoryBlobStore`] and [`RedbBlobStore`] complete immediately.

mod memory;
mod redb;

use std::future::Future;

pub use memory::MemoryBlobStore;

pub use self::redb::RedbBlobStore;
use crate::error::StoreError;

/// Which per-identity blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlobKind {
    /// Sealed CBOR contact list
    Contacts,
    /// Sealed armored private key
    PrivateKey,
}

impl BlobKind {
    /// Stable name used in storage keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::PrivateKey => "private_key",
        }
    }
}

/// Storage for sealed blobs.
///
/// Implementations share state internally, so clones see the same blobs.
///
/// # Invariants
///
/// - `put` replaces any previous blob for the same identity and kind
/// - `get` after a successful `put` returns exactly the bytes written
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Load a blob. `None` if nothing was ever stored.
    fn get(
        &self,
        identity: &str,
        kind: BlobKind,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Store a blob, replacing any previous one.
    fn put(
        &self,
        identity: &str,
        kind: BlobKind,
        blob: &[u8],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
