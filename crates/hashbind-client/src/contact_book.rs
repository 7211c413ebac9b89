//! Contact book.
//!
//! The authoritative in-memory [`ContactList`] for a session, plus its
//! sealed copy in the [`BlobStore`].
//!
//! # Write ordering
//!
//! Every write holds the book's async mutex from validation until the blob
//! store acknowledges the put. The in-memory list is replaced once the blob
//! is sealed and before the put is issued, so a reader never sees a list
//! older than the last accepted save, and two saves never interleave.
//!
//! # Loading
//!
//! ```text
//! get blob ─► absent ─► bootstrap { me: own address, own hash }
//!    │
//!    ▼
//! unprotect ─► decode ─► classify ─► current ─► validate
//!                            │
//!                            ▼
//!                         legacy ─► reverse lookup ─► forward resolve
//!                                                          │
//!                                                          ▼
//!                                             complete ─► save upgraded
//! ```

use hashbind_core::{
    Address, Contact, ContactDraft, ContactList, Environment, PgpEngine, PublicKeyHash,
    StoredContacts, classify, contact::decode_stored, validate,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    directory::Directory,
    error::{ContactBookError, VaultError},
    resolver::KeyResolver,
    session::Session,
    store::{BlobKind, BlobStore},
};

/// The session's contacts.
pub struct ContactBook<S> {
    store: S,
    owner: Address,
    state: Mutex<ContactList>,
}

impl<S: BlobStore> ContactBook<S> {
    /// Load the logged-in user's contacts.
    ///
    /// With nothing stored yet the book starts with a single `me` entry.
    /// A legacy list is migrated through `resolver` and saved back; if any
    /// entry fails to migrate, nothing is written.
    ///
    /// # Errors
    ///
    /// - `Vault` if the session is logged out or the blob will not open
    /// - `Codec` / `Invalid` if the stored list is unreadable or broken
    /// - `Migration` / `Resolve` / `Directory` if a legacy upgrade fails
    pub async fn load<E, D, P>(
        store: S,
        session: &Session<E>,
        own_hash: &PublicKeyHash,
        resolver: &KeyResolver<D, P>,
    ) -> Result<Self, ContactBookError>
    where
        E: Environment,
        D: Directory,
        P: PgpEngine,
    {
        let owner = session.address().ok_or(VaultError::NotLoggedIn)?.clone();

        let Some(blob) = store.get(owner.as_str(), BlobKind::Contacts).await? else {
            tracing::info!(owner = %owner, "no stored contacts, starting fresh");
            let list = ContactList::bootstrap(owner.clone(), own_hash.clone());
            return Ok(Self { store, owner, state: Mutex::new(list) });
        };

        let opened = session.unprotect(&blob)?;
        let drafts = decode_stored(&opened.plaintext).map_err(ContactBookError::Codec)?;

        match classify(drafts)? {
            StoredContacts::Current(drafts) => {
                let list = validate(&drafts).into_list().map_err(ContactBookError::Invalid)?;
                tracing::debug!(owner = %owner, contacts = list.len(), "contacts loaded");
                Ok(Self { store, owner, state: Mutex::new(list) })
            },
            StoredContacts::Legacy(migration) => {
                tracing::info!(owner = %owner, entries = migration.len(), "migrating legacy contacts");

                let reverse = resolver.directory().reverse_lookup(&migration.reverse_lookup()).await?;
                let addresses = migration.addresses_to_resolve(&reverse);
                let forward = resolver.resolve(&addresses, &ContactList::default()).await?;
                let list = migration.complete(&reverse, &forward)?;

                let book = Self { store, owner, state: Mutex::new(ContactList::default()) };
                let guard = book.state.lock().await;
                book.commit(guard, session, list).await?;
                tracing::info!(owner = %book.owner, "legacy contacts migrated");
                Ok(book)
            },
        }
    }

    /// Owner of this book.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Snapshot of the current list.
    pub async fn contacts(&self) -> ContactList {
        self.state.lock().await.clone()
    }

    /// Validate and save a full replacement list.
    ///
    /// # Errors
    ///
    /// - `Invalid` with every violation, or `Vault` if the session cannot
    ///   seal; nothing changes
    /// - `Store` if the write fails. The in-memory list has already been
    ///   replaced.
    pub async fn save<E: Environment>(
        &self,
        session: &Session<E>,
        drafts: &[ContactDraft],
    ) -> Result<(), ContactBookError> {
        let guard = self.state.lock().await;
        let list = validate(drafts).into_list().map_err(ContactBookError::Invalid)?;
        self.commit(guard, session, list).await
    }

    /// Merge `updates` into the list and save.
    ///
    /// Existing addresses only have their name updated; new addresses are
    /// appended.
    pub async fn add<E: Environment>(
        &self,
        session: &Session<E>,
        updates: &[Contact],
    ) -> Result<(), ContactBookError> {
        let guard = self.state.lock().await;
        let list = guard.merged(updates).map_err(ContactBookError::Invalid)?;
        self.commit(guard, session, list).await
    }

    /// Forget the in-memory list. Called on logout.
    pub async fn clear(&self) {
        *self.state.lock().await = ContactList::default();
    }

    async fn commit<E: Environment>(
        &self,
        mut guard: MutexGuard<'_, ContactList>,
        session: &Session<E>,
        list: ContactList,
    ) -> Result<(), ContactBookError> {
        let bytes = list.to_bytes().map_err(ContactBookError::Codec)?;
        let sealed = session.protect(&bytes)?;
        *guard = list;

        self.store.put(self.owner.as_str(), BlobKind::Contacts, &sealed).await?;

        tracing::debug!(owner = %self.owner, contacts = guard.len(), "contacts saved");
        Ok(())
    }
}
