//! Hashbind Client
//!
//! Session runtime around the Sans-IO core. Owns everything with a lifetime
//! or a side effect: session secrets, the secret vault, the persisted
//! contact book and the async key resolver driver.
//!
//! # Architecture
//!
//! Trust decisions (consensus, hash checks, contact invariants) live in
//! [`hashbind_core`] and are pure. This crate performs the I/O they need
//! through two collaborator traits and logs what happened:
//!
//! - [`Directory`]: forward and reverse lookups against the key directory
//! - [`BlobStore`]: opaque get/put of the sealed contact list and private key
//!
//! # Components
//!
//! - [`Session`]: login, account creation, private key unlock, message sealing
//! - [`ContactBook`]: load (with legacy migration), save and merge contacts
//! - [`KeyResolver`]: one directory round trip per resolution
//! - [`vault`]: seal under the current key, open with one legacy retry
//!
//! # Secrets
//!
//! Passphrase-derived material stays in memory, zeroizes on drop and is
//! redacted from `Debug` output and log fields. Only the auth tokens leave
//! the device.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod contact_book;
mod directory;
mod error;
mod resolver;
mod secrets;
mod session;
pub mod store;
mod system_env;
pub mod vault;

pub use contact_book::ContactBook;
pub use directory::Directory;
pub use error::{ContactBookError, DirectoryError, SessionError, StoreError, VaultError};
pub use resolver::KeyResolver;
pub use secrets::{SessionConfig, SessionSecrets};
pub use session::{NewAccount, OpenedMessage, SealedMessage, Session};
pub use store::{BlobKind, BlobStore, MemoryBlobStore, RedbBlobStore};
pub use system_env::SystemEnv;
pub use vault::Unprotected;
