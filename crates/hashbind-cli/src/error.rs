//! CLI error type.

use std::path::PathBuf;

use hashbind_client::{ContactBookError, SessionError, StoreError, VaultError};
use hashbind_core::{AddressError, ContactError, MigrationError, NotaryConfigError, ResolveError};
use hashbind_crypto::CryptoError;
use hashbind_proto::ProtocolError;
use thiserror::Error;

/// Anything a subcommand can fail with.
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file could not be read
    #[error("{}: {source}", .path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Writing output or reading stdin failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Stdin closed before a passphrase line
    #[error("expected a passphrase on stdin")]
    NoPassphrase,

    /// Contacts import file is not a JSON array of contacts
    #[error("invalid contacts file: {0}")]
    ContactsFile(String),

    /// Contacts import file violates contact invariants
    #[error("invalid contacts file: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidContacts(Vec<ContactError>),

    /// Captured response failed verification
    #[error("verification failed for {failed} of {total} address(es)")]
    Unverified {
        /// Addresses without a usable key
        failed: usize,
        /// Addresses checked
        total: usize,
    },

    /// Malformed address argument
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Notary config rejected
    #[error(transparent)]
    Notaries(#[from] NotaryConfigError),

    /// Captured response off-schema
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Resolution aborted
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Key derivation rejected the cost
    #[error(transparent)]
    Kdf(#[from] CryptoError),

    /// Session failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Vault failure
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Contact book failure
    #[error(transparent)]
    ContactBook(#[from] ContactBookError),

    /// Contact list codec failure
    #[error(transparent)]
    Contact(#[from] ContactError),

    /// Stored contact list has an unexpected format
    #[error(transparent)]
    Migration(#[from] MigrationError),
}
