//! Client error types.

use hashbind_core::{ContactError, MigrationError, PgpError, ResolveError};
use hashbind_crypto::CryptoError;
use hashbind_proto::ProtocolError;
use thiserror::Error;

/// Secret vault failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// No protection key in the session
    #[error("not logged in")]
    NotLoggedIn,

    /// Neither the current nor the legacy key opened the blob
    #[error("wrong passphrase or corrupted data")]
    Unreadable(#[source] CryptoError),

    /// Sealing failed
    #[error("seal failed: {0}")]
    Seal(#[source] CryptoError),
}

/// Persistence collaborator failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend I/O failed
    #[error("storage i/o: {0}")]
    Io(String),
}

/// Directory collaborator failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Directory could not be reached
    #[error("directory unavailable: {0}")]
    Transport(String),

    /// Directory reply did not match the schema
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<DirectoryError> for ResolveError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Transport(reason) => Self::Transport(reason),
            DirectoryError::Protocol(e) => Self::Protocol(e),
        }
    }
}

/// Session lifecycle failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation needs a logged-in session
    #[error("not logged in")]
    NotLoggedIn,

    /// Key derivation rejected the configured parameters
    #[error("key derivation failed: {0}")]
    Kdf(#[source] CryptoError),

    /// No private key stored for this identity
    #[error("no private key stored for {identity}")]
    NoPrivateKey {
        /// Logged-in identity
        identity: String,
    },

    /// Private key has not been unlocked yet
    #[error("private key is locked")]
    PrivateKeyLocked,

    /// Stored private key is not valid UTF-8 armor
    #[error("stored private key is not armored text")]
    CorruptPrivateKey,

    /// Decrypted body has no subject header
    #[error("message body has no subject header")]
    MissingSubject,

    /// Vault failure
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// PGP engine failure
    #[error(transparent)]
    Pgp(#[from] PgpError),
}

/// Contact book failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactBookError {
    /// Saved list failed validation; nothing was written
    #[error("invalid contact list: {}", join(.0))]
    Invalid(Vec<ContactError>),

    /// Contact list could not be decoded or encoded
    #[error(transparent)]
    Codec(ContactError),

    /// Legacy migration failed; the stored list is untouched
    #[error("contact migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Forward resolution during migration failed
    #[error("contact migration failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Reverse lookup during migration failed
    #[error("contact migration failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Vault failure
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
