//! Secret vault.
//!
//! Symmetric protection for the two blobs the client persists: the private
//! key and the contact list. New data is always sealed under the current
//! protection key. Opening tries the current key, then retries exactly once
//! with the legacy key so accounts from before the derivation upgrade still
//! unlock.
//!
//! A successful legacy open is reported through [`Unprotected::used_legacy`]
//! and logged. The blob is not re-sealed here; that is the caller's call.

use hashbind_core::Environment;
use hashbind_crypto::{NONCE_SIZE, open, seal};
use zeroize::Zeroizing;

use crate::{error::VaultError, secrets::SessionSecrets};

/// Plaintext recovered from the vault.
#[derive(Debug)]
pub struct Unprotected {
    /// Recovered bytes, zeroized on drop
    pub plaintext: Zeroizing<Vec<u8>>,
    /// True if only the legacy key opened the blob
    pub used_legacy: bool,
}

/// Seal `plaintext` under the session's current protection key.
///
/// # Errors
///
/// - `NotLoggedIn` if `secrets` is `None`
/// - `Seal` if the cipher rejects the input
pub fn protect<E: Environment>(
    env: &E,
    secrets: Option<&SessionSecrets>,
    plaintext: &[u8],
) -> Result<Vec<u8>, VaultError> {
    let secrets = secrets.ok_or(VaultError::NotLoggedIn)?;
    let nonce = env.random_array::<NONCE_SIZE>();
    seal(&secrets.protection_key, plaintext, nonce).map_err(VaultError::Seal)
}

/// Open a sealed blob, falling back once to the legacy key.
///
/// # Errors
///
/// - `NotLoggedIn` if `secrets` is `None`
/// - `Unreadable` if neither key opens the blob (wrong passphrase or
///   corrupted data)
pub fn unprotect(
    secrets: Option<&SessionSecrets>,
    ciphertext: &[u8],
) -> Result<Unprotected, VaultError> {
    let secrets = secrets.ok_or(VaultError::NotLoggedIn)?;

    if let Ok(plaintext) = open(&secrets.protection_key, ciphertext) {
        return Ok(Unprotected { plaintext: Zeroizing::new(plaintext), used_legacy: false });
    }

    match open(&secrets.legacy_protection_key, ciphertext) {
        Ok(plaintext) => {
            tracing::warn!(len = ciphertext.len(), "used legacy protection key");
            Ok(Unprotected { plaintext: Zeroizing::new(plaintext), used_legacy: true })
        },
        Err(e) => Err(VaultError::Unreadable(e)),
    }
}
