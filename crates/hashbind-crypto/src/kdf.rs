//! Passphrase key derivation.
//!
//! Two secrets come out of one `(identity, passphrase)` pair, separated by a
//! one-character salt prefix:
//!
//! - `"1" || identity` → auth token (20 bytes, hex). Sent to the server.
//! - `"2" || identity` → protection key (16 bytes). Never leaves the client.
//!
//! The scrypt path is intentionally slow. Callers must not run it per
//! keystroke and should keep it off any latency-sensitive task.

use std::fmt;

use sha1::{Digest, Sha1};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Auth token size in bytes (160 bits).
pub const AUTH_TOKEN_SIZE: usize = 20;

/// Protection key size in bytes (128 bits).
pub const PROTECTION_KEY_SIZE: usize = 16;

/// Salt prefix for the auth token.
const AUTH_SALT_PREFIX: &str = "1";

/// Salt prefix for the protection key.
const PROTECTION_SALT_PREFIX: &str = "2";

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost `N`
    pub log_n: u8,
    /// Block size `r`
    pub r: u32,
    /// Parallelism `p`
    pub p: u32,
}

impl Default for KdfParams {
    /// N = 2^14, r = 8, p = 1.
    fn default() -> Self {
        Self { log_n: 14, r: 8, p: 1 }
    }
}

/// Hex-encoded auth token. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    /// Hex representation sent as the login credential.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Symmetric key protecting the private key and contact list. Zeroized on
/// drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ProtectionKey([u8; PROTECTION_KEY_SIZE]);

impl ProtectionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; PROTECTION_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PROTECTION_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for ProtectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProtectionKey(<redacted>)")
    }
}

/// Derive the auth token with scrypt.
///
/// # Errors
///
/// - `InvalidKdfParams` if scrypt rejects `params`
pub fn derive_auth_token(
    identity: &str,
    passphrase: &str,
    params: &KdfParams,
) -> Result<AuthToken, CryptoError> {
    let mut out = [0u8; AUTH_TOKEN_SIZE];
    scrypt_into(passphrase, AUTH_SALT_PREFIX, identity, params, &mut out)?;
    let token = AuthToken(hex::encode(out));
    out.zeroize();
    Ok(token)
}

/// Derive the protection key with scrypt.
///
/// # Errors
///
/// - `InvalidKdfParams` if scrypt rejects `params`
pub fn derive_protection_key(
    identity: &str,
    passphrase: &str,
    params: &KdfParams,
) -> Result<ProtectionKey, CryptoError> {
    let mut out = [0u8; PROTECTION_KEY_SIZE];
    scrypt_into(passphrase, PROTECTION_SALT_PREFIX, identity, params, &mut out)?;
    let key = ProtectionKey(out);
    out.zeroize();
    Ok(key)
}

/// Legacy auth token: hex `SHA-1("1" || identity || passphrase)`.
///
/// Only for accounts created before the scrypt upgrade.
pub fn derive_auth_token_legacy(identity: &str, passphrase: &str) -> AuthToken {
    let digest = legacy_digest(AUTH_SALT_PREFIX, identity, passphrase);
    AuthToken(hex::encode(digest))
}

/// Legacy protection key: first 16 bytes of `SHA-1("2" || identity ||
/// passphrase)`.
///
/// Only for opening data sealed before the scrypt upgrade.
pub fn derive_protection_key_legacy(identity: &str, passphrase: &str) -> ProtectionKey {
    let mut digest = legacy_digest(PROTECTION_SALT_PREFIX, identity, passphrase);
    let mut key = [0u8; PROTECTION_KEY_SIZE];
    key.copy_from_slice(&digest[..PROTECTION_KEY_SIZE]);
    digest.zeroize();
    ProtectionKey(key)
}

fn scrypt_into(
    passphrase: &str,
    salt_prefix: &str,
    identity: &str,
    params: &KdfParams,
    out: &mut [u8],
) -> Result<(), CryptoError> {
    let invalid = || CryptoError::InvalidKdfParams { log_n: params.log_n, r: params.r, p: params.p };

    let scrypt_params =
        scrypt::Params::new(params.log_n, params.r, params.p, out.len()).map_err(|_| invalid())?;

    let salt = format!("{salt_prefix}{identity}");
    scrypt::scrypt(passphrase.as_bytes(), salt.as_bytes(), &scrypt_params, out)
        .map_err(|_| invalid())
}

fn legacy_digest(salt_prefix: &str, identity: &str, passphrase: &str) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(salt_prefix.as_bytes());
    hasher.update(identity.as_bytes());
    hasher.update(passphrase.as_bytes());
    hasher.finalize().into()
}
