//! Session secrets.
//!
//! Everything derived from the passphrase at login. Held in memory for the
//! session only and zeroized when dropped. The auth tokens are the only
//! values that ever leave the device.

use hashbind_crypto::{
    AuthToken, CryptoError, KdfParams, ProtectionKey, derive_auth_token, derive_auth_token_legacy,
    derive_protection_key, derive_protection_key_legacy,
};

/// Session configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// scrypt cost for the current derivation
    pub kdf: KdfParams,
}

/// Secrets derived from one passphrase.
///
/// Every field zeroizes on drop and has a redacted `Debug`.
#[derive(Debug, Clone)]
pub struct SessionSecrets {
    /// Login credential
    pub auth_token: AuthToken,
    /// Pre-upgrade login credential, sent alongside the current one
    pub legacy_auth_token: AuthToken,
    /// Seals the private key and contact list
    pub protection_key: ProtectionKey,
    /// Opens blobs sealed before the upgrade; never seals
    pub legacy_protection_key: ProtectionKey,
}

impl SessionSecrets {
    /// Run both derivations for `identity`.
    ///
    /// Slow by construction. Async callers should move this off the
    /// executor (e.g. `spawn_blocking`).
    pub fn derive(
        identity: &str,
        passphrase: &str,
        params: &KdfParams,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            auth_token: derive_auth_token(identity, passphrase, params)?,
            legacy_auth_token: derive_auth_token_legacy(identity, passphrase),
            protection_key: derive_protection_key(identity, passphrase, params)?,
            legacy_protection_key: derive_protection_key_legacy(identity, passphrase),
        })
    }
}
