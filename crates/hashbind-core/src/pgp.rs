//! PGP engine capability.
//!
//! Asymmetric encryption, signing and armor handling are supplied by the
//! embedding application. The core only needs to parse armored keys during
//! resolution; the client session uses the rest.

use crate::error::PgpError;

/// One parsed public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Engine-assigned key identifier, used to de-duplicate recipients
    pub key_id: String,
    /// Armored text of this single key
    pub armored: String,
}

/// Freshly generated keypair, both halves armored.
#[derive(Clone)]
pub struct GeneratedKeypair {
    /// Armored public key
    pub public_armored: String,
    /// Armored private key
    pub private_armored: String,
}

impl std::fmt::Debug for GeneratedKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKeypair")
            .field("public_armored", &self.public_armored)
            .field("private_armored", &"[REDACTED]")
            .finish()
    }
}

/// Output of [`PgpEngine::decrypt_and_verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Recovered plaintext
    pub plaintext: String,
    /// True only if a sender key was supplied and its signature verified
    pub signature_valid: bool,
}

/// Asymmetric primitives.
pub trait PgpEngine: Send + Sync {
    /// Generate a keypair with a `bits`-bit modulus.
    fn generate_keypair(&self, bits: u32) -> Result<GeneratedKeypair, PgpError>;

    /// Parse every public key in an armored block.
    fn read_public_keys(&self, armored: &str) -> Result<Vec<PublicKey>, PgpError>;

    /// Encrypt `plaintext` to every recipient and sign with `private_key_armored`.
    fn encrypt_and_sign(
        &self,
        private_key_armored: &str,
        recipients: &[PublicKey],
        plaintext: &str,
    ) -> Result<String, PgpError>;

    /// Decrypt with `private_key_armored`, verifying against `sender` if given.
    fn decrypt_and_verify(
        &self,
        private_key_armored: &str,
        ciphertext_armored: &str,
        sender: Option<&PublicKey>,
    ) -> Result<Decrypted, PgpError>;
}
