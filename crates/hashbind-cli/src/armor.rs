//! Armor-only PGP engine.
//!
//! The CLI inspects keys but never encrypts, so it only needs to split an
//! armored text into its public key blocks. Each block's id is its hash.

use hashbind_core::{Decrypted, GeneratedKeypair, PgpEngine, PgpError, PublicKey, PublicKeyHash};

const BEGIN: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----";
const END: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// Splits armored text into public key blocks.
pub struct ArmorEngine;

impl PgpEngine for ArmorEngine {
    fn generate_keypair(&self, _bits: u32) -> Result<GeneratedKeypair, PgpError> {
        Err(PgpError::KeyGeneration("not supported by the armor-only engine".into()))
    }

    fn read_public_keys(&self, armored: &str) -> Result<Vec<PublicKey>, PgpError> {
        let mut keys = Vec::new();
        let mut rest = armored;

        while let Some(start) = rest.find(BEGIN) {
            let block = &rest[start..];
            let end = block
                .find(END)
                .ok_or_else(|| PgpError::InvalidKey("unterminated armor block".into()))?;
            let block = &block[..end + END.len()];

            keys.push(PublicKey {
                key_id: PublicKeyHash::of_key(block).to_string(),
                armored: block.to_string(),
            });
            rest = &rest[start + block.len()..];
        }

        Ok(keys)
    }

    fn encrypt_and_sign(&self, _: &str, _: &[PublicKey], _: &str) -> Result<String, PgpError> {
        Err(PgpError::Encrypt("not supported by the armor-only engine".into()))
    }

    fn decrypt_and_verify(
        &self,
        _: &str,
        _: &str,
        _: Option<&PublicKey>,
    ) -> Result<Decrypted, PgpError> {
        Err(PgpError::Decrypt("not supported by the armor-only engine".into()))
    }
}
