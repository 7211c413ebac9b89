//! Vault sealing using `AES-128-GCM`
//!
//! All functions are pure - the nonce must be provided by the caller.
//!
//! Sealed wire format:
//!   [ nonce (12 bytes) | ciphertext + tag (16 bytes) ]
//!
//! The tag is what lets the vault tell a wrong key from a right one, which
//! the legacy-key fallback depends on.

use aes_gcm::{
    Aes128Gcm, Nonce,
    aead::{Aead, KeyInit},
};

use crate::{error::CryptoError, kdf::ProtectionKey};

/// Size of the per-message random nonce (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Seal `plaintext` under `key`, prefixing the caller-provided nonce.
///
/// # Security
///
/// - A nonce must never repeat under the same key; callers MUST draw it from
///   a cryptographically secure RNG in production
pub fn seal(
    key: &ProtectionKey,
    plaintext: &[u8],
    nonce: [u8; NONCE_SIZE],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::SealFailed)?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a sealed blob (nonce || ciphertext+tag).
///
/// # Errors
///
/// - `Truncated`: blob shorter than nonce + tag
/// - `OpenFailed`: wrong key or tampered data
pub fn open(key: &ProtectionKey, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Truncated { len: sealed.len() });
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes128Gcm::new(key.as_bytes().into());
    cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| CryptoError::OpenFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fill: u8) -> ProtectionKey {
        ProtectionKey::from_bytes([fill; 16])
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(&key(1), b"private key armor", [0xAB; NONCE_SIZE]).unwrap();
        assert_eq!(open(&key(1), &sealed).unwrap(), b"private key armor");
    }

    #[test]
    fn sealed_layout() {
        let nonce = [7u8; NONCE_SIZE];
        let sealed = seal(&key(1), b"abc", nonce).unwrap();

        assert_eq!(sealed.len(), NONCE_SIZE + 3 + TAG_SIZE);
        assert_eq!(&sealed[..NONCE_SIZE], &nonce);
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let sealed = seal(&key(2), b"", [0; NONCE_SIZE]).unwrap();
        assert_eq!(open(&key(2), &sealed).unwrap(), b"");
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&key(1), b"contacts", [0; NONCE_SIZE]).unwrap();
        assert_eq!(open(&key(2), &sealed), Err(CryptoError::OpenFailed));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut sealed = seal(&key(1), b"contacts", [0; NONCE_SIZE]).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert_eq!(open(&key(1), &sealed), Err(CryptoError::OpenFailed));
    }

    #[test]
    fn truncated_blob_rejected() {
        assert_eq!(open(&key(1), &[0u8; 27]), Err(CryptoError::Truncated { len: 27 }));
    }
}
