//! Hashbind Cryptographic Primitives
//!
//! Cryptographic building blocks for Hashbind. Pure functions with
//! deterministic outputs. Callers provide random bytes (the vault nonce) so
//! tests stay deterministic.
//!
//! # Key Lifecycle
//!
//! One passphrase yields two independent secrets. The auth token leaves the
//! device as a login credential; the protection key never does.
//!
//! ```text
//! (identity, passphrase)
//!        │
//!        ├── scrypt(salt = "1" || identity) → Auth Token (20 bytes, hex)
//!        │
//!        └── scrypt(salt = "2" || identity) → Protection Key (16 bytes)
//!                                                    │
//!                                                    ▼
//!                                   AES-128-GCM seal → Vault blobs
//!                                   (private key, contact list)
//! ```
//!
//! The legacy derivation (one SHA-1 pass over `salt || identity ||
//! passphrase`) is kept only so data sealed before the scrypt upgrade can
//! still be opened. It is never used to seal anything new.
//!
//! # Public Key Hash
//!
//! `SHA-1(armored key)` truncated to 80 bits and written as 16 base-32
//! characters (`a-z`, `2-7`). The hash is a network-visible identifier, so
//! digest, bit order and alphabet are fixed.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod kdf;
pub mod pubhash;
pub mod vault_cipher;

pub use error::CryptoError;
pub use kdf::{
    AUTH_TOKEN_SIZE, AuthToken, KdfParams, PROTECTION_KEY_SIZE, ProtectionKey, derive_auth_token,
    derive_auth_token_legacy, derive_protection_key, derive_protection_key_legacy,
};
pub use pubhash::{
    PUBLIC_KEY_HASH_LEN, is_public_key_hash, legacy_public_key_digest, public_key_hash,
};
pub use vault_cipher::{NONCE_SIZE, TAG_SIZE, open, seal};
