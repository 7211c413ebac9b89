//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key derivation and vault sealing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// scrypt rejected the cost parameters
    #[error("invalid kdf parameters: log_n={log_n}, r={r}, p={p}")]
    InvalidKdfParams {
        /// log2 of the CPU/memory cost
        log_n: u8,
        /// Block size
        r: u32,
        /// Parallelism
        p: u32,
    },

    /// Key material had the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length
        expected: usize,
        /// Actual key length
        actual: usize,
    },

    /// Sealed blob is shorter than nonce + tag
    #[error("sealed data truncated: {len} bytes")]
    Truncated {
        /// Length of the rejected blob
        len: usize,
    },

    /// Sealing failed (plaintext exceeds the AEAD limit)
    #[error("seal failed")]
    SealFailed,

    /// Authentication tag mismatch: wrong key or tampered blob
    #[error("open failed: wrong key or corrupted data")]
    OpenFailed,
}
