//! Content-addressed public key hash.
//!
//! Maps an armored public key to a short, typable identifier. The same
//! construction as onion service names: first 80 bits of SHA-1, base-32
//! encoded five bits at a time, most significant bit first.

use sha1::{Digest, Sha1};

/// Length of an encoded public key hash in characters.
pub const PUBLIC_KEY_HASH_LEN: usize = 16;

/// Digest bytes covered by the hash (80 bits).
const TRUNCATED_DIGEST_SIZE: usize = 10;

/// Base-32 alphabet: values 0-25 map to `a-z`, 26-31 map to `2-7`.
const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Compute the public key hash of an armored key.
///
/// Deterministic: identical key text always yields the identical 16
/// characters drawn from `[a-z2-7]`.
pub fn public_key_hash(armored: &str) -> String {
    let digest = Sha1::digest(armored.as_bytes());

    let bits = digest[..TRUNCATED_DIGEST_SIZE]
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));

    let total_bits = TRUNCATED_DIGEST_SIZE * 8;
    let mut out = String::with_capacity(PUBLIC_KEY_HASH_LEN);
    for i in 0..PUBLIC_KEY_HASH_LEN {
        let shift = total_bits - 5 * (i + 1);
        let digit = ((bits >> shift) & 0x1f) as usize;
        out.push(char::from(ALPHABET[digit]));
    }

    debug_assert_eq!(out.len(), PUBLIC_KEY_HASH_LEN);
    out
}

/// Full hex SHA-1 of an armored key.
///
/// The oldest contact lists named keys by this 40-character digest. It is
/// only used to check that a migrated contact still points at the same key.
pub fn legacy_public_key_digest(armored: &str) -> String {
    hex::encode(Sha1::digest(armored.as_bytes()))
}

/// Check that `candidate` is syntactically a public key hash.
///
/// Exact match only: no trimming or case folding.
pub fn is_public_key_hash(candidate: &str) -> bool {
    candidate.len() == PUBLIC_KEY_HASH_LEN && candidate.bytes().all(|b| ALPHABET.contains(&b))
}
