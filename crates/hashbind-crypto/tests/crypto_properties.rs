//! Property-based tests for the crypto primitives
//!
//! These tests verify the fundamental invariants:
//!
//! 1. **Hash shape**: every hash is 16 characters from `[a-z2-7]`
//! 2. **Determinism**: same inputs always produce same outputs
//! 3. **Separation**: auth token and protection key never coincide
//! 4. **Round-trip**: open(seal(m)) == m for all payloads

use hashbind_crypto::{
    KdfParams, NONCE_SIZE, ProtectionKey, derive_auth_token, derive_protection_key,
    derive_protection_key_legacy, is_public_key_hash, open, public_key_hash, seal,
};
use proptest::prelude::*;

/// scrypt at full cost is far too slow for hundreds of cases.
const FAST: KdfParams = KdfParams { log_n: 4, r: 1, p: 1 };

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_hash_shape(armored in ".*") {
        let hash = public_key_hash(&armored);

        prop_assert_eq!(hash.len(), 16);
        prop_assert!(hash.bytes().all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b)));
        prop_assert!(is_public_key_hash(&hash));
    }

    #[test]
    fn prop_hash_deterministic(armored in ".*") {
        prop_assert_eq!(public_key_hash(&armored), public_key_hash(&armored));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_derivation_deterministic(
        identity in "[a-z0-9]{3,12}",
        passphrase in ".{0,32}",
    ) {
        let token1 = derive_auth_token(&identity, &passphrase, &FAST).unwrap();
        let token2 = derive_auth_token(&identity, &passphrase, &FAST).unwrap();
        prop_assert_eq!(token1.as_str(), token2.as_str());

        let key1 = derive_protection_key(&identity, &passphrase, &FAST).unwrap();
        let key2 = derive_protection_key(&identity, &passphrase, &FAST).unwrap();
        prop_assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn prop_token_and_key_differ(
        identity in "[a-z0-9]{3,12}",
        passphrase in ".{0,32}",
    ) {
        let token = derive_auth_token(&identity, &passphrase, &FAST).unwrap();
        let key = derive_protection_key(&identity, &passphrase, &FAST).unwrap();

        // Compare over the 16 bytes both outputs have
        prop_assert_ne!(&token.as_str()[..32], hex::encode(key.as_bytes()));
    }

    #[test]
    fn prop_seal_open_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..2048),
        key_bytes in any::<[u8; 16]>(),
        nonce in any::<[u8; NONCE_SIZE]>(),
    ) {
        let key = ProtectionKey::from_bytes(key_bytes);
        let sealed = seal(&key, &plaintext, nonce).unwrap();

        prop_assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn prop_legacy_sealed_opens_only_with_legacy_key(
        identity in "[a-z0-9]{3,12}",
        passphrase in ".{1,32}",
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let legacy = derive_protection_key_legacy(&identity, &passphrase);
        let current = derive_protection_key(&identity, &passphrase, &FAST).unwrap();
        let sealed = seal(&legacy, &plaintext, [9; NONCE_SIZE]).unwrap();

        prop_assert!(open(&current, &sealed).is_err());
        prop_assert_eq!(open(&legacy, &sealed).unwrap(), plaintext);
    }
}
