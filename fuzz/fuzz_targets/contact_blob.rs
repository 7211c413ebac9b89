//! Fuzz target for stored contact lists
//!
//! Feeds arbitrary bytes through the load path: decode, classify as current
//! or legacy, then validate.
//!
//! # Invariants
//!
//! - NEVER panic on malformed CBOR
//! - A list that validates re-encodes to bytes that validate to the same list

#![no_main]

use hashbind_core::{classify, contact::decode_stored, validate, StoredContacts};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(drafts) = decode_stored(data) else {
        return;
    };
    let Ok(StoredContacts::Current(drafts)) = classify(drafts) else {
        return;
    };
    let Ok(list) = validate(&drafts).into_list() else {
        return;
    };

    let bytes = list.to_bytes().expect("valid list must encode");
    let reloaded = decode_stored(&bytes).expect("encoded list must decode");
    let relisted = validate(&reloaded).into_list().expect("encoded list must validate");
    assert_eq!(list, relisted);
});
