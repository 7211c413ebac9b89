//! Fuzz target for address and hash parsing
//!
//! Every accepted value must display as text that parses back to itself.

#![no_main]

use hashbind_core::{Address, HashQualifiedAddress, PublicKeyHash};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    if let Ok(address) = Address::parse(input) {
        assert_eq!(Address::parse(&address.to_string()).as_ref(), Ok(&address));
    }

    if let Ok(qualified) = HashQualifiedAddress::parse(input) {
        assert_eq!(HashQualifiedAddress::parse(&qualified.to_string()).as_ref(), Ok(&qualified));
    }

    if let Ok(hash) = PublicKeyHash::parse(input) {
        assert_eq!(hash.as_str().len(), 16);
    }
});
