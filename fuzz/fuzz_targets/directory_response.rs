//! Fuzz target for directory reply decoding
//!
//! Replies arrive from an untrusted server, so decoding must never panic.
//! Anything that decodes must survive a re-encode unchanged.

#![no_main]

use hashbind_proto::{DirectoryResponse, ReverseLookupResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(response) = DirectoryResponse::from_json(data) {
        let encoded = response.to_json().expect("decoded response must re-encode");
        let decoded =
            DirectoryResponse::from_json(&encoded).expect("re-encoded response must decode");
        assert_eq!(response, decoded);
    }

    let _ = ReverseLookupResponse::from_json(data);
});
