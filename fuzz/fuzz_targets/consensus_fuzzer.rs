//! Fuzz target for notary consensus
//!
//! Drives `verify_notary_responses` with a fixed three-notary set and
//! adversarial replies: honest, forged, and mismatched attestations, plus
//! notary-level errors and omissions.
//!
//! # Invariants
//!
//! - NEVER panic on any reply
//! - Only requested addresses receive a hash
//! - An address with no honest attestation never receives a hash
//! - A conflicting address never receives a hash

#![no_main]

use std::collections::{BTreeMap, BTreeSet};

use arbitrary::Arbitrary;
use ed25519_dalek::{Signer, SigningKey};
use hashbind_core::{
    verify_notary_responses, Address, ConsensusError, NotarySet, QuorumPolicy,
};
use hashbind_proto::{Attestation, NotaryResponse};
use libfuzzer_sys::fuzz_target;

const NOTARIES: [(&str, u8); 3] = [("alpha", 1), ("beta", 2), ("gamma", 3)];
const ADDRESSES: [&str; 4] =
    ["alice@example.com", "bob@example.com", "carol@example.org", "dave@host"];
const HASHES: [&str; 3] = ["abcdefghij234567", "zzzzzzzzzzzzzzzz", "aaaaaaaaaaaaaaaa"];

#[derive(Debug, Arbitrary)]
struct Input {
    requested: u8,
    quorum: Option<u8>,
    replies: Vec<Reply>,
}

#[derive(Debug, Arbitrary)]
enum Reply {
    Missing,
    Failed(String),
    Attest(Vec<Claim>),
}

#[derive(Debug, Arbitrary)]
struct Claim {
    address: u8,
    hash: u8,
    forge: Forgery,
    timestamp: u64,
}

#[derive(Debug, Arbitrary)]
enum Forgery {
    Honest,
    WrongKey,
    WrongAddress,
    RawSignature(Vec<u8>),
    RawHash(String),
}

fuzz_target!(|input: Input| {
    let notaries = NotarySet::new(NOTARIES.iter().map(|(id, seed)| {
        ((*id).to_string(), SigningKey::from_bytes(&[*seed; 32]).verifying_key())
    }));
    let requested: Vec<Address> = ADDRESSES
        .iter()
        .enumerate()
        .filter(|(i, _)| input.requested & (1 << i) != 0)
        .map(|(_, a)| Address::parse(a).expect("fixture address"))
        .collect();

    let mut responses = BTreeMap::new();
    let mut honest: BTreeSet<&str> = BTreeSet::new();
    for ((id, seed), reply) in NOTARIES.iter().zip(&input.replies) {
        let key = SigningKey::from_bytes(&[*seed; 32]);
        let response = match reply {
            Reply::Missing => continue,
            Reply::Failed(error) => {
                NotaryResponse { result: BTreeMap::new(), error: Some(error.clone()) }
            },
            Reply::Attest(claims) => {
                let mut result = BTreeMap::new();
                for claim in claims {
                    let address = ADDRESSES[claim.address as usize % ADDRESSES.len()];
                    let mut attestation = Attestation {
                        pub_hash: HASHES[claim.hash as usize % HASHES.len()].to_string(),
                        timestamp: claim.timestamp,
                        signature: String::new(),
                    };
                    attestation.signature = match &claim.forge {
                        Forgery::Honest => {
                            honest.insert(address);
                            sign(&key, &attestation, address)
                        },
                        Forgery::WrongKey => {
                            sign(&SigningKey::from_bytes(&[0xee; 32]), &attestation, address)
                        },
                        Forgery::WrongAddress => sign(&key, &attestation, "mallory@example.com"),
                        Forgery::RawSignature(bytes) => hex::encode(bytes),
                        Forgery::RawHash(hash) => {
                            attestation.pub_hash = hash.clone();
                            sign(&key, &attestation, address)
                        },
                    };
                    result.insert(address.to_string(), attestation);
                }
                NotaryResponse { result, error: None }
            },
        };
        responses.insert((*id).to_string(), response);
    }

    let quorum = match input.quorum {
        Some(n) => QuorumPolicy::AtLeast(n as usize),
        None => QuorumPolicy::Unanimous,
    };
    let outcome = verify_notary_responses(&notaries, quorum, &requested, &responses);

    let conflicted: BTreeSet<&str> = outcome
        .errors
        .iter()
        .filter_map(|e| match e {
            ConsensusError::Conflict { address, .. } => Some(address.as_str()),
            _ => None,
        })
        .collect();

    for address in outcome.pub_hashes.keys() {
        assert!(requested.contains(address), "hash for unrequested {address}");
        assert!(
            honest.contains(address.as_str()) || raw_hash_claimed(&input, address.as_str()),
            "hash for {address} without a valid attestation"
        );
        assert!(!conflicted.contains(address.as_str()), "conflicted {address} kept a hash");
    }
});

fn sign(key: &SigningKey, attestation: &Attestation, address: &str) -> String {
    hex::encode(key.sign(attestation.signing_data(address).as_bytes()).to_bytes())
}

/// A `RawHash` claim is still signed by the notary, so it authenticates if
/// the hash happens to be well formed.
fn raw_hash_claimed(input: &Input, address: &str) -> bool {
    input.replies.iter().take(NOTARIES.len()).any(|reply| match reply {
        Reply::Attest(claims) => claims.iter().any(|c| {
            matches!(c.forge, Forgery::RawHash(_))
                && ADDRESSES[c.address as usize % ADDRESSES.len()] == address
        }),
        _ => false,
    })
}
