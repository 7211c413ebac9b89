//! Fakes shared by the client integration tests.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use ed25519_dalek::{Signer, SigningKey};
use hashbind_client::{Directory, DirectoryError, SessionConfig};
use hashbind_core::{
    Address, Decrypted, Environment, GeneratedKeypair, HashQualifiedAddress, NotaryConfig,
    NotarySet, PgpEngine, PgpError, PublicKey, PublicKeyHash,
};
use hashbind_crypto::KdfParams;
use hashbind_proto::{
    Attestation, DirectoryQuery, DirectoryResponse, NotaryResponse, PublicKeyEntry,
    ReverseLookupRequest, ReverseLookupResponse,
};

/// Deterministic nonces.
#[derive(Clone, Default)]
pub struct SeededEnv(Arc<Mutex<u8>>);

impl Environment for SeededEnv {
    fn random_bytes(&self, buffer: &mut [u8]) {
        let mut counter = self.0.lock().unwrap();
        *counter = counter.wrapping_add(1);
        buffer.fill(*counter);
    }
}

/// Every armored block is one key whose id is its text.
pub struct SingleKeyEngine;

impl PgpEngine for SingleKeyEngine {
    fn generate_keypair(&self, bits: u32) -> Result<GeneratedKeypair, PgpError> {
        Ok(GeneratedKeypair {
            public_armored: format!("public-{bits}"),
            private_armored: format!("private-{bits}"),
        })
    }

    fn read_public_keys(&self, armored: &str) -> Result<Vec<PublicKey>, PgpError> {
        Ok(vec![PublicKey { key_id: armored.to_string(), armored: armored.to_string() }])
    }

    fn encrypt_and_sign(&self, _: &str, _: &[PublicKey], plaintext: &str) -> Result<String, PgpError> {
        Ok(plaintext.to_string())
    }

    fn decrypt_and_verify(
        &self,
        _: &str,
        ciphertext: &str,
        _: Option<&PublicKey>,
    ) -> Result<Decrypted, PgpError> {
        Ok(Decrypted { plaintext: ciphertext.to_string(), signature_valid: false })
    }
}

pub struct Notary {
    pub id: &'static str,
    seed: u8,
    key: SigningKey,
}

impl Notary {
    pub fn new(id: &'static str, seed: u8) -> Self {
        Self { id, seed, key: SigningKey::from_bytes(&[seed; 32]) }
    }

    pub fn attest(&self, address: &str, armored: &str) -> (String, Attestation) {
        let mut attestation = Attestation {
            pub_hash: PublicKeyHash::of_key(armored).to_string(),
            timestamp: 1_380_000_000,
            signature: String::new(),
        };
        attestation.signature =
            hex::encode(self.key.sign(attestation.signing_data(address).as_bytes()).to_bytes());
        (address.to_string(), attestation)
    }
}

pub fn notary_set(notaries: &[&Notary]) -> NotarySet {
    NotaryConfig {
        notaries: notaries
            .iter()
            .map(|n| (n.id.to_string(), hex::encode(n.key.verifying_key().to_bytes())))
            .collect(),
        quorum: None,
    }
    .notary_set()
    .unwrap()
}

/// Directory that answers from a table of published keys.
///
/// Name-only addresses are attested by every honest notary; `substitute`
/// swaps the served key for one address after attestation.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    inner: Arc<Mutex<FakeDirectoryInner>>,
}

#[derive(Default)]
struct FakeDirectoryInner {
    keys: BTreeMap<String, String>,
    substitutes: BTreeMap<String, String>,
    reverse: BTreeMap<String, String>,
    notaries: Vec<(&'static str, u8)>,
    queries: Vec<DirectoryQuery>,
    offline: bool,
}

impl FakeDirectory {
    pub fn new(notaries: &[&Notary]) -> Self {
        let dir = Self::default();
        dir.inner.lock().unwrap().notaries =
            notaries.iter().map(|n| (n.id, n.seed)).collect();
        dir
    }

    pub fn publish(&self, address: &str, armored: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.keys.insert(address.to_string(), armored.to_string());
        inner.reverse.insert(PublicKeyHash::of_key(armored).to_string(), address.to_string());
    }

    pub fn reverse_alias(&self, legacy_hash: &str, address: &str) {
        self.inner.lock().unwrap().reverse.insert(legacy_hash.to_string(), address.to_string());
    }

    pub fn substitute(&self, address: &str, armored: &str) {
        self.inner.lock().unwrap().substitutes.insert(address.to_string(), armored.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub fn queries(&self) -> Vec<DirectoryQuery> {
        self.inner.lock().unwrap().queries.clone()
    }
}

impl Directory for FakeDirectory {
    async fn query(&self, query: &DirectoryQuery) -> Result<DirectoryResponse, DirectoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.offline {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        inner.queries.push(query.clone());

        let mut response = DirectoryResponse::default();
        for (id, seed) in &inner.notaries {
            let notary = Notary::new(id, *seed);
            let result = query
                .name_addresses
                .iter()
                .filter_map(|a| inner.keys.get(a).map(|k| notary.attest(a, k)))
                .collect();
            response.name_resolution.insert((*id).to_string(), NotaryResponse { result, error: None });
        }

        let plain = query.name_addresses.iter().cloned();
        let qualified = query.hash_addresses.iter().map(|q| {
            HashQualifiedAddress::parse(q).unwrap().address.to_string()
        });
        for address in plain.chain(qualified) {
            let entry = match inner.substitutes.get(&address).or_else(|| inner.keys.get(&address)) {
                Some(armored) => PublicKeyEntry::Key(armored.clone()),
                None => PublicKeyEntry::Error("unknown user".into()),
            };
            response.public_keys.insert(address, entry);
        }
        Ok(response)
    }

    async fn reverse_lookup(
        &self,
        request: &ReverseLookupRequest,
    ) -> Result<ReverseLookupResponse, DirectoryError> {
        let inner = self.inner.lock().unwrap();
        if inner.offline {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        Ok(ReverseLookupResponse(
            request
                .pub_hashes
                .iter()
                .filter_map(|h| inner.reverse.get(h).map(|a| (h.clone(), a.clone())))
                .collect(),
        ))
    }
}

pub fn fast_config() -> SessionConfig {
    SessionConfig { kdf: KdfParams { log_n: 4, r: 1, p: 1 } }
}

pub fn addr(s: &str) -> Address {
    Address::parse(s).unwrap()
}
