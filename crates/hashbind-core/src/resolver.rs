//! Key resolver state machine.
//!
//! Turns addresses into trust-checked public keys. Sans-IO: [`ResolutionPlan`]
//! partitions the request and builds the [`DirectoryQuery`]; the caller
//! performs the round trip and hands the reply to
//! [`ResolutionPlan::complete`], which runs notary consensus, checks every
//! received key against its authenticated hash, and parses what survived.
//!
//! ```text
//! addresses ──► partition ──► DirectoryQuery ──► (caller I/O)
//!                  │                                  │
//!                  ▼                                  ▼
//!           known hashes ──────────────► DirectoryResponse
//!                                                     │
//!                      consensus (name-only) ◄────────┤
//!                                                     ▼
//!                              hash check ──► parse ──► Resolution
//! ```
//!
//! # Security
//!
//! The hash check is the one step that stops a compromised directory from
//! substituting a key. A mismatch aborts the whole resolution and nothing is
//! reported as newly learned.

use std::collections::{BTreeMap, HashSet};

use hashbind_proto::{DirectoryQuery, DirectoryResponse, PublicKeyEntry};

use crate::{
    address::{Address, PublicKeyHash},
    consensus::{ConsensusWarning, NotarySet, QuorumPolicy, verify_notary_responses},
    contact::{Contact, ContactList},
    error::{KeyLookupError, ResolveError},
    pgp::{PgpEngine, PublicKey},
};

/// Resolver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Notary agreement required for name resolution
    pub quorum: QuorumPolicy,
}

/// Key that passed the hash check and parsed to exactly one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    /// Authenticated hash
    pub pub_hash: PublicKeyHash,
    /// Armored key text as received
    pub armored: String,
    /// Parsed key
    pub key: PublicKey,
}

/// Outcome for one address: a usable key or an explicit error, never both.
pub type ResolutionResult = Result<ResolvedKey, KeyLookupError>;

/// Completed resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Entry for every requested address
    pub keys: BTreeMap<Address, ResolutionResult>,
    /// Bindings learned through notaries in this resolution, unnamed.
    /// Persisting them is the caller's decision.
    pub newly_learned: Vec<Contact>,
    /// Notary warnings to surface
    pub warnings: Vec<ConsensusWarning>,
}

impl Resolution {
    /// Resolved key for `address`, if any.
    pub fn key(&self, address: &Address) -> Option<&ResolvedKey> {
        self.keys.get(address).and_then(|r| r.as_ref().ok())
    }

    /// Addresses without a usable key.
    pub fn failures(&self) -> impl Iterator<Item = (&Address, &KeyLookupError)> {
        self.keys.iter().filter_map(|(a, r)| r.as_ref().err().map(|e| (a, e)))
    }
}

/// One resolution in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPlan {
    requested: Vec<Address>,
    known: BTreeMap<Address, PublicKeyHash>,
    name_only: Vec<Address>,
    query: DirectoryQuery,
}

impl ResolutionPlan {
    /// Partition `addresses` by whether the contact list already knows the
    /// hash. Duplicates are dropped, first occurrence wins.
    pub fn new(addresses: &[Address], contacts: &ContactList, notaries: &NotarySet) -> Self {
        let mut seen = HashSet::new();
        let requested: Vec<Address> =
            addresses.iter().filter(|a| seen.insert(*a)).cloned().collect();

        let mut known = BTreeMap::new();
        let mut name_only = Vec::new();
        let mut query = DirectoryQuery {
            notaries: notaries.ids().map(str::to_string).collect(),
            ..DirectoryQuery::default()
        };

        for address in &requested {
            if let Some(hash) = contacts.lookup_hash_locally(address) {
                query.hash_addresses.push(address.with_hash(hash).to_string());
                known.insert(address.clone(), hash.clone());
            } else {
                query.name_addresses.push(address.to_string());
                name_only.push(address.clone());
            }
        }

        Self { requested, known, name_only, query }
    }

    /// Query to send. Empty when nothing was requested.
    pub fn query(&self) -> &DirectoryQuery {
        &self.query
    }

    /// De-duplicated requested addresses.
    pub fn requested(&self) -> &[Address] {
        &self.requested
    }

    /// Addresses that need notary name resolution.
    pub fn name_only(&self) -> &[Address] {
        &self.name_only
    }

    /// Addresses resolved from the contact list.
    pub fn known_hashes(&self) -> &BTreeMap<Address, PublicKeyHash> {
        &self.known
    }

    /// True if a directory round trip is required.
    pub fn needs_directory(&self) -> bool {
        !self.requested.is_empty()
    }

    /// Validate the directory reply and produce the resolution.
    ///
    /// Aborts on any consensus error, on key material for an address that was
    /// not requested or has no authenticated hash, and on any hash mismatch.
    pub fn complete<E: PgpEngine + ?Sized>(
        self,
        response: &DirectoryResponse,
        notaries: &NotarySet,
        config: &ResolverConfig,
        engine: &E,
    ) -> Result<Resolution, ResolveError> {
        let mut resolution = Resolution::default();
        let mut authenticated = self.known;

        if !self.name_only.is_empty() {
            let outcome = verify_notary_responses(
                notaries,
                config.quorum,
                &self.name_only,
                &response.name_resolution,
            );
            if !outcome.errors.is_empty() {
                return Err(ResolveError::Consensus { errors: outcome.errors });
            }
            resolution.warnings = outcome.warnings;
            authenticated.extend(outcome.pub_hashes);
        }

        for (raw_address, entry) in &response.public_keys {
            let address = Address::parse(raw_address)
                .ok()
                .filter(|a| self.requested.contains(a))
                .ok_or_else(|| ResolveError::UnsolicitedKey { address: raw_address.clone() })?;

            let armored = match entry {
                PublicKeyEntry::Error(error) => {
                    resolution.keys.insert(address, Err(KeyLookupError::Directory(error.clone())));
                    continue;
                },
                PublicKeyEntry::Key(armored) => armored,
            };

            let Some(expected) = authenticated.get(&address) else {
                return Err(ResolveError::UnauthenticatedKey { address: address.to_string() });
            };
            let computed = PublicKeyHash::of_key(armored);
            if &computed != expected {
                return Err(ResolveError::HashMismatch {
                    address: address.to_string(),
                    expected: expected.to_string(),
                    computed: computed.to_string(),
                });
            }

            let learned = self.name_only.contains(&address).then(|| computed.clone());

            let result = match engine.read_public_keys(armored) {
                Ok(mut keys) if keys.len() == 1 => Ok(ResolvedKey {
                    pub_hash: computed,
                    armored: armored.clone(),
                    key: keys.remove(0),
                }),
                Ok(keys) => Err(KeyLookupError::Ambiguous { count: keys.len() }),
                Err(e) => Err(KeyLookupError::Unparseable(e.to_string())),
            };
            if let Some(hash) = learned.filter(|_| result.is_ok()) {
                resolution.newly_learned.push(Contact::new(address.clone(), hash));
            }
            resolution.keys.insert(address, result);
        }

        for address in self.requested {
            resolution.keys.entry(address).or_insert(Err(KeyLookupError::Missing));
        }

        Ok(resolution)
    }
}
