//! Notary consensus.
//!
//! Validates the per-notary attestations relayed by the directory and
//! produces one authenticated hash per requested address. Pure: the caller
//! fetches responses and decides what to do with the outcome.
//!
//! # Algorithm
//!
//! 1. A configured notary that reported an error, or is absent from the
//!    response, produces a warning and is skipped.
//! 2. Each attestation from a responding notary is rejected if its address
//!    was not requested, its hash is malformed, its signature does not verify
//!    over `address=pubHash@timestamp`, or it disagrees with an earlier
//!    notary's hash for the same address.
//! 3. Each requested address with no valid attestation is reported missing;
//!    one with fewer agreeing notaries than the [`QuorumPolicy`] requires is
//!    an error.
//!
//! Conflicting and under-quorum addresses are removed from the authenticated
//! hashes, so nothing partially verified can leak out even if a caller
//! ignores the errors.

use std::collections::{BTreeMap, HashSet};

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use hashbind_proto::{Attestation, NotaryResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::{Address, PublicKeyHash},
    error::ConsensusError,
};

/// How many notaries must agree on an address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuorumPolicy {
    /// Every configured notary
    #[default]
    Unanimous,
    /// At least this many, capped at the number of configured notaries
    AtLeast(usize),
}

impl QuorumPolicy {
    /// Agreeing notaries required given `configured` notaries.
    pub fn required(self, configured: usize) -> usize {
        match self {
            Self::Unanimous => configured,
            Self::AtLeast(n) => n.clamp(1, configured.max(1)),
        }
    }
}

/// Notary configuration could not be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotaryConfigError {
    /// Config is not valid JSON of the expected shape
    #[error("malformed notary config: {0}")]
    Malformed(String),

    /// No notaries configured
    #[error("notary config lists no notaries")]
    Empty,

    /// Key is not 32 bytes of hex encoding a valid Ed25519 point
    #[error("invalid public key for notary {notary}: {reason}")]
    InvalidKey {
        /// Notary identifier
        notary: String,
        /// What was wrong
        reason: String,
    },

    /// Quorum of zero
    #[error("quorum must be at least 1")]
    ZeroQuorum,
}

/// On-disk notary configuration.
///
/// ```json
/// { "notaries": { "notary.example.com": "<64 hex chars>" }, "quorum": 2 }
/// ```
///
/// `quorum` is optional; when absent every notary must agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryConfig {
    /// Notary identifier → hex Ed25519 public key
    pub notaries: BTreeMap<String, String>,
    /// Minimum agreeing notaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum: Option<usize>,
}

impl NotaryConfig {
    /// Parse JSON config.
    pub fn from_json(bytes: &[u8]) -> Result<Self, NotaryConfigError> {
        serde_json::from_slice(bytes).map_err(|e| NotaryConfigError::Malformed(e.to_string()))
    }

    /// Decode keys into a [`NotarySet`].
    pub fn notary_set(&self) -> Result<NotarySet, NotaryConfigError> {
        if self.notaries.is_empty() {
            return Err(NotaryConfigError::Empty);
        }

        let mut keys = BTreeMap::new();
        for (notary, key_hex) in &self.notaries {
            let invalid =
                |reason: String| NotaryConfigError::InvalidKey { notary: notary.clone(), reason };

            let bytes = hex::decode(key_hex.trim()).map_err(|e| invalid(e.to_string()))?;
            let bytes: [u8; 32] = bytes
                .try_into()
                .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;
            let key = VerifyingKey::from_bytes(&bytes).map_err(|e| invalid(e.to_string()))?;
            keys.insert(notary.clone(), key);
        }

        Ok(NotarySet { keys })
    }

    /// Quorum policy this config asks for.
    pub fn quorum_policy(&self) -> Result<QuorumPolicy, NotaryConfigError> {
        match self.quorum {
            None => Ok(QuorumPolicy::Unanimous),
            Some(0) => Err(NotaryConfigError::ZeroQuorum),
            Some(n) => Ok(QuorumPolicy::AtLeast(n)),
        }
    }
}

/// Fixed notary identifier → verifying key mapping for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotarySet {
    keys: BTreeMap<String, VerifyingKey>,
}

impl NotarySet {
    /// Build directly from keys.
    pub fn new(keys: impl IntoIterator<Item = (String, VerifyingKey)>) -> Self {
        Self { keys: keys.into_iter().collect() }
    }

    /// Notary identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Number of configured notaries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no notaries are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Verifying key for `notary`.
    pub fn key(&self, notary: &str) -> Option<&VerifyingKey> {
        self.keys.get(notary)
    }
}

/// Non-fatal consensus observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusWarning {
    /// Notary reported an error
    NotaryFailed {
        /// Notary identifier
        notary: String,
        /// Reported error
        error: String,
    },
    /// Notary is configured but the directory relayed nothing from it
    NotaryMissing {
        /// Notary identifier
        notary: String,
    },
}

impl std::fmt::Display for ConsensusWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotaryFailed { notary, error } => write!(f, "notary {notary} failed: {error}"),
            Self::NotaryMissing { notary } => write!(f, "notary {notary} did not respond"),
        }
    }
}

/// Result of [`verify_notary_responses`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsensusOutcome {
    /// Notaries that failed or were silent
    pub warnings: Vec<ConsensusWarning>,
    /// Rejections. Any entry here must block use of this outcome.
    pub errors: Vec<ConsensusError>,
    /// Authenticated hash per address that reached quorum without conflict
    pub pub_hashes: BTreeMap<Address, PublicKeyHash>,
    /// Requested addresses no notary attested
    pub missing_hashes: Vec<Address>,
}

impl ConsensusOutcome {
    /// True if no attestation was rejected.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every notary's attestations for `addresses`.
pub fn verify_notary_responses(
    notaries: &NotarySet,
    quorum: QuorumPolicy,
    addresses: &[Address],
    responses: &BTreeMap<String, NotaryResponse>,
) -> ConsensusOutcome {
    let mut outcome = ConsensusOutcome::default();
    let mut notarized: BTreeMap<&Address, Vec<&str>> = BTreeMap::new();
    let mut conflicted: HashSet<&Address> = HashSet::new();

    for (notary, key) in &notaries.keys {
        let Some(response) = responses.get(notary) else {
            outcome.warnings.push(ConsensusWarning::NotaryMissing { notary: notary.clone() });
            continue;
        };

        if let Some(error) = &response.error {
            outcome
                .warnings
                .push(ConsensusWarning::NotaryFailed { notary: notary.clone(), error: error.clone() });
            continue;
        }

        for (attested, attestation) in &response.result {
            let Some(address) = addresses.iter().find(|a| a.as_str() == attested) else {
                outcome.errors.push(ConsensusError::Unsolicited {
                    notary: notary.clone(),
                    address: attested.clone(),
                });
                continue;
            };

            let hash = match check_attestation(key, attested, attestation) {
                Ok(hash) => hash,
                Err(reason) => {
                    outcome.errors.push(reason.into_error(notary, attested));
                    continue;
                },
            };

            match outcome.pub_hashes.get(address) {
                Some(agreed) if agreed != &hash => {
                    outcome.errors.push(ConsensusError::Conflict {
                        address: attested.clone(),
                        notary: notary.clone(),
                        agreed: agreed.to_string(),
                        conflicting: hash.to_string(),
                    });
                    conflicted.insert(address);
                },
                Some(_) => notarized.entry(address).or_default().push(notary),
                None => {
                    outcome.pub_hashes.insert(address.clone(), hash);
                    notarized.entry(address).or_default().push(notary);
                },
            }
        }
    }

    let required = quorum.required(notaries.len());
    for address in addresses {
        match notarized.get(address) {
            None => outcome.missing_hashes.push(address.clone()),
            Some(heard_from) if heard_from.len() < required => {
                outcome.errors.push(ConsensusError::InsufficientQuorum {
                    address: address.to_string(),
                    required,
                    heard_from: heard_from.iter().map(|n| (*n).to_string()).collect(),
                });
                outcome.pub_hashes.remove(address);
            },
            Some(_) => {},
        }
    }

    for address in conflicted {
        outcome.pub_hashes.remove(address);
    }

    outcome
}

enum Rejection {
    Malformed(String),
    BadSignature,
}

impl Rejection {
    fn into_error(self, notary: &str, address: &str) -> ConsensusError {
        match self {
            Self::Malformed(reason) => ConsensusError::InvalidAttestation {
                notary: notary.to_string(),
                address: address.to_string(),
                reason,
            },
            Self::BadSignature => ConsensusError::InvalidSignature {
                notary: notary.to_string(),
                address: address.to_string(),
            },
        }
    }
}

fn check_attestation(
    key: &VerifyingKey,
    address: &str,
    attestation: &Attestation,
) -> Result<PublicKeyHash, Rejection> {
    // Signature covers the hash as sent, so it must already be canonical.
    if !hashbind_crypto::is_public_key_hash(&attestation.pub_hash) {
        return Err(Rejection::Malformed(format!("bad pubHash {:?}", attestation.pub_hash)));
    }
    let hash = PublicKeyHash::parse(&attestation.pub_hash)
        .map_err(|e| Rejection::Malformed(e.to_string()))?;

    let signature_bytes =
        hex::decode(&attestation.signature).map_err(|e| Rejection::Malformed(e.to_string()))?;
    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        return Err(Rejection::Malformed("invalid signature format".to_string()));
    };

    let signed_data = attestation.signing_data(address);
    if key.verify(signed_data.as_bytes(), &signature).is_err() {
        return Err(Rejection::BadSignature);
    }

    Ok(hash)
}
