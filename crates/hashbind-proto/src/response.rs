//! Directory replies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// A notary's signed claim binding an address to a public key hash.
///
/// The address is not part of the struct: on the wire it is the map key the
/// attestation is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// Attested public key hash
    pub pub_hash: String,
    /// Notary timestamp (seconds)
    pub timestamp: u64,
    /// Hex-encoded signature over [`Attestation::signing_data`]
    pub signature: String,
}

impl Attestation {
    /// Canonical signed string: `address "=" pubHash "@" timestamp`.
    pub fn signing_data(&self, address: &str) -> String {
        format!("{address}={}@{}", self.pub_hash, self.timestamp)
    }
}

/// One notary's reply, as relayed by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryResponse {
    /// Attestations keyed by address
    #[serde(default)]
    pub result: BTreeMap<String, Attestation>,
    /// Set when the notary could not be reached or refused the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Key material (or a per-address failure) for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPublicKeyEntry", into = "RawPublicKeyEntry")]
pub enum PublicKeyEntry {
    /// Armored public key
    Key(String),
    /// Directory-reported error
    Error(String),
}

/// Wire shape of [`PublicKeyEntry`]: exactly one field must be set.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPublicKeyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawPublicKeyEntry> for PublicKeyEntry {
    type Error = String;

    fn try_from(raw: RawPublicKeyEntry) -> Result<PublicKeyEntry, String> {
        match (raw.pub_key, raw.error) {
            (Some(key), None) => Ok(PublicKeyEntry::Key(key)),
            (None, Some(error)) => Ok(PublicKeyEntry::Error(error)),
            (Some(_), Some(_)) => Err("public key entry has both pubKey and error".to_string()),
            (None, None) => Err("public key entry has neither pubKey nor error".to_string()),
        }
    }
}

impl From<PublicKeyEntry> for RawPublicKeyEntry {
    fn from(entry: PublicKeyEntry) -> Self {
        match entry {
            PublicKeyEntry::Key(key) => Self { pub_key: Some(key), error: None },
            PublicKeyEntry::Error(error) => Self { pub_key: None, error: Some(error) },
        }
    }
}

/// Reply to a [`crate::DirectoryQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryResponse {
    /// Per-notary replies keyed by notary identifier. Empty when the query
    /// had no name-resolution addresses.
    #[serde(default)]
    pub name_resolution: BTreeMap<String, NotaryResponse>,
    /// Key material keyed by plain address
    pub public_keys: BTreeMap<String, PublicKeyEntry>,
}

impl DirectoryResponse {
    /// Decode and schema-check a JSON reply.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::malformed(&e))
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Reply to a [`crate::ReverseLookupRequest`]: hash → current address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReverseLookupResponse(pub BTreeMap<String, String>);

impl ReverseLookupResponse {
    /// Decode and schema-check a JSON reply.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::malformed(&e))
    }

    /// Current address for `pub_hash`, if the directory knew it.
    pub fn address_for(&self, pub_hash: &str) -> Option<&str> {
        self.0.get(pub_hash).map(String::as_str)
    }
}
