//! Error types for the hashbind core.
//!
//! Errors are split by how the caller recovers. Address, contact and
//! recipient errors are local validation failures reported as a batch.
//! Consensus and resolution errors may indicate a compromised directory and
//! carry a [`Severity`] so callers can tell a retry from an attack.

use hashbind_proto::ProtocolError;
use thiserror::Error;

/// How a failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Report and let the user retry or correct input
    Recoverable,
    /// Potential attack: abort, cache nothing, warn the user prominently
    Security,
}

/// Malformed address or key hash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Input was empty after trimming
    #[error("empty email address")]
    Empty,

    /// Input is not `local@domain`
    #[error("invalid email address: {0}")]
    Invalid(String),

    /// Hash-qualified form without a `#hash` segment
    #[error("address has no embedded hash: {0}")]
    MissingHash(String),

    /// Hash was empty after trimming
    #[error("empty public key hash")]
    EmptyHash,

    /// Hash is not 16 characters of `[a-z2-7]`
    #[error("invalid public key hash: {0}")]
    InvalidHash(String),
}

/// One contact-list invariant violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// Name contains characters outside `[a-z0-9._%+-]`
    #[error("invalid contact name: {0}")]
    InvalidName(String),

    /// Entry has a name but no address
    #[error("no email address for name: {}", .name.as_deref().unwrap_or(""))]
    MissingAddress {
        /// Contact name, if any
        name: Option<String>,
    },

    /// Address failed to parse
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Address is valid but no hash is known
    #[error("public key hash unknown for {0}")]
    MissingHash(String),

    /// Hash is present but malformed
    #[error("invalid public key hash for {address}: {hash}")]
    InvalidHash {
        /// Contact address
        address: String,
        /// Offending hash
        hash: String,
    },

    /// Same address appears twice
    #[error("duplicate email address: {0}")]
    DuplicateAddress(String),

    /// Same name (case-insensitive) appears twice
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Stored blob could not be decoded
    #[error("contact list decode failed: {0}")]
    Decode(String),

    /// Contact list could not be encoded
    #[error("contact list encode failed: {0}")]
    Encode(String),
}

/// Recipient alias resolution failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    /// No recipients given
    #[error("enter an email address to send to")]
    NoRecipients,

    /// Looks like a contact name but no contact has it
    #[error("unknown contact name {0}")]
    UnknownName(String),

    /// Neither an address nor a contact name
    #[error("invalid email address {0}")]
    InvalidAddress(String),
}

/// Legacy contact list could not be upgraded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// Current and legacy entries in the same list
    #[error("expected legacy contact format but found one with pubHash already")]
    MixedFormats,

    /// Legacy entry whose local part is not a 16 or 40 character hash
    #[error("expected legacy contacts list to have hash address: {0}")]
    NotHashAddress(String),

    /// Some legacy hashes did not resolve both ways
    #[error("contacts migration failed for hash(es): {}", .hashes.join(","))]
    Incomplete {
        /// Legacy hashes that failed
        hashes: Vec<String>,
    },

    /// Migrated list violates contact invariants
    #[error("migrated contacts are invalid: {}", join_errors(.0))]
    Invalid(Vec<ContactError>),
}

/// Notary attestation rejected during consensus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// Notary attested an address nobody asked about
    #[error("unsolicited notary response from {notary} for {address}")]
    Unsolicited {
        /// Notary identifier
        notary: String,
        /// Unrequested address
        address: String,
    },

    /// Signature did not verify against the notary's key
    #[error("invalid notary response from {notary} for {address}")]
    InvalidSignature {
        /// Notary identifier
        notary: String,
        /// Attested address
        address: String,
    },

    /// Attestation fields are malformed
    #[error("malformed attestation from {notary} for {address}: {reason}")]
    InvalidAttestation {
        /// Notary identifier
        notary: String,
        /// Attested address
        address: String,
        /// What was wrong
        reason: String,
    },

    /// Two notaries attested different hashes for one address
    #[error("notary conflict for {address}: {notary} attested {conflicting}, expected {agreed}")]
    Conflict {
        /// Address in dispute
        address: String,
        /// Notary whose attestation disagreed
        notary: String,
        /// Hash attested by the first notary
        agreed: String,
        /// Hash attested by `notary`
        conflicting: String,
    },

    /// Too few notaries agreed
    #[error(
        "missing notaries, could not resolve {address}: need {required}, only heard from: {}",
        .heard_from.join(", ")
    )]
    InsufficientQuorum {
        /// Address that fell short
        address: String,
        /// Number of agreeing notaries required
        required: usize,
        /// Notaries that did agree
        heard_from: Vec<String>,
    },
}

/// Fatal resolution failure.
///
/// Per-address problems such as a directory-reported error or an ambiguous
/// key are not fatal; they appear in the resolution result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Notary consensus rejected the response
    #[error("notary consensus failed: {}", join_errors(.errors))]
    Consensus {
        /// Every rejected attestation or quorum failure
        errors: Vec<ConsensusError>,
    },

    /// Directory returned a key whose hash differs from the authenticated one
    #[error("SECURITY WARNING: received an incorrect key for {address}")]
    HashMismatch {
        /// Affected address
        address: String,
        /// Hash from the contact list or notary consensus
        expected: String,
        /// Hash of the key material actually received
        computed: String,
    },

    /// Directory returned key material for an address nobody asked about
    #[error("SECURITY WARNING: unsolicited key material for {address}")]
    UnsolicitedKey {
        /// Unrequested address
        address: String,
    },

    /// Directory returned key material with no authenticated hash to check
    #[error("SECURITY WARNING: no authenticated hash for key received for {address}")]
    UnauthenticatedKey {
        /// Affected address
        address: String,
    },

    /// Directory reply did not match the schema
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Directory could not be reached
    #[error("directory unavailable: {0}")]
    Transport(String),
}

impl ResolveError {
    /// Severity class of this failure.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Consensus { .. }
            | Self::HashMismatch { .. }
            | Self::UnsolicitedKey { .. }
            | Self::UnauthenticatedKey { .. } => Severity::Security,
            Self::Protocol(_) | Self::Transport(_) => Severity::Recoverable,
        }
    }

    /// True if the directory or a notary may be compromised.
    pub fn is_security_critical(&self) -> bool {
        self.severity() == Severity::Security
    }
}

/// Per-address resolution failure. Reported in the result, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyLookupError {
    /// Directory reported an error for this address
    #[error("{0}")]
    Directory(String),

    /// Directory reply had no entry for this address
    #[error("missing lookup result")]
    Missing,

    /// Key material parsed to zero or several keys
    #[error("incorrect number of public keys in armor: {count}")]
    Ambiguous {
        /// Keys found
        count: usize,
    },

    /// Key material could not be parsed
    #[error("unreadable public key: {0}")]
    Unparseable(String),
}

/// PGP engine failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgpError {
    /// Keypair generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Armored key could not be read
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Encrypt-and-sign failed
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Decrypt-and-verify failed
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
