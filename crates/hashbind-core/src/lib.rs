//! Hashbind core: trust-checked public key resolution.
//!
//! Users address correspondents by name or email address, but every
//! cryptographic operation is anchored to a [`PublicKeyHash`] derived from
//! the recipient's key. A directory serves keys and relays signed notary
//! attestations; nothing it says is trusted until the attestations agree and
//! the key material hashes to the attested value.
//!
//! # Architecture
//!
//! Sans-IO. This crate never touches the network, storage or the clock:
//!
//! - [`ResolutionPlan`] builds the directory query and validates the reply
//! - [`verify_notary_responses`] is a pure validator over fetched responses
//! - [`contact`] holds the pure contact cache operations
//! - [`LegacyMigration`] plans the upgrade of hash-less contact lists
//!
//! Randomness comes from an [`Environment`] and asymmetric crypto from a
//! [`PgpEngine`], both supplied by the caller. Warnings are returned as data
//! rather than logged.
//!
//! # Invariants
//!
//! - A key is only returned if its computed hash equals the hash from the
//!   contact list or from notary consensus
//! - Any consensus error aborts the resolution; partial trust is never
//!   returned
//! - Every requested address appears in the result, as a key or an error

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod address;
pub mod consensus;
pub mod contact;
pub mod env;
pub mod error;
pub mod migration;
pub mod pgp;
pub mod recipients;
pub mod resolver;
pub mod send;

pub use address::{Address, HashQualifiedAddress, PublicKeyHash};
pub use consensus::{
    ConsensusOutcome, ConsensusWarning, NotaryConfig, NotaryConfigError, NotarySet, QuorumPolicy,
    verify_notary_responses,
};
pub use contact::{Contact, ContactDraft, ContactList, Validation, merge, validate};
pub use env::Environment;
pub use error::{
    AddressError, ConsensusError, ContactError, KeyLookupError, MigrationError, PgpError,
    RecipientError, ResolveError, Severity,
};
pub use migration::{LegacyMigration, StoredContacts, classify};
pub use pgp::{Decrypted, GeneratedKeypair, PgpEngine, PublicKey};
pub use recipients::resolve_recipients;
pub use resolver::{Resolution, ResolutionPlan, ResolutionResult, ResolvedKey, ResolverConfig};
pub use send::{SendPlan, encryption_recipients, plan_send};
