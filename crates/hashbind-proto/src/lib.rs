//! Hashbind directory wire schema.
//!
//! The directory service fronts both public key storage and the notary
//! network. A client sends one batched query and receives one JSON reply
//! containing every notary's attestations plus the raw key material.
//!
//! Nothing in this crate is trusted: it only checks that replies have the
//! expected shape. Signature checks and hash comparisons happen in
//! `hashbind-core`.
//!
//! # Messages
//!
//! - [`DirectoryQuery`] → [`DirectoryResponse`]: forward resolution
//! - [`ReverseLookupRequest`] → [`ReverseLookupResponse`]: hash → address,
//!   used only when migrating legacy contact lists
//!
//! # Invariants
//!
//! - A reply that is missing required fields, or whose public key entry
//!   carries both or neither of `pubKey`/`error`, is rejected with
//!   [`ProtocolError`] rather than partially accepted.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod query;
mod response;

pub use errors::ProtocolError;
pub use query::{DirectoryQuery, ReverseLookupRequest};
pub use response::{
    Attestation, DirectoryResponse, NotaryResponse, PublicKeyEntry, ReverseLookupResponse,
};
