//! Directory collaborator.
//!
//! The directory aggregates every notary's reply into one response, so a
//! resolution is a single round trip. The transport itself lives outside
//! this crate; implementations decode replies with the `from_json`
//! constructors in `hashbind_proto` so schema violations surface as
//! [`DirectoryError::Protocol`].

use std::future::Future;

use hashbind_proto::{
    DirectoryQuery, DirectoryResponse, ReverseLookupRequest, ReverseLookupResponse,
};

use crate::error::DirectoryError;

/// Directory service reachable by the client.
///
/// # Implementations
///
/// - **Production**: HTTP form posts to the directory's lookup endpoints
/// - **Tests**: canned responses built from fixed notary seeds
pub trait Directory: Send + Sync {
    /// Batched forward lookup: hash-qualified and name-only addresses plus
    /// the notaries to consult.
    fn query(
        &self,
        query: &DirectoryQuery,
    ) -> impl Future<Output = Result<DirectoryResponse, DirectoryError>> + Send;

    /// Reverse lookup from legacy hashes to current addresses.
    fn reverse_lookup(
        &self,
        request: &ReverseLookupRequest,
    ) -> impl Future<Output = Result<ReverseLookupResponse, DirectoryError>> + Send;
}
