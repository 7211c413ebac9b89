//! Outbound requests.
//!
//! Both requests travel as form fields whose values are comma-joined lists.

/// Form field carrying addresses that need name resolution.
const NAME_ADDRESSES_FIELD: &str = "nameAddresses";

/// Form field carrying `local#hash@domain` addresses.
const HASH_ADDRESSES_FIELD: &str = "hashAddresses";

/// Form field carrying notary identifiers.
const NOTARIES_FIELD: &str = "notaries";

/// Form field carrying public key hashes for reverse lookup.
const PUB_HASHES_FIELD: &str = "pubHashes";

/// Batched public key query.
///
/// Addresses whose hash is already known travel hash-qualified so the
/// directory can serve them without consulting notaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// Plain addresses that need notary name resolution
    pub name_addresses: Vec<String>,
    /// Hash-qualified addresses (`local#hash@domain`)
    pub hash_addresses: Vec<String>,
    /// Notary identifiers the directory should consult
    pub notaries: Vec<String>,
}

impl DirectoryQuery {
    /// True if the query asks for nothing.
    pub fn is_empty(&self) -> bool {
        self.name_addresses.is_empty() && self.hash_addresses.is_empty()
    }

    /// Encode as form fields.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            (NAME_ADDRESSES_FIELD, self.name_addresses.join(",")),
            (HASH_ADDRESSES_FIELD, self.hash_addresses.join(",")),
            (NOTARIES_FIELD, self.notaries.join(",")),
        ]
    }
}

/// Reverse lookup from public key hashes to current addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseLookupRequest {
    /// Hashes to look up
    pub pub_hashes: Vec<String>,
}

impl ReverseLookupRequest {
    /// Encode as form fields.
    pub fn form_fields(&self) -> [(&'static str, String); 1] {
        [(PUB_HASHES_FIELD, self.pub_hashes.join(","))]
    }
}
