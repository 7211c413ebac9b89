//! Legacy contact list migration.
//!
//! Early contact lists stored no hash: the address itself was
//! `<hash>@<host>`. Upgrading one takes two directory round trips, driven by
//! the caller:
//!
//! 1. [`LegacyMigration::reverse_lookup`] asks which address each hash now
//!    belongs to.
//! 2. [`LegacyMigration::addresses_to_resolve`] yields those addresses for a
//!    normal forward resolution.
//! 3. [`LegacyMigration::complete`] checks every hash resolved both ways and
//!    produces the upgraded list.
//!
//! Migration is all-or-nothing. A single entry that fails either direction
//! aborts it and the stored list is left untouched.

use hashbind_crypto::legacy_public_key_digest;
use hashbind_proto::{ReverseLookupRequest, ReverseLookupResponse};

use crate::{
    address::Address,
    contact::{ContactDraft, ContactList, validate},
    error::MigrationError,
    resolver::Resolution,
};

/// Local-part length of a current-format legacy hash.
const LEGACY_SHORT_HASH_LEN: usize = 16;

/// Local-part length of the oldest, full-digest legacy hash.
const LEGACY_LONG_HASH_LEN: usize = 40;

/// Stored contacts after format detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredContacts {
    /// Every entry carries a hash
    Current(Vec<ContactDraft>),
    /// Every entry is in the hash-less legacy format
    Legacy(LegacyMigration),
}

/// Detect the stored format.
///
/// A list mixing both formats, or a legacy entry whose local part is not a
/// hash, is rejected.
pub fn classify(drafts: Vec<ContactDraft>) -> Result<StoredContacts, MigrationError> {
    let has_hash = |d: &ContactDraft| d.pub_hash.as_deref().is_some_and(|h| !h.trim().is_empty());

    if drafts.iter().all(has_hash) {
        return Ok(StoredContacts::Current(drafts));
    }
    if drafts.iter().any(has_hash) {
        return Err(MigrationError::MixedFormats);
    }

    let mut entries = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let address = draft.address.trim().to_lowercase();
        let legacy_hash = address.split('@').next().unwrap_or_default().to_string();
        if legacy_hash.len() != LEGACY_SHORT_HASH_LEN && legacy_hash.len() != LEGACY_LONG_HASH_LEN {
            return Err(MigrationError::NotHashAddress(address));
        }
        entries.push(LegacyEntry { legacy_hash, name: draft.name });
    }

    Ok(StoredContacts::Legacy(LegacyMigration { entries }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LegacyEntry {
    legacy_hash: String,
    name: Option<String>,
}

/// Legacy list awaiting upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyMigration {
    entries: Vec<LegacyEntry>,
}

impl LegacyMigration {
    /// Number of legacy entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there is nothing to migrate.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Request mapping every legacy hash to its current address.
    pub fn reverse_lookup(&self) -> ReverseLookupRequest {
        ReverseLookupRequest {
            pub_hashes: self.entries.iter().map(|e| e.legacy_hash.clone()).collect(),
        }
    }

    /// Addresses to forward-resolve, one per hash the directory knew.
    ///
    /// Hashes the directory did not return are left for [`Self::complete`] to
    /// report, so the user sees every failure at once.
    pub fn addresses_to_resolve(&self, reverse: &ReverseLookupResponse) -> Vec<Address> {
        self.entries
            .iter()
            .filter_map(|e| reverse.address_for(&e.legacy_hash))
            .filter_map(|a| Address::parse(a).ok())
            .collect()
    }

    /// Build the upgraded list.
    ///
    /// A short legacy hash must come back unchanged from forward resolution.
    /// A long one predates the current hash scheme and must equal the full
    /// SHA-1 of the forward-resolved key; the contact then takes that key's
    /// current hash.
    pub fn complete(
        self,
        reverse: &ReverseLookupResponse,
        forward: &Resolution,
    ) -> Result<ContactList, MigrationError> {
        let mut drafts = Vec::with_capacity(self.entries.len());
        let mut failed = Vec::new();

        for entry in self.entries {
            let resolved = reverse
                .address_for(&entry.legacy_hash)
                .and_then(|a| Address::parse(a).ok())
                .and_then(|address| forward.key(&address).map(|key| (address, key)));

            let Some((address, key)) = resolved else {
                failed.push(entry.legacy_hash);
                continue;
            };

            let round_trips = if entry.legacy_hash.len() == LEGACY_LONG_HASH_LEN {
                legacy_public_key_digest(&key.armored) == entry.legacy_hash
            } else {
                key.pub_hash.as_str() == entry.legacy_hash
            };
            if !round_trips {
                failed.push(entry.legacy_hash);
                continue;
            }

            drafts.push(ContactDraft {
                name: entry.name,
                address: address.to_string(),
                pub_hash: Some(key.pub_hash.to_string()),
            });
        }

        if !failed.is_empty() {
            return Err(MigrationError::Incomplete { hashes: failed });
        }

        validate(&drafts).into_list().map_err(MigrationError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{address::PublicKeyHash, pgp::PublicKey, resolver::ResolvedKey};

    // Stands in for `abcdef0123456789`, which is outside the base-32 alphabet
    // and so not a parseable hash.
    const CARL_HASH: &str = "abcdefghij234567";

    fn legacy(name: Option<&str>, address: &str) -> ContactDraft {
        ContactDraft { name: name.map(str::to_string), address: address.into(), pub_hash: None }
    }

    fn forward(address: &str, hash: &str) -> Resolution {
        forward_key(address, PublicKeyHash::parse(hash).unwrap(), "carl-key")
    }

    fn forward_key(address: &str, pub_hash: PublicKeyHash, armored: &str) -> Resolution {
        let key = ResolvedKey {
            pub_hash,
            armored: armored.into(),
            key: PublicKey { key_id: armored.into(), armored: armored.into() },
        };
        Resolution {
            keys: BTreeMap::from([(Address::parse(address).unwrap(), Ok(key))]),
            ..Resolution::default()
        }
    }

    fn reverse(pairs: &[(&str, &str)]) -> ReverseLookupResponse {
        ReverseLookupResponse(pairs.iter().map(|(h, a)| ((*h).to_string(), (*a).to_string())).collect())
    }

    fn into_legacy(stored: StoredContacts) -> LegacyMigration {
        match stored {
            StoredContacts::Legacy(migration) => migration,
            StoredContacts::Current(_) => panic!("expected legacy format"),
        }
    }

    #[test]
    fn migrates_hash_address_to_current_address() {
        let migration =
            into_legacy(classify(vec![legacy(Some("Carl"), &format!("{CARL_HASH}@host"))]).unwrap());
        assert_eq!(migration.reverse_lookup().pub_hashes, [CARL_HASH]);

        let reverse = reverse(&[(CARL_HASH, "carl@host")]);
        assert_eq!(migration.addresses_to_resolve(&reverse), [Address::parse("carl@host").unwrap()]);

        let list = migration.complete(&reverse, &forward("carl@host", CARL_HASH)).unwrap();
        let carl = &list.contacts()[0];
        assert_eq!(carl.name.as_deref(), Some("Carl"));
        assert_eq!(carl.address.as_str(), "carl@host");
        assert_eq!(carl.pub_hash.as_str(), CARL_HASH);
    }

    #[test]
    fn current_format_passes_through() {
        let drafts = vec![ContactDraft::new(None, "carl@host", CARL_HASH)];
        assert_eq!(classify(drafts.clone()), Ok(StoredContacts::Current(drafts)));
    }

    #[test]
    fn mixed_formats_are_rejected() {
        let drafts = vec![
            ContactDraft::new(None, "carl@host", CARL_HASH),
            legacy(None, &format!("{CARL_HASH}@host")),
        ];
        assert_eq!(classify(drafts), Err(MigrationError::MixedFormats));
    }

    #[test]
    fn non_hash_local_part_is_rejected() {
        assert_eq!(
            classify(vec![legacy(None, "carl@host")]),
            Err(MigrationError::NotHashAddress("carl@host".into()))
        );
    }

    #[test]
    fn changed_hash_aborts() {
        let migration =
            into_legacy(classify(vec![legacy(Some("Carl"), &format!("{CARL_HASH}@host"))]).unwrap());
        let reverse = reverse(&[(CARL_HASH, "carl@host")]);

        let err = migration.complete(&reverse, &forward("carl@host", "zzzzzzzzzzzzzzzz")).unwrap_err();
        assert_eq!(err, MigrationError::Incomplete { hashes: vec![CARL_HASH.into()] });
    }

    #[test]
    fn any_unresolved_entry_aborts_all() {
        let other = "tsxcknyhubuc3l6l";
        let migration = into_legacy(
            classify(vec![
                legacy(Some("Carl"), &format!("{CARL_HASH}@host")),
                legacy(Some("Dora"), &format!("{other}@host")),
            ])
            .unwrap(),
        );
        let reverse = reverse(&[(CARL_HASH, "carl@host")]);

        let err = migration.complete(&reverse, &forward("carl@host", CARL_HASH)).unwrap_err();
        assert_eq!(err, MigrationError::Incomplete { hashes: vec![other.into()] });
    }

    #[test]
    fn long_legacy_hash_matching_key_migrates() {
        let long = legacy_public_key_digest("carl-key");
        let migration =
            into_legacy(classify(vec![legacy(Some("Carl"), &format!("{long}@host"))]).unwrap());
        let reverse = reverse(&[(long.as_str(), "carl@host")]);
        let forward = forward_key("carl@host", PublicKeyHash::of_key("carl-key"), "carl-key");

        let list = migration.complete(&reverse, &forward).unwrap();
        let carl = &list.contacts()[0];
        assert_eq!(carl.address.as_str(), "carl@host");
        assert_eq!(carl.pub_hash, PublicKeyHash::of_key("carl-key"));
    }

    #[test]
    fn long_legacy_hash_redirected_to_other_key_aborts() {
        let long = legacy_public_key_digest("carl-key");
        let migration =
            into_legacy(classify(vec![legacy(Some("Carl"), &format!("{long}@host"))]).unwrap());
        let reverse = reverse(&[(long.as_str(), "mallory@evil")]);
        let forward =
            forward_key("mallory@evil", PublicKeyHash::of_key("mallory-key"), "mallory-key");

        let err = migration.complete(&reverse, &forward).unwrap_err();
        assert_eq!(err, MigrationError::Incomplete { hashes: vec![long] });
    }
}
