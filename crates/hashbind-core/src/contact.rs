//! Contact cache.
//!
//! The contact list maps addresses to verified key hashes and is the source
//! of truth for "already known" identities during resolution. All operations
//! here are pure: [`merge`] returns a new vector, [`validate`] collects every
//! violation, and [`ContactList`] can only be built from a validated set.
//!
//! # Invariants
//!
//! - Addresses are unique within a list
//! - Names are unique case-insensitively and match `[a-z0-9._%+-]`
//! - Every contact has a well-formed [`PublicKeyHash`]
//! - Named contacts sort before unnamed ones

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, PublicKeyHash},
    error::{AddressError, ContactError},
};

/// Name given to the bootstrapped self-entry.
pub const SELF_CONTACT_NAME: &str = "me";

/// Sort key prefix for unnamed contacts. Sorts after every name character.
const UNNAMED_SORT_SENTINEL: char = '~';

/// Validated contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Alias usable in place of the address when composing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical address
    pub address: Address,
    /// Verified key hash
    pub pub_hash: PublicKeyHash,
}

impl Contact {
    /// Unnamed contact for a freshly learned binding.
    pub fn new(address: Address, pub_hash: PublicKeyHash) -> Self {
        Self { name: None, address, pub_hash }
    }

    /// Set the alias.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn sort_key(&self) -> String {
        match &self.name {
            Some(name) => name.to_lowercase(),
            None => format!("{UNNAMED_SORT_SENTINEL}{}", self.address),
        }
    }
}

/// Unvalidated contact as entered by a user or read from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    /// Optional alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw address text
    pub address: String,
    /// Raw hash text. Absent in the legacy stored format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_hash: Option<String>,
}

impl ContactDraft {
    /// Draft with name, address and hash.
    pub fn new(name: Option<&str>, address: &str, pub_hash: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            address: address.to_string(),
            pub_hash: Some(pub_hash.to_string()),
        }
    }
}

impl From<&Contact> for ContactDraft {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            address: contact.address.to_string(),
            pub_hash: Some(contact.pub_hash.to_string()),
        }
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Entries that passed every per-entry check, canonicalized
    pub cleaned: Vec<Contact>,
    /// Every violation found
    pub errors: Vec<ContactError>,
}

impl Validation {
    /// Sorted list if there were no violations, otherwise all errors.
    pub fn into_list(self) -> Result<ContactList, Vec<ContactError>> {
        if self.errors.is_empty() {
            Ok(ContactList::from_validated(self.cleaned))
        } else {
            Err(self.errors)
        }
    }
}

/// Check contact invariants, collecting all violations rather than stopping
/// at the first.
pub fn validate<'a>(drafts: impl IntoIterator<Item = &'a ContactDraft>) -> Validation {
    let mut validation = Validation::default();
    let mut seen_addresses = HashSet::new();
    let mut seen_names = HashSet::new();

    for draft in drafts {
        let name = draft.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let raw_address = draft.address.trim().to_lowercase();
        let raw_hash = draft.pub_hash.as_deref().map(str::trim).unwrap_or_default();

        let mut entry_ok = true;

        if let Some(name) = name
            && !is_valid_contact_name(name)
        {
            validation.errors.push(ContactError::InvalidName(name.to_string()));
            entry_ok = false;
        }

        let address = match Address::parse(&raw_address) {
            Ok(address) => Some(address),
            Err(AddressError::Empty) => {
                validation
                    .errors
                    .push(ContactError::MissingAddress { name: name.map(str::to_string) });
                None
            },
            Err(_) => {
                validation.errors.push(ContactError::InvalidAddress(raw_address.clone()));
                None
            },
        };

        let pub_hash = match (&address, PublicKeyHash::parse(raw_hash)) {
            (Some(_), Ok(hash)) => Some(hash),
            (Some(_), Err(AddressError::EmptyHash)) => {
                validation.errors.push(ContactError::MissingHash(raw_address.clone()));
                None
            },
            (Some(_), Err(_)) => {
                validation.errors.push(ContactError::InvalidHash {
                    address: raw_address.clone(),
                    hash: raw_hash.to_lowercase(),
                });
                None
            },
            (None, _) => None,
        };

        if !seen_addresses.insert(raw_address.clone()) {
            validation.errors.push(ContactError::DuplicateAddress(raw_address.clone()));
            entry_ok = false;
        }

        if let Some(name) = name {
            let lowered = name.to_lowercase();
            if !seen_names.insert(lowered.clone()) {
                validation.errors.push(ContactError::DuplicateName(lowered));
                entry_ok = false;
            }
        }

        if let (true, Some(address), Some(pub_hash)) = (entry_ok, address, pub_hash) {
            validation.cleaned.push(Contact { name: name.map(str::to_string), address, pub_hash });
        }
    }

    validation
}

/// True if `name` can be used as a recipient alias.
pub fn is_valid_contact_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b"._%+-".contains(&b))
}

/// Merge updates into a copy of `existing`.
///
/// An update for an address already present only replaces the name, and only
/// when the update carries one. Any other update is appended. The input is
/// never mutated.
pub fn merge(existing: &[Contact], updates: &[Contact]) -> Vec<Contact> {
    let mut merged = existing.to_vec();

    for update in updates {
        let name = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

        match merged.iter_mut().find(|c| c.address == update.address) {
            Some(current) => {
                if let Some(name) = name {
                    current.name = Some(name.to_string());
                }
            },
            None => merged.push(Contact {
                name: name.map(str::to_string),
                address: update.address.clone(),
                pub_hash: update.pub_hash.clone(),
            }),
        }
    }

    merged
}

/// Validated, sorted contact list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactList {
    contacts: Vec<Contact>,
}

impl ContactList {
    /// List holding only the user's own entry.
    pub fn bootstrap(own_address: Address, own_hash: PublicKeyHash) -> Self {
        Self { contacts: vec![Contact::new(own_address, own_hash).with_name(SELF_CONTACT_NAME)] }
    }

    fn from_validated(mut contacts: Vec<Contact>) -> Self {
        contacts.sort_by_cached_key(Contact::sort_key);
        Self { contacts }
    }

    /// Contacts in display order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Iterate contacts in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    /// Number of contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True if the list has no contacts.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Known hash for `address`. Never touches the network.
    pub fn lookup_hash_locally(&self, address: &Address) -> Option<&PublicKeyHash> {
        self.contacts.iter().find(|c| &c.address == address).map(|c| &c.pub_hash)
    }

    /// Alias for `address`.
    pub fn name_for_address(&self, address: &Address) -> Option<&str> {
        self.contacts.iter().find(|c| &c.address == address).and_then(|c| c.name.as_deref())
    }

    /// Address for an alias, compared case-insensitively.
    pub fn address_for_name(&self, name: &str) -> Option<&Address> {
        let wanted = name.trim().to_lowercase();
        self.contacts
            .iter()
            .find(|c| c.name.as_deref().is_some_and(|n| n.to_lowercase() == wanted))
            .map(|c| &c.address)
    }

    /// Merge `updates` and re-validate.
    pub fn merged(&self, updates: &[Contact]) -> Result<Self, Vec<ContactError>> {
        let merged = merge(&self.contacts, updates);
        let drafts: Vec<ContactDraft> = merged.iter().map(ContactDraft::from).collect();
        validate(&drafts).into_list()
    }

    /// Encode for sealing. CBOR array of `{name?, address, pubHash}`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContactError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&self.contacts, &mut buf)
            .map_err(|e| ContactError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

impl<'a> IntoIterator for &'a ContactList {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

/// Decode an unsealed contact blob without validating it.
///
/// Entries decode permissively so the legacy hash-less format is still
/// readable; callers classify and validate the result.
pub fn decode_stored(bytes: &[u8]) -> Result<Vec<ContactDraft>, ContactError> {
    ciborium::de::from_reader(bytes).map_err(|e| ContactError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "aaaaaaaaaaaaaaaa";
    const HASH_B: &str = "bbbbbbbbbbbbbbbb";
    const HASH_C: &str = "cccccccccccccccc";

    fn contact(name: Option<&str>, address: &str, hash: &str) -> Contact {
        Contact {
            name: name.map(str::to_string),
            address: Address::parse(address).unwrap(),
            pub_hash: PublicKeyHash::parse(hash).unwrap(),
        }
    }

    #[test]
    fn duplicate_name_is_case_insensitive_but_addresses_differ() {
        let drafts = [
            ContactDraft::new(Some("Bob"), "bob@x.com", HASH_A),
            ContactDraft::new(Some("bob"), "other@x.com", HASH_B),
        ];
        let validation = validate(&drafts);

        assert!(validation.errors.contains(&ContactError::DuplicateName("bob".into())));
        assert!(
            !validation.errors.iter().any(|e| matches!(e, ContactError::DuplicateAddress(_)))
        );
    }

    #[test]
    fn validate_collects_every_violation() {
        let drafts = [
            ContactDraft::new(Some("bad name!"), "one@x.com", HASH_A),
            ContactDraft::new(Some("nobody"), "  ", HASH_B),
            ContactDraft::new(None, "not-an-address", HASH_B),
            ContactDraft { name: None, address: "nohash@x.com".into(), pub_hash: None },
            ContactDraft::new(None, "badhash@x.com", "h1"),
            ContactDraft::new(None, "ONE@x.com", HASH_C),
        ];
        let validation = validate(&drafts);

        assert_eq!(
            validation.errors,
            vec![
                ContactError::InvalidName("bad name!".into()),
                ContactError::MissingAddress { name: Some("nobody".into()) },
                ContactError::InvalidAddress("not-an-address".into()),
                ContactError::MissingHash("nohash@x.com".into()),
                ContactError::InvalidHash { address: "badhash@x.com".into(), hash: "h1".into() },
                ContactError::DuplicateAddress("one@x.com".into()),
            ]
        );
        assert!(validation.cleaned.is_empty());
    }

    #[test]
    fn validate_canonicalizes() {
        let drafts = [ContactDraft::new(Some(" Alice "), " Alice@Example.com ", " AAAAAAAAAAAAAAAA ")];
        let list = validate(&drafts).into_list().unwrap();

        assert_eq!(list.contacts(), &[contact(Some("Alice"), "alice@example.com", HASH_A)]);
    }

    #[test]
    fn named_contacts_sort_first() {
        let drafts = [
            ContactDraft::new(None, "zed@x.com", HASH_A),
            ContactDraft::new(Some("carol"), "carol@x.com", HASH_B),
            ContactDraft::new(None, "amy@x.com", HASH_C),
            ContactDraft::new(Some("alice"), "alice@x.com", "dddddddddddddddd"),
        ];
        let list = validate(&drafts).into_list().unwrap();
        let order: Vec<&str> = list.iter().map(|c| c.address.as_str()).collect();

        assert_eq!(order, ["alice@x.com", "carol@x.com", "amy@x.com", "zed@x.com"]);
    }

    #[test]
    fn names_sort_ignoring_case() {
        let drafts = [
            ContactDraft::new(Some("Zed"), "zed@x.com", HASH_A),
            ContactDraft::new(Some("alice"), "alice@x.com", HASH_B),
            ContactDraft::new(Some("Bob"), "bob@x.com", HASH_C),
        ];
        let list = validate(&drafts).into_list().unwrap();
        let order: Vec<_> = list.iter().filter_map(|c| c.name.as_deref()).collect();

        assert_eq!(order, ["alice", "Bob", "Zed"]);
    }

    #[test]
    fn merge_renames_existing_and_appends_new() {
        let existing = vec![contact(None, "bob@x.com", HASH_A)];
        let updates = [
            contact(Some("bobby"), "bob@x.com", HASH_C),
            contact(None, "carol@x.com", HASH_B),
        ];

        let merged = merge(&existing, &updates);

        assert_eq!(merged[0], contact(Some("bobby"), "bob@x.com", HASH_A));
        assert_eq!(merged[1], contact(None, "carol@x.com", HASH_B));
        assert_eq!(existing, vec![contact(None, "bob@x.com", HASH_A)]);
    }

    #[test]
    fn merge_without_name_for_existing_is_noop() {
        let existing = vec![contact(Some("bob"), "bob@x.com", HASH_A)];
        let merged = merge(&existing, &[contact(None, "bob@x.com", HASH_B)]);
        assert_eq!(merged, existing);
    }

    #[test]
    fn lookups() {
        let list = ContactList::bootstrap(
            Address::parse("me@example.com").unwrap(),
            PublicKeyHash::parse(HASH_A).unwrap(),
        )
        .merged(&[contact(Some("Carol"), "carol@x.com", HASH_B)])
        .unwrap();

        let carol = Address::parse("carol@x.com").unwrap();
        assert_eq!(list.lookup_hash_locally(&carol).map(PublicKeyHash::as_str), Some(HASH_B));
        assert_eq!(list.name_for_address(&carol), Some("Carol"));
        assert_eq!(list.address_for_name("CAROL"), Some(&carol));
        assert_eq!(list.address_for_name("me").map(Address::as_str), Some("me@example.com"));
        assert!(list.lookup_hash_locally(&Address::parse("dave@x.com").unwrap()).is_none());
    }

    #[test]
    fn stored_blob_roundtrip_through_drafts() {
        let list = validate(&[
            ContactDraft::new(Some("carol"), "carol@x.com", HASH_B),
            ContactDraft::new(None, "dave@x.com", HASH_C),
        ])
        .into_list()
        .unwrap();

        let drafts = decode_stored(&list.to_bytes().unwrap()).unwrap();
        assert_eq!(validate(&drafts).into_list().unwrap(), list);
    }

    #[test]
    fn legacy_entries_decode_without_hash() {
        #[derive(Serialize)]
        struct Legacy<'a> {
            name: &'a str,
            address: &'a str,
        }

        let mut buf = Vec::new();
        ciborium::ser::into_writer(&[Legacy { name: "Carl", address: "abcdefghij234567@host" }], &mut buf)
            .unwrap();

        let drafts = decode_stored(&buf).unwrap();
        assert_eq!(drafts[0].pub_hash, None);
        assert_eq!(drafts[0].name.as_deref(), Some("Carl"));
    }

    #[test]
    fn garbage_blob_is_decode_error() {
        assert!(matches!(decode_stored(&[0xff, 0x00, 0x13]), Err(ContactError::Decode(_))));
    }
}
