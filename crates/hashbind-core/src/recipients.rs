//! Recipient alias resolution for composing.

use crate::{
    address::Address,
    contact::{ContactList, is_valid_contact_name},
    error::RecipientError,
};

/// Resolve a comma-separated recipient field to addresses.
///
/// Entries that are not addresses but look like contact names are replaced by
/// the matching contact's address. All failures are collected. Blank entries
/// are skipped, and a field with none left is an error.
pub fn resolve_recipients(
    input: &str,
    contacts: &ContactList,
) -> Result<Vec<Address>, Vec<RecipientError>> {
    let mut addresses = Vec::new();
    let mut errors = Vec::new();

    for entry in input.split(',').map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()) {
        if let Ok(address) = Address::parse(&entry) {
            addresses.push(address);
        } else if !is_valid_contact_name(&entry) {
            errors.push(RecipientError::InvalidAddress(entry));
        } else if let Some(address) = contacts.address_for_name(&entry) {
            addresses.push(address.clone());
        } else {
            errors.push(RecipientError::UnknownName(entry));
        }
    }

    if addresses.is_empty() && errors.is_empty() {
        errors.push(RecipientError::NoRecipients);
    }

    if errors.is_empty() { Ok(addresses) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{ContactDraft, validate};

    fn contacts() -> ContactList {
        validate(&[
            ContactDraft::new(Some("Bob"), "bob@example.com", "bbbbbbbbbbbbbbbb"),
            ContactDraft::new(Some("me"), "me@example.com", "aaaaaaaaaaaaaaaa"),
        ])
        .into_list()
        .unwrap()
    }

    #[test]
    fn mixes_names_and_addresses() {
        let resolved = resolve_recipients(" BOB , carol@Example.com,me", &contacts()).unwrap();
        let resolved: Vec<&str> = resolved.iter().map(Address::as_str).collect();

        assert_eq!(resolved, ["bob@example.com", "carol@example.com", "me@example.com"]);
    }

    #[test]
    fn collects_every_failure() {
        let errors = resolve_recipients("dave, not an address!, bob", &contacts()).unwrap_err();

        assert_eq!(
            errors,
            vec![
                RecipientError::UnknownName("dave".into()),
                RecipientError::InvalidAddress("not an address!".into()),
            ]
        );
    }

    #[test]
    fn blank_field_is_error() {
        assert_eq!(resolve_recipients(" , ", &contacts()), Err(vec![RecipientError::NoRecipients]));
    }
}
