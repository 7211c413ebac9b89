//! Outgoing message planning.
//!
//! Decides whether a message can go out encrypted. A recipient without a key
//! is not fatal, but sending in the clear needs the user's explicit consent.

use std::collections::BTreeMap;

use crate::{address::Address, pgp::PublicKey, resolver::Resolution};

/// How a message to a set of recipients can be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendPlan {
    /// Every recipient resolved
    Encrypted {
        /// Key per recipient
        keys: BTreeMap<Address, PublicKey>,
    },
    /// Some recipients have no usable key
    NeedsPlaintextConsent {
        /// Recipients without a key, in recipient order
        missing: Vec<Address>,
    },
}

/// Classify `recipients` against a completed resolution.
pub fn plan_send(recipients: &[Address], resolution: &Resolution) -> SendPlan {
    let mut keys = BTreeMap::new();
    let mut missing = Vec::new();

    for recipient in recipients {
        match resolution.key(recipient) {
            Some(resolved) => {
                keys.insert(recipient.clone(), resolved.key.clone());
            },
            None => missing.push(recipient.clone()),
        }
    }

    if missing.is_empty() {
        SendPlan::Encrypted { keys }
    } else {
        SendPlan::NeedsPlaintextConsent { missing }
    }
}

/// Recipient keys plus the sender's own, de-duplicated by key id.
///
/// The sender's key is included so the sent copy stays readable.
pub fn encryption_recipients<'a>(
    keys: impl IntoIterator<Item = &'a PublicKey>,
    own_key: &'a PublicKey,
) -> Vec<PublicKey> {
    let mut recipients: Vec<PublicKey> = Vec::new();
    for key in keys.into_iter().chain(std::iter::once(own_key)) {
        if !recipients.iter().any(|k| k.key_id == key.key_id) {
            recipients.push(key.clone());
        }
    }
    recipients
}
