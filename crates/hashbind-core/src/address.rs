//! Canonical addresses and public key hashes.
//!
//! Every address entering the core passes through [`Address::parse`], so the
//! rest of the crate can compare addresses with `==` and use them as map keys.

use std::{fmt, str::FromStr};

use hashbind_crypto::is_public_key_hash;
use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Separator between local part and hash in a hash-qualified address.
const HASH_SEPARATOR: char = '#';

/// Lower-cased, validated email address.
///
/// # Invariants
///
/// - Exactly one `@`
/// - Local part is non-empty and drawn from `[a-z0-9._%+-]`
/// - Domain is one or more non-empty dot-separated labels of `[a-z0-9-]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Trim, lower-case and validate.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let canonical = input.trim().to_lowercase();
        if canonical.is_empty() {
            return Err(AddressError::Empty);
        }

        let Some((local, domain)) = canonical.split_once('@') else {
            return Err(AddressError::Invalid(canonical));
        };

        if !is_valid_local(local) || !is_valid_domain(domain) {
            return Err(AddressError::Invalid(canonical));
        }

        Ok(Self(canonical))
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.split().0
    }

    /// Part after the `@`.
    pub fn domain(&self) -> &str {
        self.split().1
    }

    /// Render as `local#hash@domain` for a directory query that already knows
    /// the binding.
    pub fn with_hash(&self, hash: &PublicKeyHash) -> HashQualifiedAddress {
        HashQualifiedAddress { address: self.clone(), hash: hash.clone() }
    }

    fn split(&self) -> (&str, &str) {
        // Validated in `parse`, so the split always succeeds.
        self.0.split_once('@').unwrap_or((&self.0, ""))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

fn is_valid_local(local: &str) -> bool {
    !local.is_empty()
        && local.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"._%+-".contains(&b))
}

fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        })
}

/// 16-character content-derived key identifier over `[a-z2-7]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKeyHash(String);

impl PublicKeyHash {
    /// Trim, lower-case and validate.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let canonical = input.trim().to_lowercase();
        if canonical.is_empty() {
            return Err(AddressError::EmptyHash);
        }
        if !is_public_key_hash(&canonical) {
            return Err(AddressError::InvalidHash(canonical));
        }
        Ok(Self(canonical))
    }

    /// Hash of armored key material, as computed by the hash engine.
    pub fn of_key(public_key_armored: &str) -> Self {
        Self(hashbind_crypto::public_key_hash(public_key_armored))
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PublicKeyHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PublicKeyHash {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PublicKeyHash> for String {
    fn from(hash: PublicKeyHash) -> Self {
        hash.0
    }
}

/// Address carrying its already-known key hash: `local#hash@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashQualifiedAddress {
    /// Plain address
    pub address: Address,
    /// Hash embedded in the local part
    pub hash: PublicKeyHash,
}

impl HashQualifiedAddress {
    /// Split a `local#hash@domain` string.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let canonical = input.trim().to_lowercase();
        let Some((qualified_local, domain)) = canonical.split_once('@') else {
            return Err(AddressError::Invalid(canonical));
        };
        let Some((local, hash)) = qualified_local.split_once(HASH_SEPARATOR) else {
            return Err(AddressError::MissingHash(canonical));
        };

        let address = Address::parse(&format!("{local}@{domain}"))?;
        let hash = PublicKeyHash::parse(hash)?;
        Ok(Self { address, hash })
    }
}

impl fmt::Display for HashQualifiedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{HASH_SEPARATOR}{}@{}",
            self.address.local_part(),
            self.hash,
            self.address.domain()
        )
    }
}
