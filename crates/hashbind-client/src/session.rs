//! Account session.
//!
//! Holds everything derived at login for as long as the user stays logged
//! in: the address, the [`SessionSecrets`] and, once unlocked, the armored
//! private key. Nothing here is written to durable storage; logout drops it
//! all and the secret types zeroize themselves.
//!
//! The session is passed explicitly to whatever needs it (the vault, the
//! contact book, message sealing). There is no ambient login state.

use std::collections::BTreeMap;

use hashbind_core::{
    Address, Environment, GeneratedKeypair, PgpEngine, PublicKey, PublicKeyHash,
    encryption_recipients,
};
use hashbind_crypto::AuthToken;
use zeroize::Zeroizing;

use crate::{
    error::{SessionError, VaultError},
    secrets::{SessionConfig, SessionSecrets},
    store::{BlobKind, BlobStore},
    vault::{self, Unprotected},
};

/// Header line that carries the subject inside an encrypted body.
const SUBJECT_HEADER: &str = "Subject: ";

/// Registration bundle for a new account.
#[derive(Debug)]
pub struct NewAccount {
    /// Login credential to register
    pub auth_token: AuthToken,
    /// Public key to publish
    pub public_key_armored: String,
    /// Private key sealed under the current protection key
    pub sealed_private_key: Vec<u8>,
    /// Hash of the published key
    pub pub_hash: PublicKeyHash,
}

/// Ciphertexts for one outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Encrypted subject line
    pub cipher_subject: String,
    /// Encrypted body with the subject header embedded
    pub cipher_body: String,
}

/// Decrypted incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// Subject parsed from the body header
    pub subject: String,
    /// Body without the header
    pub body: String,
    /// True if the sender's signature verified
    pub signature_valid: bool,
}

struct LoggedIn {
    address: Address,
    secrets: SessionSecrets,
    private_key: Option<Zeroizing<String>>,
}

/// One user's session.
pub struct Session<E> {
    env: E,
    config: SessionConfig,
    state: Option<LoggedIn>,
}

impl<E: Environment> Session<E> {
    /// Create a logged-out session.
    pub fn new(env: E, config: SessionConfig) -> Self {
        Self { env, config, state: None }
    }

    /// Derive secrets for `address` and log in.
    ///
    /// The local part of the address is the derivation identity. Any
    /// previous login is dropped first. Slow; see [`SessionSecrets::derive`].
    pub fn login(
        &mut self,
        address: &Address,
        passphrase: &str,
    ) -> Result<&SessionSecrets, SessionError> {
        self.logout();

        let secrets = SessionSecrets::derive(address.local_part(), passphrase, &self.config.kdf)
            .map_err(SessionError::Kdf)?;
        tracing::debug!(address = %address, "session secrets derived");

        let state = self.state.insert(LoggedIn {
            address: address.clone(),
            secrets,
            private_key: None,
        });
        Ok(&state.secrets)
    }

    /// Generate a keypair for the logged-in address and seal its private
    /// key.
    ///
    /// The private key is sealed under the current protection key only and
    /// is cached so the session is immediately usable.
    pub fn create_account<P: PgpEngine + ?Sized>(
        &mut self,
        engine: &P,
        bits: u32,
    ) -> Result<NewAccount, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotLoggedIn)?;

        let GeneratedKeypair { public_armored, private_armored } = engine.generate_keypair(bits)?;
        let private_key = Zeroizing::new(private_armored);
        let sealed_private_key =
            vault::protect(&self.env, Some(&state.secrets), private_key.as_bytes())?;
        let pub_hash = PublicKeyHash::of_key(&public_armored);

        tracing::info!(address = %state.address, pub_hash = %pub_hash, "account keypair generated");

        state.private_key = Some(private_key);
        Ok(NewAccount {
            auth_token: state.secrets.auth_token.clone(),
            public_key_armored: public_armored,
            sealed_private_key,
            pub_hash,
        })
    }

    /// Drop all secrets and the cached private key.
    pub fn logout(&mut self) {
        if let Some(state) = self.state.take() {
            tracing::debug!(address = %state.address, "logged out");
        }
    }

    /// Logged-in address, if any.
    pub fn address(&self) -> Option<&Address> {
        self.state.as_ref().map(|s| &s.address)
    }

    /// Session secrets, if logged in.
    pub fn secrets(&self) -> Option<&SessionSecrets> {
        self.state.as_ref().map(|s| &s.secrets)
    }

    /// True once the private key has been unlocked or created.
    pub fn has_private_key(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.private_key.is_some())
    }

    /// Seal `plaintext` under the current protection key.
    pub fn protect(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        vault::protect(&self.env, self.secrets(), plaintext)
    }

    /// Open a sealed blob, with the legacy-key fallback.
    pub fn unprotect(&self, ciphertext: &[u8]) -> Result<Unprotected, VaultError> {
        vault::unprotect(self.secrets(), ciphertext)
    }

    /// Load and unseal the stored private key, caching it for the session.
    pub async fn unlock_private_key<S: BlobStore>(&mut self, store: &S) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotLoggedIn)?;
        let identity = state.address.as_str();

        let blob = store
            .get(identity, BlobKind::PrivateKey)
            .await?
            .ok_or_else(|| SessionError::NoPrivateKey { identity: identity.to_string() })?;

        let opened = vault::unprotect(Some(&state.secrets), &blob)?;
        let armored =
            std::str::from_utf8(&opened.plaintext).map_err(|_| SessionError::CorruptPrivateKey)?;

        state.private_key = Some(Zeroizing::new(armored.to_string()));
        tracing::debug!(address = %state.address, legacy = opened.used_legacy, "private key unlocked");
        Ok(())
    }

    /// Encrypt and sign a message for every recipient plus the sender.
    ///
    /// The subject is sealed on its own for listings, and again as a header
    /// inside the body.
    pub fn seal_message<P: PgpEngine + ?Sized>(
        &self,
        engine: &P,
        keys: &BTreeMap<Address, PublicKey>,
        own_key: &PublicKey,
        subject: &str,
        body: &str,
    ) -> Result<SealedMessage, SessionError> {
        let private_key = self.private_key()?;
        let recipients = encryption_recipients(keys.values(), own_key);

        let cipher_subject = engine.encrypt_and_sign(private_key, &recipients, subject)?;
        let cipher_body = engine.encrypt_and_sign(
            private_key,
            &recipients,
            &format!("{SUBJECT_HEADER}{subject}\n\n{body}"),
        )?;

        Ok(SealedMessage { cipher_subject, cipher_body })
    }

    /// Decrypt a message body and split off its subject header.
    pub fn open_message<P: PgpEngine + ?Sized>(
        &self,
        engine: &P,
        cipher_body: &str,
        sender: Option<&PublicKey>,
    ) -> Result<OpenedMessage, SessionError> {
        let decrypted = engine.decrypt_and_verify(self.private_key()?, cipher_body, sender)?;
        let (subject, body) =
            split_subject(&decrypted.plaintext).ok_or(SessionError::MissingSubject)?;

        Ok(OpenedMessage {
            subject: subject.to_string(),
            body: body.to_string(),
            signature_valid: decrypted.signature_valid,
        })
    }

    fn private_key(&self) -> Result<&str, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NotLoggedIn)?;
        state.private_key.as_deref().map(String::as_str).ok_or(SessionError::PrivateKeyLocked)
    }
}

/// Split `Subject: <line>` followed by one or more line breaks.
///
/// The header name is case-insensitive.
fn split_subject(plaintext: &str) -> Option<(&str, &str)> {
    let (header, rest) = plaintext.split_at_checked(SUBJECT_HEADER.len())?;
    if !header.eq_ignore_ascii_case(SUBJECT_HEADER) {
        return None;
    }

    let end = rest.find(['\r', '\n'])?;
    let (subject, mut body) = rest.split_at(end);

    let mut breaks = 0;
    loop {
        if let Some(next) = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')) {
            body = next;
            breaks += 1;
        } else {
            break;
        }
    }

    (breaks > 0).then_some((subject, body))
}
