//! Subcommand implementations.
//!
//! Each command writes its report to `out` so it can be tested without a
//! process.

use std::io::Write;

use hashbind_client::{
    BlobKind, BlobStore, ContactBook, Directory, DirectoryError, KeyResolver, Session,
    SessionConfig, SessionError, SessionSecrets,
};
use hashbind_core::{
    Address, ContactDraft, ContactList, Environment, NotaryConfig, NotarySet, PublicKeyHash,
    QuorumPolicy, ResolutionPlan, ResolverConfig, StoredContacts, classify, contact::decode_stored,
    validate,
};
use hashbind_proto::{DirectoryQuery, DirectoryResponse, ReverseLookupRequest, ReverseLookupResponse};

use crate::{armor::ArmorEngine, error::CliError};

/// The CLI has no directory connection. Anything needing one fails
/// recoverably.
struct OfflineDirectory;

impl Directory for OfflineDirectory {
    async fn query(&self, _: &DirectoryQuery) -> Result<DirectoryResponse, DirectoryError> {
        Err(DirectoryError::Transport("offline".into()))
    }

    async fn reverse_lookup(
        &self,
        _: &ReverseLookupRequest,
    ) -> Result<ReverseLookupResponse, DirectoryError> {
        Err(DirectoryError::Transport("offline".into()))
    }
}

/// Print the hash of an armored public key.
pub fn pubhash(armored: &str, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", PublicKeyHash::of_key(armored))?;
    Ok(())
}

/// Print both auth tokens for `identity`.
pub fn derive(
    identity: &Address,
    passphrase: &str,
    config: &SessionConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let secrets = SessionSecrets::derive(identity.local_part(), passphrase, &config.kdf)?;
    writeln!(out, "auth token:        {}", secrets.auth_token.as_str())?;
    writeln!(out, "legacy auth token: {}", secrets.legacy_auth_token.as_str())?;
    Ok(())
}

/// Check a captured directory response against a notary config.
///
/// Every address is treated as name-only, so each needs notary consensus.
/// With no `addresses`, every address that has key material is checked.
pub fn verify(
    notaries: &[u8],
    response: &[u8],
    addresses: &[Address],
    quorum: Option<usize>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let config = NotaryConfig::from_json(notaries)?;
    let notary_set = config.notary_set()?;
    let quorum = match quorum {
        Some(n) => QuorumPolicy::AtLeast(n),
        None => config.quorum_policy()?,
    };
    let resolver_config = ResolverConfig { quorum };
    let response = DirectoryResponse::from_json(response)?;

    let addresses = if addresses.is_empty() {
        response.public_keys.keys().map(|a| Address::parse(a)).collect::<Result<Vec<_>, _>>()?
    } else {
        addresses.to_vec()
    };

    let plan = ResolutionPlan::new(&addresses, &ContactList::default(), &notary_set);
    let resolution = plan
        .complete(&response, &notary_set, &resolver_config, &ArmorEngine)
        .inspect_err(|e| tracing::error!(error = %e, "captured response rejected"))?;

    for warning in &resolution.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    for (address, result) in &resolution.keys {
        match result {
            Ok(key) => writeln!(out, "{address}\t{}\tok", key.pub_hash)?,
            Err(e) => writeln!(out, "{address}\t-\t{e}")?,
        }
    }

    let failed = resolution.failures().count();
    if failed > 0 {
        return Err(CliError::Unverified { failed, total: resolution.keys.len() });
    }
    Ok(())
}

/// Print the sealed contact list without modifying it.
pub async fn contacts_show<S: BlobStore, E: Environment>(
    store: &S,
    session: &Session<E>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let identity = session.address().ok_or(SessionError::NotLoggedIn)?.as_str();
    let Some(blob) = store.get(identity, BlobKind::Contacts).await? else {
        writeln!(out, "no contacts stored for {identity}")?;
        return Ok(());
    };

    let opened = session.unprotect(&blob)?;
    if opened.used_legacy {
        writeln!(out, "note: contact list is sealed under the legacy key")?;
    }

    match classify(decode_stored(&opened.plaintext)?)? {
        StoredContacts::Current(drafts) => {
            let list = validate(&drafts).into_list().map_err(CliError::InvalidContacts)?;
            for contact in &list {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    contact.name.as_deref().unwrap_or("-"),
                    contact.address,
                    contact.pub_hash
                )?;
            }
        },
        StoredContacts::Legacy(migration) => {
            writeln!(
                out,
                "legacy contact list with {} entries; log in with a connected client to migrate",
                migration.len()
            )?;
        },
    }
    Ok(())
}

/// Merge contacts from a JSON file into the sealed contact list.
///
/// `own_hash` seeds the `me` entry when nothing is stored yet.
pub async fn contacts_import<S: BlobStore, E: Environment>(
    store: S,
    session: &Session<E>,
    own_hash: &PublicKeyHash,
    contacts_json: &[u8],
    out: &mut impl Write,
) -> Result<(), CliError> {
    let drafts: Vec<ContactDraft> =
        serde_json::from_slice(contacts_json).map_err(|e| CliError::ContactsFile(e.to_string()))?;
    let imported = validate(&drafts).into_list().map_err(CliError::InvalidContacts)?;

    let resolver = KeyResolver::new(
        OfflineDirectory,
        ArmorEngine,
        NotarySet::new(std::iter::empty()),
        ResolverConfig::default(),
    );
    let book = ContactBook::load(store, session, own_hash, &resolver).await?;
    book.add(session, imported.contacts()).await?;

    let contacts = book.contacts().await;
    writeln!(out, "imported {} contact(s); {} stored", imported.len(), contacts.len())?;
    Ok(())
}
