//! Contact book lifecycle against in-memory collaborators.
//!
//! INVARIANT: a failed save or migration never changes what is stored, and
//! the in-memory list is replaced before the sealed write is issued.

mod common;

use common::{FakeDirectory, Notary, SeededEnv, SingleKeyEngine, addr, fast_config, notary_set};
use hashbind_client::{
    BlobKind, BlobStore, ContactBook, ContactBookError, KeyResolver, MemoryBlobStore, Session,
    StoreError,
};
use hashbind_core::{
    Contact, ContactDraft, ContactError, MigrationError, PublicKeyHash, ResolverConfig,
};

struct Fixture {
    session: Session<SeededEnv>,
    store: MemoryBlobStore,
    directory: FakeDirectory,
    resolver: KeyResolver<FakeDirectory, SingleKeyEngine>,
    own_hash: PublicKeyHash,
}

fn fixture() -> Fixture {
    let notary = Notary::new("notary.example.com", 1);
    let directory = FakeDirectory::new(&[&notary]);
    let resolver = KeyResolver::new(
        directory.clone(),
        SingleKeyEngine,
        notary_set(&[&notary]),
        ResolverConfig::default(),
    );

    let mut session = Session::new(SeededEnv::default(), fast_config());
    session.login(&addr("me@example.com"), "pw").unwrap();

    Fixture {
        session,
        store: MemoryBlobStore::new(),
        directory,
        resolver,
        own_hash: PublicKeyHash::of_key("me-key"),
    }
}

async fn load(f: &Fixture) -> Result<ContactBook<MemoryBlobStore>, ContactBookError> {
    ContactBook::load(f.store.clone(), &f.session, &f.own_hash, &f.resolver).await
}

/// Store drafts as-is, bypassing validation, the way an old client wrote them.
async fn seal_drafts(f: &Fixture, drafts: &[ContactDraft]) {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(drafts, &mut bytes).unwrap();
    let sealed = f.session.protect(&bytes).unwrap();
    f.store.put("me@example.com", BlobKind::Contacts, &sealed).await.unwrap();
}

#[tokio::test]
async fn first_load_bootstraps_me() {
    let f = fixture();
    let book = load(&f).await.unwrap();

    let contacts = book.contacts().await;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts.contacts()[0].name.as_deref(), Some("me"));
    assert_eq!(contacts.lookup_hash_locally(&addr("me@example.com")), Some(&f.own_hash));
    assert!(f.store.is_empty(), "bootstrap is not persisted until the first save");
}

#[tokio::test]
async fn saved_contacts_reload() {
    let f = fixture();
    let book = load(&f).await.unwrap();

    let bob = Contact::new(addr("bob@example.com"), PublicKeyHash::of_key("bob-key")).with_name("bob");
    book.add(&f.session, &[bob]).await.unwrap();

    let reloaded = load(&f).await.unwrap().contacts().await;
    assert_eq!(reloaded, book.contacts().await);
    assert_eq!(reloaded.address_for_name("BOB"), Some(&addr("bob@example.com")));
}

#[tokio::test]
async fn invalid_save_writes_nothing() {
    let f = fixture();
    let book = load(&f).await.unwrap();
    let before = book.contacts().await;

    let drafts = [
        ContactDraft::new(Some("Bob"), "bob@x.com", "aaaaaaaaaaaaaaaa"),
        ContactDraft::new(Some("bob"), "other@x.com", "bbbbbbbbbbbbbbbb"),
    ];
    let err = book.save(&f.session, &drafts).await.unwrap_err();

    assert_eq!(err, ContactBookError::Invalid(vec![ContactError::DuplicateName("bob".into())]));
    assert!(f.store.is_empty());
    assert_eq!(book.contacts().await, before);
}

#[tokio::test]
async fn logged_out_session_cannot_save() {
    let mut f = fixture();
    let book = load(&f).await.unwrap();
    f.session.logout();

    let err = book
        .save(&f.session, &[ContactDraft::new(None, "bob@x.com", "aaaaaaaaaaaaaaaa")])
        .await
        .unwrap_err();
    assert!(matches!(err, ContactBookError::Vault(_)));
    assert!(f.store.is_empty());
    assert_eq!(book.contacts().await.len(), 1);
}

#[tokio::test]
async fn wrong_passphrase_is_reported() {
    let mut f = fixture();
    let book = load(&f).await.unwrap();
    book.save(&f.session, &[ContactDraft::new(Some("me"), "me@example.com", f.own_hash.as_str())])
        .await
        .unwrap();

    f.session.login(&addr("me@example.com"), "not pw").unwrap();
    let err = load(&f).await.err().unwrap();
    insta::assert_snapshot!(err, @"wrong passphrase or corrupted data");
}

#[tokio::test]
async fn legacy_list_is_migrated_and_saved() {
    let f = fixture();
    let carl_hash = PublicKeyHash::of_key("carl-key");
    f.directory.publish("carl@host", "carl-key");

    seal_drafts(&f, &[ContactDraft {
        name: Some("Carl".into()),
        address: format!("{carl_hash}@host"),
        pub_hash: None,
    }])
    .await;

    let contacts = load(&f).await.unwrap().contacts().await;
    let carl = &contacts.contacts()[0];
    assert_eq!(carl.name.as_deref(), Some("Carl"));
    assert_eq!(carl.address, addr("carl@host"));
    assert_eq!(carl.pub_hash, carl_hash);

    // Stored copy is now in the current format.
    let reloaded = load(&f).await.unwrap().contacts().await;
    assert_eq!(reloaded, contacts);
}

#[tokio::test]
async fn failed_migration_leaves_store_untouched() {
    let f = fixture();
    let carl_hash = PublicKeyHash::of_key("carl-key");
    f.directory.publish("carl@host", "carl-key");
    let unknown = "tsxcknyhubuc3l6l";

    seal_drafts(&f, &[
        ContactDraft { name: Some("Carl".into()), address: format!("{carl_hash}@host"), pub_hash: None },
        ContactDraft { name: Some("Dora".into()), address: format!("{unknown}@host"), pub_hash: None },
    ])
    .await;
    let sealed_before = f.store.get("me@example.com", BlobKind::Contacts).await.unwrap();

    let err = load(&f).await.err().unwrap();
    assert_eq!(
        err,
        ContactBookError::Migration(MigrationError::Incomplete { hashes: vec![unknown.into()] })
    );
    assert_eq!(f.store.get("me@example.com", BlobKind::Contacts).await.unwrap(), sealed_before);
}

#[tokio::test]
async fn failed_write_still_updates_memory() {
    #[derive(Clone)]
    struct ReadOnlyStore;

    impl BlobStore for ReadOnlyStore {
        async fn get(&self, _: &str, _: BlobKind) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }

        async fn put(&self, _: &str, _: BlobKind, _: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Io("read-only".into()))
        }
    }

    let f = fixture();
    let book = ContactBook::load(ReadOnlyStore, &f.session, &f.own_hash, &f.resolver).await.unwrap();
    let bob = Contact::new(addr("bob@example.com"), PublicKeyHash::of_key("bob-key"));

    let err = book.add(&f.session, &[bob]).await.unwrap_err();

    assert_eq!(err, ContactBookError::Store(StoreError::Io("read-only".into())));
    assert_eq!(book.contacts().await.len(), 2);
}
