//! Hashbind operator tool.
//!
//! # Usage
//!
//! ```bash
//! # Hash an armored public key
//! hashbind pubhash alice.asc
//!
//! # Derive login tokens (passphrase on stdin)
//! echo "$PASS" | hashbind derive --identity alice@example.com
//!
//! # Check a captured directory reply against the notary set
//! hashbind verify --notaries notaries.json --response reply.json
//!
//! # Inspect or import the sealed contact list in a local vault
//! echo "$PASS" | hashbind contacts --db vault.redb --identity alice@example.com show
//! ```

mod armor;
mod commands;
mod error;

use std::{
    io::{BufRead, Read, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use hashbind_client::{RedbBlobStore, Session, SessionConfig, SystemEnv};
use hashbind_core::{Address, PublicKeyHash};
use hashbind_crypto::KdfParams;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

/// Hashbind key resolution tool
#[derive(Parser, Debug)]
#[command(name = "hashbind")]
#[command(about = "Inspect hashbind keys, tokens, directory replies and contact vaults")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// log2 of the scrypt cost
    #[arg(long, default_value_t = KdfParams::default().log_n, global = true)]
    kdf_log_n: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the public key hash of an armored key (stdin if no file)
    Pubhash {
        /// Armored public key file
        path: Option<PathBuf>,
    },

    /// Derive the current and legacy auth tokens; reads the passphrase from
    /// stdin
    Derive {
        /// Account address
        #[arg(long)]
        identity: String,
    },

    /// Verify a captured directory response against a notary config
    Verify {
        /// Notary config JSON
        #[arg(long)]
        notaries: PathBuf,

        /// Captured directory response JSON
        #[arg(long)]
        response: PathBuf,

        /// Addresses that were queried (default: every address with key
        /// material)
        #[arg(long, value_delimiter = ',')]
        addresses: Vec<String>,

        /// Override the config's quorum
        #[arg(long)]
        quorum: Option<usize>,
    },

    /// Inspect or import the sealed contact list; reads the passphrase from
    /// stdin
    Contacts {
        /// Local vault database
        #[arg(long)]
        db: PathBuf,

        /// Account address
        #[arg(long)]
        identity: String,

        #[command(subcommand)]
        action: ContactsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ContactsAction {
    /// Print the stored contacts
    Show,

    /// Merge contacts from a JSON array of `{name?, address, pubHash}`
    Import {
        /// Contacts JSON file
        path: PathBuf,

        /// Hash of the account's own key, for the `me` entry
        #[arg(long)]
        pub_hash: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = SessionConfig { kdf: KdfParams { log_n: args.kdf_log_n, ..KdfParams::default() } };
    let mut out = std::io::stdout().lock();

    run(args.command, &config, &mut out).await?;
    out.flush()?;
    Ok(())
}

async fn run(
    command: Command,
    config: &SessionConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Pubhash { path } => {
            let armored = match path {
                Some(path) => read_file(&path)?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                },
            };
            commands::pubhash(&armored, out)
        },
        Command::Derive { identity } => {
            let identity = Address::parse(&identity)?;
            let passphrase = read_passphrase(std::io::stdin().lock())?;
            commands::derive(&identity, &passphrase, config, out)
        },
        Command::Verify { notaries, response, addresses, quorum } => {
            let addresses =
                addresses.iter().map(|a| Address::parse(a)).collect::<Result<Vec<_>, _>>()?;
            commands::verify(
                read_file(&notaries)?.as_bytes(),
                read_file(&response)?.as_bytes(),
                &addresses,
                quorum,
                out,
            )
        },
        Command::Contacts { db, identity, action } => {
            let identity = Address::parse(&identity)?;
            let passphrase = read_passphrase(std::io::stdin().lock())?;
            let store = RedbBlobStore::open(&db)?;

            let mut session = Session::new(SystemEnv::new(), *config);
            session.login(&identity, &passphrase)?;
            tracing::info!(identity = %identity, db = %db.display(), "vault opened");

            match action {
                ContactsAction::Show => commands::contacts_show(&store, &session, out).await,
                ContactsAction::Import { path, pub_hash } => {
                    let own_hash = PublicKeyHash::parse(&pub_hash)?;
                    let contacts = read_file(&path)?;
                    commands::contacts_import(store, &session, &own_hash, contacts.as_bytes(), out)
                        .await
                },
            }
        },
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

/// First line of `input`, without the line ending.
fn read_passphrase(mut input: impl BufRead) -> Result<String, CliError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::NoPassphrase);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
