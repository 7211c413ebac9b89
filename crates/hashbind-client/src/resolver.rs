//! Async key resolver driver.
//!
//! Runs a [`ResolutionPlan`] against a [`Directory`]: build the query, make
//! the one round trip, hand the reply back to the plan. All trust decisions
//! stay in `hashbind_core`; this layer adds I/O and logging.

use hashbind_core::{
    Address, ContactList, NotarySet, PgpEngine, Resolution, ResolutionPlan, ResolveError,
    ResolverConfig,
};
use hashbind_proto::DirectoryResponse;

use crate::directory::Directory;

/// Resolves addresses to verified keys through a directory.
pub struct KeyResolver<D, P> {
    directory: D,
    engine: P,
    notaries: NotarySet,
    config: ResolverConfig,
}

impl<D: Directory, P: PgpEngine> KeyResolver<D, P> {
    /// Create a resolver. The notary set is fixed for its lifetime.
    pub fn new(directory: D, engine: P, notaries: NotarySet, config: ResolverConfig) -> Self {
        Self { directory, engine, notaries, config }
    }

    /// Directory this resolver talks to.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// PGP engine used to parse received keys.
    pub fn engine(&self) -> &P {
        &self.engine
    }

    /// Configured notaries.
    pub fn notaries(&self) -> &NotarySet {
        &self.notaries
    }

    /// Resolve `addresses`, using `contacts` for hashes already known.
    ///
    /// Every requested address appears in the result. Learned bindings are
    /// returned, not persisted.
    ///
    /// # Errors
    ///
    /// - Security-critical [`ResolveError`]s when consensus fails or the
    ///   directory returns a key that does not match its authenticated hash
    /// - `Transport` / `Protocol` when the directory is unreachable or
    ///   answers off-schema
    pub async fn resolve(
        &self,
        addresses: &[Address],
        contacts: &ContactList,
    ) -> Result<Resolution, ResolveError> {
        let plan = ResolutionPlan::new(addresses, contacts, &self.notaries);

        tracing::debug!(
            requested = plan.requested().len(),
            known = plan.known_hashes().len(),
            name_only = plan.name_only().len(),
            notaries = self.notaries.len(),
            "resolving public keys"
        );

        let response = if plan.needs_directory() {
            self.directory.query(plan.query()).await.map_err(|e| {
                tracing::warn!(error = %e, "directory query failed");
                ResolveError::from(e)
            })?
        } else {
            DirectoryResponse::default()
        };

        match plan.complete(&response, &self.notaries, &self.config, &self.engine) {
            Ok(resolution) => {
                for warning in &resolution.warnings {
                    tracing::warn!(warning = %warning, "notary warning");
                }
                for (address, error) in resolution.failures() {
                    tracing::debug!(address = %address, error = %error, "no usable key");
                }
                Ok(resolution)
            },
            Err(e) => {
                log_abort(&e);
                Err(e)
            },
        }
    }
}

fn log_abort(err: &ResolveError) {
    match err {
        ResolveError::HashMismatch { address, expected, computed } => {
            tracing::error!(
                address = %address,
                expected = %expected,
                computed = %computed,
                "received key does not match authenticated hash"
            );
        },
        ResolveError::Consensus { errors } => {
            for error in errors {
                tracing::error!(error = %error, "notary consensus rejected response");
            }
        },
        e if e.is_security_critical() => {
            tracing::error!(error = %e, "resolution aborted");
        },
        e => {
            tracing::warn!(error = %e, "resolution failed");
        },
    }
}
