//! Production Environment implementation.
//!
//! `SystemEnv` draws vault nonces from the OS cryptographic RNG. Output is
//! not reproducible; tests substitute a seeded environment instead.

use hashbind_core::Environment;

/// Production environment backed by getrandom.
///
/// # Panics
///
/// Panics if the OS RNG fails. A client without working randomness would
/// reuse vault nonces, so there is nothing safe to continue with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - vault nonces would repeat");
    }
}
