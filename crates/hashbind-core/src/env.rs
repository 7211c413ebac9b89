//! Environment abstraction.
//!
//! Core logic never draws randomness itself. Anything that needs fresh bytes
//! (vault nonces, message identifiers) takes an [`Environment`], so tests can
//! substitute a deterministic source.

/// Source of randomness.
///
/// # Invariants
///
/// - Production implementations use cryptographically secure entropy
/// - `random_bytes` fills the whole buffer
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fill `buffer` with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Fresh random array.
    fn random_array<const N: usize>(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}
