//! Third-party verification of revealed seeds
//!
//! Anyone holding a revealed server seed can recompute a bet's digest and
//! compare it with what was published. A mismatch is a fairness failure and
//! is reported as a [`FairnessCheck`] value, never as a [`GeneratorError`].

use serde::{Deserialize, Serialize};

use super::stream::{digest_block, server_seed_hash, to_hex, GeneratorError};

/// Outcome of a fairness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FairnessCheck {
    /// Recomputed value matches the published one
    Verified,

    /// Recomputed value differs from the published one
    Mismatch { expected: String, computed: String },
}

impl FairnessCheck {
    /// Compare a published hex value with a recomputed one, ignoring case
    /// and surrounding whitespace in the published value
    pub fn compare(expected: &str, computed: String) -> Self {
        if expected.trim().eq_ignore_ascii_case(&computed) {
            FairnessCheck::Verified
        } else {
            FairnessCheck::Mismatch {
                expected: expected.trim().to_string(),
                computed,
            }
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, FairnessCheck::Verified)
    }
}

/// Recompute the hex digest of block `cursor`
///
/// # Example
/// ```
/// use fairness_core_rs::rng::verify;
///
/// let digest = verify("server-secret", "lucky", 0, 0).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn verify(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
) -> Result<String, GeneratorError> {
    Ok(to_hex(&digest_block(server_seed, client_seed, nonce, cursor)?))
}

/// Recompute block `cursor` and compare against a published digest
pub fn verify_digest(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
    expected: &str,
) -> Result<FairnessCheck, GeneratorError> {
    let computed = verify(server_seed, client_seed, nonce, cursor)?;
    Ok(FairnessCheck::compare(expected, computed))
}

/// Check a revealed server seed against the hash committed before play
pub fn verify_commitment(server_seed: &str, committed_hash: &str) -> FairnessCheck {
    FairnessCheck::compare(committed_hash, server_seed_hash(server_seed))
}
