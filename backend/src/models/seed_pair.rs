//! Seed pair model
//!
//! A seed pair is the unit of fairness commitment: the server seed is fixed
//! and its SHA-256 published before the first bet, then revealed when the
//! pair is rotated out.
//!
//! # Critical Invariants
//!
//! - `server_seed` never changes
//! - `server_seed_hash == SHA-256(server_seed)`
//! - `nonce` only moves forward, one step per bet
//! - revealed ⇔ inactive, and `revealed_at` is set exactly when revealed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rng::{server_seed_hash, verify_commitment, FairnessCheck, SeedTuple};
use crate::store::{SeedPairPatch, StoreError};

/// Server/client seed commitment owned by one player
///
/// # Example
/// ```
/// use chrono::Utc;
/// use fairness_core_rs::SeedPair;
///
/// let pair = SeedPair::new("player-1", "a".repeat(64), "lucky".to_string(), Utc::now());
/// assert!(pair.is_active());
/// assert_eq!(pair.nonce(), 0);
/// assert!(pair.view().server_seed.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPair {
    /// Unique seed pair identifier (UUID)
    id: String,

    /// Player owning this pair
    owner_id: String,

    /// Secret HMAC key; never exposed while active
    server_seed: String,

    /// SHA-256 of `server_seed`, published at creation
    server_seed_hash: String,

    /// Player-visible seed
    client_seed: String,

    /// Next nonce to resolve a bet with
    nonce: u64,

    is_active: bool,

    revealed: bool,

    revealed_at: Option<DateTime<Utc>>,

    created_at: DateTime<Utc>,
}

impl SeedPair {
    /// Create a fresh active pair with nonce 0
    pub fn new(
        owner_id: impl Into<String>,
        server_seed: String,
        client_seed: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        let server_seed_hash = server_seed_hash(&server_seed);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            server_seed,
            server_seed_hash,
            client_seed,
            nonce: 0,
            is_active: true,
            revealed: false,
            revealed_at: None,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The secret seed
    ///
    /// Internal callers only; anything player-facing goes through [`SeedPair::view`].
    pub fn server_seed(&self) -> &str {
        &self.server_seed
    }

    pub fn server_seed_hash(&self) -> &str {
        &self.server_seed_hash
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn revealed_at(&self) -> Option<DateTime<Utc>> {
        self.revealed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Tuple for resolving the next bet
    pub fn seed_tuple(&self) -> SeedTuple {
        SeedTuple::new(&self.server_seed, &self.client_seed, self.nonce)
    }

    /// Whether the stored hash still commits to the stored seed
    pub fn commitment_holds(&self) -> bool {
        verify_commitment(&self.server_seed, &self.server_seed_hash).is_verified()
    }

    /// Audit a pair after reveal
    ///
    /// Returns `None` while the pair is active: there is nothing to check
    /// without the server seed.
    pub fn audit(&self) -> Option<FairnessCheck> {
        if !self.revealed {
            return None;
        }
        Some(verify_commitment(&self.server_seed, &self.server_seed_hash))
    }

    /// Whether the record satisfies every seed pair invariant
    pub fn is_consistent(&self) -> bool {
        let reveal_consistent = self.revealed == !self.is_active
            && self.revealed == self.revealed_at.is_some();
        reveal_consistent && self.commitment_holds()
    }

    /// Player-facing projection
    pub fn view(&self) -> SeedPairView {
        SeedPairView {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            server_seed_hash: self.server_seed_hash.clone(),
            server_seed: self.revealed.then(|| self.server_seed.clone()),
            client_seed: self.client_seed.clone(),
            nonce: self.nonce,
            is_active: self.is_active,
            revealed: self.revealed,
            revealed_at: self.revealed_at,
            created_at: self.created_at,
        }
    }

    /// Apply a store patch, enforcing the lifecycle transitions
    ///
    /// Store implementations call this so every backend shares one
    /// definition of a legal update.
    pub fn apply(&mut self, patch: &SeedPairPatch) -> Result<(), StoreError> {
        match patch {
            SeedPairPatch::AdvanceNonce { expected } => {
                if !self.is_active {
                    return Err(self.rejected("cannot advance nonce of a revealed pair"));
                }
                if self.nonce != *expected {
                    return Err(StoreError::NonceConflict {
                        id: self.id.clone(),
                        expected: *expected,
                        found: self.nonce,
                    });
                }
                self.nonce = self
                    .nonce
                    .checked_add(1)
                    .ok_or_else(|| self.rejected("nonce exhausted"))?;
            }
            SeedPairPatch::Reveal { revealed_at } => {
                if self.revealed {
                    return Err(self.rejected("pair already revealed"));
                }
                self.is_active = false;
                self.revealed = true;
                self.revealed_at = Some(*revealed_at);
            }
        }
        Ok(())
    }

    fn rejected(&self, reason: &str) -> StoreError {
        StoreError::InvalidPatch {
            id: self.id.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Seed pair as shown to players and auditors
///
/// `server_seed` is `Some` only once the pair is revealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPairView {
    pub id: String,
    pub owner_id: String,
    pub server_seed_hash: String,
    pub server_seed: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub is_active: bool,
    pub revealed: bool,
    pub revealed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
