//! Persistent store contract for seed pairs and bets
//!
//! The lifecycle manager reaches storage only through [`SeedStore`]. A
//! backend must guarantee:
//!
//! 1. At most one active seed pair per owner (`create_seed_pair` rejects a
//!    second one with [`StoreError::DuplicateActive`])
//! 2. `update_seed_pair` is an atomic read-modify-write of one record
//! 3. `rotate_seed_pair` reveals one pair and inserts its replacement in a
//!    single transaction
//! 4. Records are never deleted, and a revealed pair stays revealed
//!
//! [`InMemorySeedStore`] is the reference backend.

mod memory;
pub mod snapshot;

pub use memory::InMemorySeedStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BetRecord, SeedPair};

/// Errors raised by a store backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Owner {owner_id} already has an active seed pair")]
    DuplicateActive { owner_id: String },

    #[error("Seed pair not found: {0}")]
    NotFound(String),

    #[error("Nonce conflict on seed pair {id}: expected {expected}, found {found}")]
    NonceConflict { id: String, expected: u64, found: u64 },

    #[error("Rejected update to seed pair {id}: {reason}")]
    InvalidPatch { id: String, reason: String },

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Single-record update applied atomically by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SeedPairPatch {
    /// Compare-and-set `nonce` from `expected` to `expected + 1`
    AdvanceNonce { expected: u64 },

    /// Retire an active pair and expose its server seed; final
    Reveal { revealed_at: DateTime<Utc> },
}

/// Storage contract consumed by the lifecycle manager
pub trait SeedStore: Send + Sync {
    fn find_active_seed_pair(&self, owner_id: &str) -> Result<Option<SeedPair>, StoreError>;

    fn find_seed_pair(&self, id: &str) -> Result<Option<SeedPair>, StoreError>;

    /// All pairs of an owner, newest first
    fn list_seed_pairs(&self, owner_id: &str) -> Result<Vec<SeedPair>, StoreError>;

    /// Insert a new record; must reject a second active pair for the owner
    fn create_seed_pair(&self, record: SeedPair) -> Result<SeedPair, StoreError>;

    /// Atomically apply `patch` to one record and return the result
    fn update_seed_pair(&self, id: &str, patch: SeedPairPatch) -> Result<SeedPair, StoreError>;

    fn record_bet(&self, bet: BetRecord) -> Result<BetRecord, StoreError>;

    fn count_bets_for_seed_pair(&self, seed_pair_id: &str) -> Result<u64, StoreError>;

    /// Reveal `retire_id` and insert `replacement` as one unit
    ///
    /// Must be atomic: no reader may see the owner without an active pair,
    /// and on failure neither record may change. A revealed pair is never
    /// made active again, so a backend that cannot do this in one
    /// transaction cannot back the lifecycle manager.
    fn rotate_seed_pair(
        &self,
        retire_id: &str,
        revealed_at: DateTime<Utc>,
        replacement: SeedPair,
    ) -> Result<(SeedPair, SeedPair), StoreError>;
}
