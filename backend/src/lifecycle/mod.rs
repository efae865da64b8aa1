//! Seed lifecycle manager
//!
//! Owns the protocol around seed pairs: one active pair per owner, nonce
//! advancement under concurrent bets, and rotation that reveals the old
//! server seed while activating a new one.
//!
//! # Critical Invariants
//!
//! 1. Every mutation of an owner's pairs runs under that owner's lock
//! 2. A reader never sees an owner with zero active pairs mid-rotation
//! 3. A nonce is handed to at most one bet
//! 4. An active server seed never leaves through [`SeedPairView`]

mod locks;

pub use locks::OwnerLocks;

use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::{ConfigError, FairnessConfig};
use crate::core::time::{Clock, SystemClock};
use crate::models::{BetChoice, BetRecord, SeedPair, SeedPairView};
use crate::rng::{self, to_hex, GeneratorError, SeedTuple};
use crate::store::{SeedPairPatch, SeedStore, StoreError};

/// Errors surfaced by lifecycle operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot rotate seeds for {owner_id} while a game session is open")]
    RotationBlocked { owner_id: String },

    #[error("Seed pair not found: {0}")]
    NotFound(String),

    #[error("Seed pair {0} has been revealed and can no longer be used")]
    Inactive(String),

    #[error("Nonce of seed pair {id} changed on every one of {attempts} attempts; re-read it before retrying")]
    Exhausted { id: String, attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<GeneratorError> for SeedError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::InvalidInput(msg) => SeedError::InvalidInput(msg),
        }
    }
}

/// Result of a rotation
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    /// Retired pair, revealed; its server seed may now be shown
    pub previous: SeedPair,

    /// Newly active pair
    pub current: SeedPair,
}

/// Result of [`SeedManager::place_bet`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBet<T> {
    pub bet: BetRecord,

    /// Whatever the resolve function produced
    pub outcome: T,

    /// The pair after its nonce advanced
    pub seed_pair: SeedPair,
}

/// Seed lifecycle manager over a [`SeedStore`]
///
/// # Example
/// ```
/// use fairness_core_rs::{FairnessConfig, InMemorySeedStore, SeedManager};
///
/// let manager = SeedManager::new(InMemorySeedStore::new(), FairnessConfig::default()).unwrap();
/// let pair = manager.get_or_create("player-1").unwrap();
/// let advanced = manager.advance_nonce(pair.id()).unwrap();
/// assert_eq!(advanced.nonce(), 1);
///
/// let rotation = manager.rotate("player-1", false, Some("my-seed")).unwrap();
/// assert!(rotation.previous.revealed());
/// assert_eq!(rotation.current.client_seed(), "my-seed");
/// ```
pub struct SeedManager<S: SeedStore> {
    store: S,
    config: FairnessConfig,
    clock: Arc<dyn Clock>,
    locks: OwnerLocks,
}

impl<S: SeedStore> SeedManager<S> {
    pub fn new(store: S, config: FairnessConfig) -> Result<Self, ConfigError> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: S,
        config: FairnessConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            clock,
            locks: OwnerLocks::new(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &FairnessConfig {
        &self.config
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Active pair of `owner_id`, created with an auto-generated client seed
    /// if the owner has none
    pub fn get_or_create(&self, owner_id: &str) -> Result<SeedPair, SeedError> {
        self.get_or_create_with(owner_id, None)
    }

    /// Like [`SeedManager::get_or_create`]; `client_seed` applies only when a
    /// new pair has to be created
    pub fn get_or_create_with(
        &self,
        owner_id: &str,
        client_seed: Option<&str>,
    ) -> Result<SeedPair, SeedError> {
        validate_owner(owner_id)?;
        if let Some(seed) = client_seed {
            self.validate_client_seed(seed)?;
        }
        self.locks
            .with_owner(owner_id, || self.get_or_create_locked(owner_id, client_seed))
    }

    fn get_or_create_locked(
        &self,
        owner_id: &str,
        client_seed: Option<&str>,
    ) -> Result<SeedPair, SeedError> {
        if let Some(active) = self.store.find_active_seed_pair(owner_id)? {
            return Ok(active);
        }

        let record = self.new_pair(owner_id, client_seed);
        match self.store.create_seed_pair(record) {
            Ok(created) => {
                info!(
                    owner_id,
                    seed_pair_id = created.id(),
                    server_seed_hash = created.server_seed_hash(),
                    "Created seed pair"
                );
                Ok(created)
            }
            // Another writer outside this process created one first
            Err(StoreError::DuplicateActive { .. }) => {
                self.store.find_active_seed_pair(owner_id)?.ok_or_else(|| {
                    SeedError::Storage(StoreError::Backend(format!(
                        "active seed pair of {} vanished after duplicate insert",
                        owner_id
                    )))
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn new_pair(&self, owner_id: &str, client_seed: Option<&str>) -> SeedPair {
        let client_seed = match client_seed {
            Some(seed) => seed.to_string(),
            None => random_hex(self.config.client_seed_bytes),
        };
        SeedPair::new(
            owner_id,
            random_hex(self.config.server_seed_bytes),
            client_seed,
            self.clock.now(),
        )
    }

    // ========================================================================
    // Bets
    // ========================================================================

    /// Seed tuple the owner's next bet resolves with
    ///
    /// The caller must advance the nonce once the bet is recorded; prefer
    /// [`SeedManager::place_bet`], which does both under the owner lock.
    pub fn resolve(&self, owner_id: &str) -> Result<SeedTuple, SeedError> {
        Ok(self.get_or_create(owner_id)?.seed_tuple())
    }

    /// Increment the nonce of an active pair by exactly one
    ///
    /// Retries a compare-and-set up to `max_nonce_retries` times, re-reading
    /// the pair before each attempt.
    pub fn advance_nonce(&self, seed_pair_id: &str) -> Result<SeedPair, SeedError> {
        let pair = self.find(seed_pair_id)?;
        self.locks
            .with_owner(pair.owner_id(), || self.advance_nonce_locked(seed_pair_id))
    }

    fn advance_nonce_locked(&self, seed_pair_id: &str) -> Result<SeedPair, SeedError> {
        let attempts = self.config.max_nonce_retries;
        for attempt in 1..=attempts {
            let current = self.find(seed_pair_id)?;
            if !current.is_active() {
                return Err(SeedError::Inactive(seed_pair_id.to_string()));
            }

            let patch = SeedPairPatch::AdvanceNonce {
                expected: current.nonce(),
            };
            match self.store.update_seed_pair(seed_pair_id, patch) {
                Ok(updated) => {
                    debug!(seed_pair_id, nonce = updated.nonce(), "Advanced nonce");
                    return Ok(updated);
                }
                Err(StoreError::NonceConflict { expected, found, .. }) => {
                    warn!(
                        seed_pair_id,
                        attempt, expected, found, "Nonce changed underneath advance"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SeedError::Exhausted {
            id: seed_pair_id.to_string(),
            attempts,
        })
    }

    /// Resolve, record and advance one bet as a single unit
    ///
    /// Under the owner lock: read the active tuple, run `resolve` on it,
    /// claim the nonce, then write the bet record. `resolve` must be a pure
    /// function of the tuple.
    pub fn place_bet<T, F>(
        &self,
        owner_id: &str,
        choice: BetChoice,
        resolve: F,
    ) -> Result<PlacedBet<T>, SeedError>
    where
        F: FnOnce(&SeedTuple) -> Result<T, GeneratorError>,
    {
        validate_owner(owner_id)?;
        self.locks.with_owner(owner_id, || {
            let pair = self.get_or_create_locked(owner_id, None)?;
            let tuple = pair.seed_tuple();

            let outcome = resolve(&tuple)?;
            let digest = rng::verify(&tuple.server_seed, &tuple.client_seed, tuple.nonce, 0)?;

            // Nonce is claimed before the bet is written: a failed write
            // skips a nonce, it never reuses one.
            let advanced = self.store.update_seed_pair(
                pair.id(),
                SeedPairPatch::AdvanceNonce {
                    expected: tuple.nonce,
                },
            )?;

            let bet = self.store.record_bet(BetRecord::new(
                owner_id,
                pair.id(),
                tuple.nonce,
                choice,
                digest,
                self.clock.now(),
            ))?;

            debug!(
                owner_id,
                seed_pair_id = pair.id(),
                nonce = tuple.nonce,
                bet_id = %bet.id,
                "Placed bet"
            );

            Ok(PlacedBet {
                bet,
                outcome,
                seed_pair: advanced,
            })
        })
    }

    /// Number of bets resolved under a pair
    pub fn bet_count(&self, seed_pair_id: &str) -> Result<u64, SeedError> {
        match self.store.count_bets_for_seed_pair(seed_pair_id) {
            Err(StoreError::NotFound(id)) => Err(SeedError::NotFound(id)),
            result => Ok(result?),
        }
    }

    // ========================================================================
    // Rotation
    // ========================================================================

    /// Reveal the active pair and activate a fresh one
    ///
    /// Refused with [`SeedError::RotationBlocked`] while the caller reports an
    /// open game session. An owner without a pair gets one created and
    /// immediately rotated, so `previous` is always present.
    pub fn rotate(
        &self,
        owner_id: &str,
        has_open_session: bool,
        new_client_seed: Option<&str>,
    ) -> Result<Rotation, SeedError> {
        validate_owner(owner_id)?;
        if let Some(seed) = new_client_seed {
            self.validate_client_seed(seed)?;
        }

        if has_open_session {
            warn!(owner_id, "Rotation blocked by open game session");
            return Err(SeedError::RotationBlocked {
                owner_id: owner_id.to_string(),
            });
        }

        self.locks.with_owner(owner_id, || {
            let active = self.get_or_create_locked(owner_id, None)?;
            let replacement = self.new_pair(owner_id, new_client_seed);
            let (previous, current) =
                self.store
                    .rotate_seed_pair(active.id(), self.clock.now(), replacement)?;

            info!(
                owner_id,
                revealed_seed_pair_id = previous.id(),
                revealed_nonce = previous.nonce(),
                seed_pair_id = current.id(),
                server_seed_hash = current.server_seed_hash(),
                "Rotated seed pair"
            );

            Ok(Rotation { previous, current })
        })
    }

    /// Replace the client seed; always a full rotation
    pub fn update_client_seed(
        &self,
        owner_id: &str,
        has_open_session: bool,
        new_client_seed: &str,
    ) -> Result<Rotation, SeedError> {
        self.rotate(owner_id, has_open_session, Some(new_client_seed))
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Player-facing view of the active pair (server seed hidden)
    pub fn active_view(&self, owner_id: &str) -> Result<SeedPairView, SeedError> {
        Ok(self.get_or_create(owner_id)?.view())
    }

    /// View of any pair by id; the server seed shows only once revealed
    pub fn seed_pair_view(&self, seed_pair_id: &str) -> Result<SeedPairView, SeedError> {
        Ok(self.find(seed_pair_id)?.view())
    }

    /// Every pair the owner has had, newest first
    pub fn history(&self, owner_id: &str) -> Result<Vec<SeedPairView>, SeedError> {
        validate_owner(owner_id)?;
        Ok(self
            .store
            .list_seed_pairs(owner_id)?
            .iter()
            .map(SeedPair::view)
            .collect())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn find(&self, seed_pair_id: &str) -> Result<SeedPair, SeedError> {
        self.store
            .find_seed_pair(seed_pair_id)?
            .ok_or_else(|| SeedError::NotFound(seed_pair_id.to_string()))
    }

    fn validate_client_seed(&self, seed: &str) -> Result<(), SeedError> {
        if seed.is_empty() {
            return Err(SeedError::InvalidInput(
                "client seed must not be empty".to_string(),
            ));
        }

        let len = seed.chars().count();
        if len > self.config.max_client_seed_len {
            return Err(SeedError::InvalidInput(format!(
                "client seed is {} characters, limit is {}",
                len, self.config.max_client_seed_len
            )));
        }

        if seed.chars().any(char::is_control) {
            return Err(SeedError::InvalidInput(
                "client seed must not contain control characters".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_owner(owner_id: &str) -> Result<(), SeedError> {
    if owner_id.is_empty() {
        return Err(SeedError::InvalidInput(
            "owner id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    to_hex(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::store::InMemorySeedStore;
    use chrono::{Duration, TimeZone, Utc};

    fn manager() -> SeedManager<InMemorySeedStore> {
        SeedManager::new(InMemorySeedStore::new(), FairnessConfig::default()).unwrap()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let manager = manager();
        let first = manager.get_or_create("alice").unwrap();
        let second = manager.get_or_create("alice").unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.store().seed_pair_count(), 1);
    }

    #[test]
    fn test_new_pair_shape() {
        let manager = manager();
        let pair = manager.get_or_create("alice").unwrap();
        assert_eq!(pair.server_seed().len(), 64);
        assert_eq!(pair.client_seed().len(), 32);
        assert_eq!(pair.nonce(), 0);
        assert!(pair.commitment_holds());
    }

    #[test]
    fn test_supplied_client_seed_only_used_on_create() {
        let manager = manager();
        let pair = manager.get_or_create_with("alice", Some("mine")).unwrap();
        assert_eq!(pair.client_seed(), "mine");

        let again = manager.get_or_create_with("alice", Some("other")).unwrap();
        assert_eq!(again.client_seed(), "mine");
    }

    #[test]
    fn test_empty_owner_rejected() {
        assert!(matches!(
            manager().get_or_create(""),
            Err(SeedError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_client_seed_validation() {
        let manager = manager();
        let too_long = "x".repeat(65);
        for bad in ["", "tab\there", too_long.as_str()] {
            assert!(
                matches!(
                    manager.update_client_seed("alice", false, bad),
                    Err(SeedError::InvalidInput(_))
                ),
                "client seed {:?} should be rejected",
                bad
            );
        }
        assert!(manager.update_client_seed("alice", false, &"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_advance_unknown_pair() {
        assert_eq!(
            manager().advance_nonce("missing"),
            Err(SeedError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_advance_revealed_pair_refused() {
        let manager = manager();
        let rotation = manager.rotate("alice", false, None).unwrap();
        assert_eq!(
            manager.advance_nonce(rotation.previous.id()),
            Err(SeedError::Inactive(rotation.previous.id().to_string()))
        );
    }

    #[test]
    fn test_rotation_stamps_reveal_time() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let manager = SeedManager::with_clock(
            InMemorySeedStore::new(),
            FairnessConfig::default(),
            clock.clone(),
        )
        .unwrap();

        manager.get_or_create("alice").unwrap();
        clock.advance(Duration::minutes(5));
        let rotation = manager.rotate("alice", false, None).unwrap();

        assert_eq!(rotation.previous.revealed_at(), Some(start + Duration::minutes(5)));
        assert_eq!(rotation.current.created_at(), start + Duration::minutes(5));
    }

    #[test]
    fn test_place_bet_resolver_error_leaves_nonce() {
        let manager = manager();
        let result = manager.place_bet("alice", BetChoice::Number { value: 3 }, |tuple| {
            rng::ints(tuple, 1, 6, 1)
        });
        assert!(matches!(result, Err(SeedError::InvalidInput(_))));
        assert_eq!(manager.get_or_create("alice").unwrap().nonce(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FairnessConfig {
            server_seed_bytes: 8,
            ..FairnessConfig::default()
        };
        assert!(SeedManager::new(InMemorySeedStore::new(), config).is_err());
    }
}
