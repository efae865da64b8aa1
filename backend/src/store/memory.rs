//! In-memory seed store
//!
//! All records sit behind one mutex, so every method is a single critical
//! section. Rotation validates everything before it writes, so a failed
//! rotation leaves both records untouched.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::snapshot::{self, StoreSnapshot};
use super::{SeedPairPatch, SeedStore, StoreError};
use crate::models::{BetRecord, SeedPair};

#[derive(Debug, Default)]
struct StoreState {
    pairs: HashMap<String, SeedPair>,

    /// Pair ids in creation order
    order: Vec<String>,

    /// owner_id -> id of the owner's active pair
    active: HashMap<String, String>,

    /// seed_pair_id -> bets resolved under it, in insertion order
    bets: HashMap<String, Vec<BetRecord>>,
}

impl StoreState {
    fn insert_pair(&mut self, record: SeedPair) -> Result<SeedPair, StoreError> {
        if self.pairs.contains_key(record.id()) {
            return Err(StoreError::Backend(format!(
                "duplicate seed pair id {}",
                record.id()
            )));
        }
        if record.is_active() {
            if self.active.contains_key(record.owner_id()) {
                return Err(StoreError::DuplicateActive {
                    owner_id: record.owner_id().to_string(),
                });
            }
            self.active
                .insert(record.owner_id().to_string(), record.id().to_string());
        }
        self.order.push(record.id().to_string());
        self.pairs.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    fn patch_pair(&mut self, id: &str, patch: &SeedPairPatch) -> Result<SeedPair, StoreError> {
        let current = self
            .pairs
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // Patch a copy so a rejected update leaves the record untouched
        let mut updated = current.clone();
        updated.apply(patch)?;

        let owner = updated.owner_id().to_string();
        if updated.is_active() {
            match self.active.get(&owner) {
                Some(active_id) if active_id != id => {
                    return Err(StoreError::DuplicateActive { owner_id: owner });
                }
                _ => {
                    self.active.insert(owner, id.to_string());
                }
            }
        } else if self.active.get(&owner).map(String::as_str) == Some(id) {
            self.active.remove(&owner);
        }

        self.pairs.insert(id.to_string(), updated.clone());
        Ok(updated)
    }
}

/// Reference [`SeedStore`] backend
#[derive(Debug, Default)]
pub struct InMemorySeedStore {
    state: Mutex<StoreState>,
}

impl InMemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of seed pairs, active and revealed
    pub fn seed_pair_count(&self) -> usize {
        self.state.lock().pairs.len()
    }

    /// All bets resolved under a pair, in resolution order
    pub fn bets_for_seed_pair(&self, seed_pair_id: &str) -> Vec<BetRecord> {
        self.state
            .lock()
            .bets
            .get(seed_pair_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Export every record with an integrity hash
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let state = self.state.lock();

        let seed_pairs: Vec<SeedPair> = state
            .order
            .iter()
            .filter_map(|id| state.pairs.get(id))
            .cloned()
            .collect();

        let bets: Vec<BetRecord> = state
            .order
            .iter()
            .filter_map(|id| state.bets.get(id))
            .flatten()
            .cloned()
            .collect();

        StoreSnapshot::seal(seed_pairs, bets)
    }

    /// Rebuild a store from a validated snapshot
    pub fn restore(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        snapshot::validate_snapshot(&snapshot)?;

        let mut state = StoreState::default();
        for pair in snapshot.seed_pairs {
            state.insert_pair(pair)?;
        }
        for bet in snapshot.bets {
            state
                .bets
                .entry(bet.seed_pair_id.clone())
                .or_default()
                .push(bet);
        }

        Ok(Self {
            state: Mutex::new(state),
        })
    }
}

impl SeedStore for InMemorySeedStore {
    fn find_active_seed_pair(&self, owner_id: &str) -> Result<Option<SeedPair>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .active
            .get(owner_id)
            .and_then(|id| state.pairs.get(id))
            .cloned())
    }

    fn find_seed_pair(&self, id: &str) -> Result<Option<SeedPair>, StoreError> {
        Ok(self.state.lock().pairs.get(id).cloned())
    }

    fn list_seed_pairs(&self, owner_id: &str) -> Result<Vec<SeedPair>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .rev()
            .filter_map(|id| state.pairs.get(id))
            .filter(|pair| pair.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    fn create_seed_pair(&self, record: SeedPair) -> Result<SeedPair, StoreError> {
        self.state.lock().insert_pair(record)
    }

    fn update_seed_pair(&self, id: &str, patch: SeedPairPatch) -> Result<SeedPair, StoreError> {
        self.state.lock().patch_pair(id, &patch)
    }

    fn record_bet(&self, bet: BetRecord) -> Result<BetRecord, StoreError> {
        let mut state = self.state.lock();
        if !state.pairs.contains_key(&bet.seed_pair_id) {
            return Err(StoreError::NotFound(bet.seed_pair_id.clone()));
        }
        state
            .bets
            .entry(bet.seed_pair_id.clone())
            .or_default()
            .push(bet.clone());
        Ok(bet)
    }

    fn count_bets_for_seed_pair(&self, seed_pair_id: &str) -> Result<u64, StoreError> {
        let state = self.state.lock();
        if !state.pairs.contains_key(seed_pair_id) {
            return Err(StoreError::NotFound(seed_pair_id.to_string()));
        }
        Ok(state.bets.get(seed_pair_id).map_or(0, |bets| bets.len() as u64))
    }

    fn rotate_seed_pair(
        &self,
        retire_id: &str,
        revealed_at: DateTime<Utc>,
        replacement: SeedPair,
    ) -> Result<(SeedPair, SeedPair), StoreError> {
        let mut state = self.state.lock();

        let mut retired = state
            .pairs
            .get(retire_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(retire_id.to_string()))?;
        if retired.owner_id() != replacement.owner_id() {
            return Err(StoreError::InvalidPatch {
                id: retire_id.to_string(),
                reason: "replacement belongs to a different owner".to_string(),
            });
        }
        if !replacement.is_active() {
            return Err(StoreError::InvalidPatch {
                id: replacement.id().to_string(),
                reason: "replacement is not active".to_string(),
            });
        }
        if state.pairs.contains_key(replacement.id()) {
            return Err(StoreError::Backend(format!(
                "duplicate seed pair id {}",
                replacement.id()
            )));
        }
        retired.apply(&SeedPairPatch::Reveal { revealed_at })?;

        // Every check has passed; nothing below can fail
        let owner = replacement.owner_id().to_string();
        state.active.insert(owner, replacement.id().to_string());
        state.order.push(replacement.id().to_string());
        state
            .pairs
            .insert(replacement.id().to_string(), replacement.clone());
        state.pairs.insert(retire_id.to_string(), retired.clone());

        Ok((retired, replacement))
    }
}
