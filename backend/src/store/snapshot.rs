//! Snapshot - Export/Import Store Contents
//!
//! Seed pairs are never deleted; they are retained so historical bets stay
//! verifiable. A snapshot is the audit export of that history.
//!
//! # Critical Invariants
//!
//! - **Integrity**: `integrity_hash` is the SHA-256 of the canonical JSON of
//!   the records; any edit after sealing is detected
//! - **Single Active**: at most one active pair per owner
//! - **Reveal Consistency**: revealed ⇔ inactive ⇔ `revealed_at` set
//! - **Commitment**: every `server_seed_hash` matches its `server_seed`
//! - **Referential Integrity**: every bet points at a known pair, with a nonce
//!   below that pair's current nonce

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use super::StoreError;
use crate::models::{BetRecord, SeedPair};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete store contents plus integrity hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// All seed pairs in creation order
    pub seed_pairs: Vec<SeedPair>,

    /// All bet records, grouped by seed pair in resolution order
    pub bets: Vec<BetRecord>,

    /// SHA256 of the canonical record JSON
    pub integrity_hash: String,
}

impl StoreSnapshot {
    /// Build a snapshot and compute its integrity hash
    pub fn seal(seed_pairs: Vec<SeedPair>, bets: Vec<BetRecord>) -> Result<Self, StoreError> {
        let integrity_hash = compute_integrity_hash(&seed_pairs, &bets)?;
        Ok(Self {
            seed_pairs,
            bets,
            integrity_hash,
        })
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self)
            .map_err(|e| StoreError::Backend(format!("Snapshot serialization failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::Backend(format!("Snapshot deserialization failed: {}", e)))
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// SHA-256 over the JSON of `(seed_pairs, bets)`
///
/// Struct fields serialize in declaration order, so the JSON is canonical for
/// a given record order.
pub fn compute_integrity_hash(
    seed_pairs: &[SeedPair],
    bets: &[BetRecord],
) -> Result<String, StoreError> {
    let json = serde_json::to_string(&(seed_pairs, bets))
        .map_err(|e| StoreError::Backend(format!("Snapshot hashing failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(format!("{:x}", result))
}

// ============================================================================
// Validation
// ============================================================================

fn invalid(msg: String) -> StoreError {
    StoreError::Backend(format!("Snapshot validation failed: {}", msg))
}

/// Validate snapshot integrity and record invariants
pub fn validate_snapshot(snapshot: &StoreSnapshot) -> Result<(), StoreError> {
    // 1. Integrity hash
    let expected = compute_integrity_hash(&snapshot.seed_pairs, &snapshot.bets)?;
    if expected != snapshot.integrity_hash {
        return Err(invalid(format!(
            "integrity hash mismatch: recorded {}, computed {}",
            snapshot.integrity_hash, expected
        )));
    }

    // 2. Per-pair invariants and single active per owner
    let mut pairs_by_id: HashMap<&str, &SeedPair> = HashMap::new();
    let mut active_owners = HashSet::new();
    for pair in &snapshot.seed_pairs {
        if pairs_by_id.insert(pair.id(), pair).is_some() {
            return Err(invalid(format!("duplicate seed pair id {}", pair.id())));
        }
        if !pair.is_consistent() {
            return Err(invalid(format!(
                "seed pair {} violates reveal or commitment invariants",
                pair.id()
            )));
        }
        if pair.is_active() && !active_owners.insert(pair.owner_id()) {
            return Err(invalid(format!(
                "owner {} has more than one active seed pair",
                pair.owner_id()
            )));
        }
    }

    // 3. Bets reference known pairs with already-consumed nonces
    let mut seen = HashSet::new();
    for bet in &snapshot.bets {
        let pair = pairs_by_id.get(bet.seed_pair_id.as_str()).ok_or_else(|| {
            invalid(format!(
                "bet {} references unknown seed pair {}",
                bet.id, bet.seed_pair_id
            ))
        })?;
        if bet.nonce >= pair.nonce() {
            return Err(invalid(format!(
                "bet {} uses nonce {} not yet consumed by seed pair {}",
                bet.id, bet.nonce, bet.seed_pair_id
            )));
        }
        if !seen.insert((bet.seed_pair_id.as_str(), bet.nonce)) {
            return Err(invalid(format!(
                "nonce {} reused on seed pair {}",
                bet.nonce, bet.seed_pair_id
            )));
        }
    }

    Ok(())
}
