//! Bet record model
//!
//! The record of one resolved bet, pinned to the seed pair and nonce it was
//! resolved with. Game resolution itself lives outside this crate; the record
//! only carries what an auditor needs to recompute the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roulette-style color choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Black,
    Green,
}

/// What the player bet on
///
/// Tagged so a persisted record always has a checkable shape.
///
/// # Example
/// ```
/// use fairness_core_rs::BetChoice;
///
/// let choice: BetChoice = serde_json::from_str(r#"{"kind":"number","value":17}"#).unwrap();
/// assert_eq!(choice, BetChoice::Number { value: 17 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetChoice {
    /// A single number (roulette straight-up, exact dice face)
    Number { value: i64 },

    /// Inclusive number range (dice over/under, roulette dozens)
    Range { low: i64, high: i64 },

    /// A color
    Color { color: Color },

    /// Grid cells picked (mines, keno)
    Cells { cells: Vec<u32> },
}

/// A bet resolved under a seed pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    /// Unique bet identifier (UUID)
    pub id: String,

    pub owner_id: String,

    pub seed_pair_id: String,

    /// Nonce the bet was resolved with
    pub nonce: u64,

    pub choice: BetChoice,

    /// Hex HMAC digest of cursor 0 for this nonce
    pub digest: String,

    pub created_at: DateTime<Utc>,
}

impl BetRecord {
    pub fn new(
        owner_id: impl Into<String>,
        seed_pair_id: impl Into<String>,
        nonce: u64,
        choice: BetChoice,
        digest: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            seed_pair_id: seed_pair_id.into(),
            nonce,
            choice,
            digest,
            created_at,
        }
    }
}
