//! Fairness Core - Provably Fair Randomness Engine
//!
//! Deterministic, auditable random number generation for game outcomes, plus
//! the lifecycle of the seed material it consumes.
//!
//! # Architecture
//!
//! - **rng**: HMAC-SHA256 byte stream, floats, integers, shuffles, verification
//! - **models**: Domain types (SeedPair, BetRecord)
//! - **store**: Persistent store contract and in-memory backend
//! - **lifecycle**: Seed pair creation, nonce advancement, rotation
//! - **core**: Configuration and clock
//!
//! # Critical Invariants
//!
//! 1. Generation is a pure function of (server seed, client seed, nonce, cursor)
//! 2. One active seed pair per owner; an active server seed is never exposed
//! 3. A nonce is used by at most one bet

// Module declarations
pub mod core;
pub mod lifecycle;
pub mod models;
pub mod rng;
pub mod store;

// Re-exports for convenience
pub use crate::core::config::{ConfigError, FairnessConfig};
pub use crate::core::time::{Clock, FixedClock, SystemClock};
pub use lifecycle::{PlacedBet, Rotation, SeedError, SeedManager};
pub use models::{
    bet::{BetChoice, BetRecord, Color},
    seed_pair::{SeedPair, SeedPairView},
};
pub use rng::{FairnessCheck, GeneratorError, SeedTuple};
pub use store::{snapshot::StoreSnapshot, InMemorySeedStore, SeedPairPatch, SeedStore, StoreError};
