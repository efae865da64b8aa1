//! Domain models for the fairness engine

pub mod bet;
pub mod seed_pair;

// Re-exports
pub use bet::{BetChoice, BetRecord, Color};
pub use seed_pair::{SeedPair, SeedPairView};
