//! Deterministic, verifiable random number generation
//!
//! Every game outcome is derived from a keyed HMAC-SHA256 byte stream over
//! `(server_seed, client_seed, nonce, cursor)`. Nothing in this module holds
//! state between calls: the same inputs produce the same bytes on every
//! platform, in every process, in any call order.
//!
//! CRITICAL: All randomness used to resolve a bet MUST go through this module.
//!
//! # Protocol
//!
//! - Commitment: `SHA-256(server_seed)`, lowercase hex
//! - Block: `HMAC-SHA256(key = server_seed, msg = "{client_seed}:{nonce}:{cursor}")`
//! - Float: big-endian `u32` of 4 stream bytes divided by 2^32
//! - Integer: `min + ((u32 * (max - min + 1)) >> 32)`

mod sample;
mod stream;
mod verify;

pub use sample::{float, float_from_bytes, floats, ints, shuffle};
pub use stream::{
    byte_stream, bytes_at, digest_block, server_seed_hash, ByteStream, GeneratorError, SeedTuple,
    BLOCK_LEN,
};
pub use verify::{verify, verify_commitment, verify_digest, FairnessCheck};

pub(crate) use stream::to_hex;
