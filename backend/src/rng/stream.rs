//! HMAC-SHA256 byte stream
//!
//! The stream for a `(server_seed, client_seed, nonce)` tuple is the
//! concatenation of 32-byte HMAC blocks for cursor 0, 1, 2, ... Byte `k` of
//! the stream always lives in block `k / 32` at offset `k % 32`, so any slice
//! of the stream can be recomputed without producing the bytes before it.
//!
//! # Determinism
//!
//! Same tuple → same bytes. This is CRITICAL for:
//! - Auditing (a player recomputes outcomes after the reveal)
//! - Dispute resolution (support recomputes a historical bet)
//! - Cross-implementation checks (the protocol is fixed and public)

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Size of one HMAC-SHA256 block in bytes
pub const BLOCK_LEN: usize = 32;

/// Errors raised at the generator boundary
///
/// These are contract violations by the caller, never transient faults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The key tuple a single bet is resolved from
///
/// # Example
/// ```
/// use fairness_core_rs::rng::SeedTuple;
///
/// let tuple = SeedTuple::new("server-secret", "lucky", 0);
/// let bytes = tuple.stream().unwrap().take(4).collect::<Vec<u8>>();
/// assert_eq!(bytes.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTuple {
    /// Secret HMAC key (revealed only after rotation)
    pub server_seed: String,

    /// Player-visible seed mixed into every message
    pub client_seed: String,

    /// Per-bet counter of the seed pair
    pub nonce: u64,
}

impl SeedTuple {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    /// Reject malformed seeds before any computation
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.server_seed.is_empty() {
            return Err(GeneratorError::InvalidInput(
                "server seed must not be empty".to_string(),
            ));
        }
        if self.client_seed.is_empty() {
            return Err(GeneratorError::InvalidInput(
                "client seed must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Byte stream starting at cursor 0
    pub fn stream(&self) -> Result<ByteStream<'_>, GeneratorError> {
        self.stream_from(0)
    }

    /// Byte stream starting at the first byte of block `cursor`
    pub fn stream_from(&self, cursor: u64) -> Result<ByteStream<'_>, GeneratorError> {
        self.validate()?;
        let keyed = HmacSha256::new_from_slice(self.server_seed.as_bytes()).map_err(|e| {
            GeneratorError::InvalidInput(format!("server seed rejected as MAC key: {}", e))
        })?;

        Ok(ByteStream {
            keyed,
            client_seed: &self.client_seed,
            nonce: self.nonce,
            next_cursor: Some(cursor),
            block: [0; BLOCK_LEN],
            offset: BLOCK_LEN,
        })
    }
}

/// Unbounded iterator over the HMAC byte stream of one tuple
///
/// The keyed MAC state is computed once and cloned per block.
pub struct ByteStream<'a> {
    keyed: HmacSha256,
    client_seed: &'a str,
    nonce: u64,
    /// Cursor of the next block to compute; `None` once `u64::MAX` is consumed
    next_cursor: Option<u64>,
    block: [u8; BLOCK_LEN],
    offset: usize,
}

impl ByteStream<'_> {
    fn refill(&mut self) -> bool {
        let Some(cursor) = self.next_cursor else {
            return false;
        };

        let mut mac = self.keyed.clone();
        mac.update(message(self.client_seed, self.nonce, cursor).as_bytes());
        self.block.copy_from_slice(&mac.finalize().into_bytes());
        self.offset = 0;
        self.next_cursor = cursor.checked_add(1);
        true
    }
}

impl Iterator for ByteStream<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.offset == BLOCK_LEN && !self.refill() {
            return None;
        }
        let byte = self.block[self.offset];
        self.offset += 1;
        Some(byte)
    }
}

fn message(client_seed: &str, nonce: u64, cursor: u64) -> String {
    format!("{}:{}:{}", client_seed, nonce, cursor)
}

/// SHA-256 commitment of a server seed, lowercase hex
///
/// # Example
/// ```
/// use fairness_core_rs::rng::server_seed_hash;
///
/// let hash = server_seed_hash("server-secret");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, server_seed_hash("server-secret"));
/// ```
pub fn server_seed_hash(server_seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(server_seed.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute the single 32-byte block at `cursor`
pub fn digest_block(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
) -> Result<[u8; BLOCK_LEN], GeneratorError> {
    let tuple = SeedTuple::new(server_seed, client_seed, nonce);
    let mut stream = tuple.stream_from(cursor)?;
    stream.refill();
    Ok(stream.block)
}

/// Exactly `count` stream bytes starting at block `cursor`
///
/// Blocks are concatenated with increasing cursor and the tail is truncated.
pub fn byte_stream(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
    count: usize,
) -> Result<Vec<u8>, GeneratorError> {
    let blocks = count.div_ceil(BLOCK_LEN) as u64;
    if blocks > 0 && cursor.checked_add(blocks - 1).is_none() {
        return Err(GeneratorError::InvalidInput(format!(
            "{} bytes from cursor {} overrun the stream",
            count, cursor
        )));
    }

    let tuple = SeedTuple::new(server_seed, client_seed, nonce);
    let bytes: Vec<u8> = tuple.stream_from(cursor)?.take(count).collect();
    Ok(bytes)
}

/// `count` bytes starting at absolute stream `position` (cursor 0 origin)
pub fn bytes_at(tuple: &SeedTuple, position: u64, count: usize) -> Result<Vec<u8>, GeneratorError> {
    let cursor = position / BLOCK_LEN as u64;
    let skip = (position % BLOCK_LEN as u64) as usize;
    let needed = skip.checked_add(count).ok_or_else(|| {
        GeneratorError::InvalidInput(format!("byte count {} is too large", count))
    })?;

    let mut bytes = byte_stream(
        &tuple.server_seed,
        &tuple.client_seed,
        tuple.nonce,
        cursor,
        needed,
    )?;
    bytes.drain(..skip);
    Ok(bytes)
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
