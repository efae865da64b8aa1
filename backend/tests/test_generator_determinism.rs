//! Generator determinism tests
//!
//! Critical invariants tested:
//! - Same tuple always yields the same bytes
//! - Byte k of a stream does not depend on how the stream was requested
//! - Known vectors match an independent HMAC-SHA256 implementation

use fairness_core_rs::rng::{
    byte_stream, bytes_at, digest_block, float, floats, server_seed_hash, verify, BLOCK_LEN,
};
use fairness_core_rs::SeedTuple;

const ZERO_SEED: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// Known Vectors
// ============================================================================

#[test]
fn test_zero_seed_vector_digest() {
    assert_eq!(
        verify(ZERO_SEED, "test", 0, 0).unwrap(),
        "c07c6fe56b1ebb2b65b37dac23e1c9a2e9f5238bbcd1736b9106631e0f986c10"
    );
}

#[test]
fn test_zero_seed_vector_float() {
    let tuple = SeedTuple::new(ZERO_SEED, "test", 0);
    let value = float(&tuple).unwrap();
    assert_eq!(value, 0.7518987592775375);
    assert_eq!(value, float(&tuple).unwrap());
}

#[test]
fn test_zero_seed_commitment() {
    assert_eq!(
        server_seed_hash(ZERO_SEED),
        "60e05bd1b195af2f94112fa7197a5c88289058840ce7c6df9693756bc6250f55"
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_calls_identical() {
    let a = byte_stream("server", "client", 42, 0, 500).unwrap();
    let b = byte_stream("server", "client", 42, 0, 500).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_each_input_changes_output() {
    let base = byte_stream("server", "client", 1, 0, 32).unwrap();
    assert_ne!(base, byte_stream("server2", "client", 1, 0, 32).unwrap());
    assert_ne!(base, byte_stream("server", "client2", 1, 0, 32).unwrap());
    assert_ne!(base, byte_stream("server", "client", 2, 0, 32).unwrap());
    assert_ne!(base, byte_stream("server", "client", 1, 1, 32).unwrap());
}

#[test]
fn test_message_fields_do_not_run_together() {
    // Without separators both messages would read "test120"
    let a = verify("server", "test1", 2, 0).unwrap();
    let b = verify("server", "test", 12, 0).unwrap();
    assert_ne!(a, b);
}

// ============================================================================
// Positional Independence
// ============================================================================

#[test]
fn test_prefix_of_longer_request() {
    let short = byte_stream("server", "client", 9, 0, 10).unwrap();
    let long = byte_stream("server", "client", 9, 0, 1000).unwrap();
    assert_eq!(short, long[..10].to_vec());
}

#[test]
fn test_successive_chunks_match_single_call() {
    let tuple = SeedTuple::new("server", "client", 9);
    let whole = byte_stream("server", "client", 9, 0, 300).unwrap();

    let mut stitched = Vec::new();
    let mut position = 0u64;
    for chunk in [1usize, 7, 31, 33, 64, 100, 64] {
        stitched.extend(bytes_at(&tuple, position, chunk).unwrap());
        position += chunk as u64;
    }

    assert_eq!(stitched, whole);
}

#[test]
fn test_cursor_start_is_block_offset() {
    let whole = byte_stream("server", "client", 3, 0, BLOCK_LEN * 4).unwrap();
    let from_two = byte_stream("server", "client", 3, 2, BLOCK_LEN * 2).unwrap();
    assert_eq!(from_two, whole[BLOCK_LEN * 2..].to_vec());
    assert_eq!(
        digest_block("server", "client", 3, 3).unwrap().to_vec(),
        whole[BLOCK_LEN * 3..].to_vec()
    );
}

#[test]
fn test_floats_prefix_stable() {
    let tuple = SeedTuple::new("server", "client", 5);
    let few = floats(&tuple, 3).unwrap();
    let many = floats(&tuple, 52).unwrap();
    assert_eq!(few, many[..3].to_vec());
}

#[test]
fn test_stream_iterator_matches_byte_stream() {
    let tuple = SeedTuple::new("server", "client", 11);
    let via_iter: Vec<u8> = tuple.stream().unwrap().take(77).collect();
    assert_eq!(via_iter, byte_stream("server", "client", 11, 0, 77).unwrap());
}

#[test]
fn test_concurrent_generation_agrees() {
    let expected = byte_stream("server", "client", 1, 0, 256).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| byte_stream("server", "client", 1, 0, 256).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
