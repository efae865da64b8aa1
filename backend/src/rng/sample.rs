//! Floats, bounded integers and shuffles derived from the byte stream
//!
//! Every value consumes exactly 4 stream bytes read as a big-endian `u32`.
//! All scaling is done in integer arithmetic so results are bit-exact across
//! implementations: `u32 / 2^32` is exact in an `f64`, and integer sampling
//! never goes through a float at all.

use super::stream::{GeneratorError, SeedTuple};

const BYTES_PER_DRAW: usize = 4;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Convert 4 stream bytes into a float in [0.0, 1.0)
///
/// # Example
/// ```
/// use fairness_core_rs::rng::float_from_bytes;
///
/// assert_eq!(float_from_bytes([0x80, 0, 0, 0]), 0.5);
/// assert_eq!(float_from_bytes([0, 0, 0, 0]), 0.0);
/// ```
pub fn float_from_bytes(bytes: [u8; BYTES_PER_DRAW]) -> f64 {
    u32::from_be_bytes(bytes) as f64 / TWO_POW_32
}

/// Draw `n` raw 32-bit units from cursor 0 in one pass over the stream
fn units(tuple: &SeedTuple, n: usize) -> Result<Vec<u32>, GeneratorError> {
    let count = n.checked_mul(BYTES_PER_DRAW).ok_or_else(|| {
        GeneratorError::InvalidInput(format!("cannot draw {} values", n))
    })?;

    let bytes: Vec<u8> = tuple.stream()?.take(count).collect();
    Ok(bytes
        .chunks_exact(BYTES_PER_DRAW)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Map a unit onto `[0, span)`; equals `floor(unit / 2^32 * span)` exactly
fn scale(unit: u32, span: u128) -> u128 {
    (unit as u128 * span) >> 32
}

/// Generate `n` floats in [0.0, 1.0)
///
/// # Example
/// ```
/// use fairness_core_rs::rng::{floats, SeedTuple};
///
/// let tuple = SeedTuple::new("server-secret", "lucky", 0);
/// let values = floats(&tuple, 3).unwrap();
/// assert_eq!(values.len(), 3);
/// assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
/// ```
pub fn floats(tuple: &SeedTuple, n: usize) -> Result<Vec<f64>, GeneratorError> {
    Ok(units(tuple, n)?
        .into_iter()
        .map(|unit| unit as f64 / TWO_POW_32)
        .collect())
}

/// Generate a single float in [0.0, 1.0)
pub fn float(tuple: &SeedTuple) -> Result<f64, GeneratorError> {
    let unit = units(tuple, 1)?[0];
    Ok(unit as f64 / TWO_POW_32)
}

/// Generate `n` integers in `[min, max]` (both inclusive)
///
/// # Errors
/// `InvalidInput` if `max < min`
///
/// # Example
/// ```
/// use fairness_core_rs::rng::{ints, SeedTuple};
///
/// let tuple = SeedTuple::new("server-secret", "lucky", 0);
/// let rolls = ints(&tuple, 10, 1, 6).unwrap();
/// assert!(rolls.iter().all(|r| (1..=6).contains(r)));
/// ```
pub fn ints(tuple: &SeedTuple, n: usize, min: i64, max: i64) -> Result<Vec<i64>, GeneratorError> {
    if max < min {
        return Err(GeneratorError::InvalidInput(format!(
            "range max {} is below min {}",
            max, min
        )));
    }

    let span = (max as i128 - min as i128 + 1) as u128;
    Ok(units(tuple, n)?
        .into_iter()
        .map(|unit| (min as i128 + scale(unit, span) as i128) as i64)
        .collect())
}

/// Fisher-Yates shuffle driven by one batch of `items.len()` draws
///
/// Step `s` swaps position `i = n - 1 - s` with `j = floor(f[s] * (i + 1))`.
/// The final step always swaps position 0 with itself but still consumes its
/// draw, so a deck of `n` cards always uses exactly `n` values.
///
/// # Example
/// ```
/// use fairness_core_rs::rng::{shuffle, SeedTuple};
///
/// let tuple = SeedTuple::new("server-secret", "lucky", 0);
/// let mut deck = shuffle((0..52).collect::<Vec<u8>>(), &tuple).unwrap();
/// deck.sort();
/// assert_eq!(deck, (0..52).collect::<Vec<u8>>());
/// ```
pub fn shuffle<T>(mut items: Vec<T>, tuple: &SeedTuple) -> Result<Vec<T>, GeneratorError> {
    let n = items.len();
    let draws = units(tuple, n)?;

    for (step, unit) in draws.into_iter().enumerate() {
        let i = n - 1 - step;
        let j = scale(unit, (i + 1) as u128) as usize;
        items.swap(i, j);
    }

    Ok(items)
}
