//! Seed and noise primitives.
//!
//! Every figure the engine produces is derived from these two functions, so they
//! must stay bit-for-bit stable: no clock, no process entropy, no RNG state.

/// Stable, non-cryptographic seed for a deal name.
///
/// Sums each UTF-16 code unit of the lowercased name weighted by its 1-based
/// position.
pub fn seed_from_name(name: &str) -> u64 {
    name.to_lowercase()
        .encode_utf16()
        .enumerate()
        .map(|(idx, unit)| u64::from(unit) * (idx as u64 + 1))
        .sum()
}

/// Hash-based pseudo-random value in `[0, 1)` for a `(seed, offset)` pair.
pub fn deterministic_noise(seed: u64, offset: u64) -> f64 {
    let x = (seed as f64 * 12.9898 + offset as f64 * 78.233).sin() * 43758.5453;
    x - x.floor()
}

/// Rounds to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
