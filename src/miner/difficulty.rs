// src/miner/difficulty.rs
//! Target and difficulty arithmetic
//!
//! Targets and hashes are 256-bit little-endian values. Each family scales
//! the difficulty-1 target by its own multipliers, taken from the
//! descriptor.

use crate::miner::algorithm::Algorithm;
use log::{debug, warn};
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for target comparisons
    pub struct U256(4);
}

/// Difficulty-1 target, `0xFFFF << 208`, as a double
pub const TRUEDIFFONE: f64 = 26959535291011309493156476344723991336010898738574164086137773096960.0;

const BITS64: f64 = 18446744073709551616.0;

/// Limb weights from the most significant down
const LIMB_WEIGHTS: [f64; 4] = [BITS64 * BITS64 * BITS64, BITS64 * BITS64, BITS64, 1.0];

/// Converts a 256-bit little-endian value to a double
pub fn le256_to_f64(bytes: &[u8; 32]) -> f64 {
    let value = U256::from_little_endian(bytes);
    value
        .0
        .iter()
        .rev()
        .zip(LIMB_WEIGHTS)
        .map(|(&limb, weight)| limb as f64 * weight)
        .sum()
}

/// Target for `diff` scaled by `multiplier`
///
/// A difficulty of zero is treated as one. Targets above `2^256 - 1`
/// saturate.
pub fn set_target(diff: f64, multiplier: f64) -> [u8; 32] {
    let diff = if diff > 0.0 {
        diff
    } else {
        if diff < 0.0 {
            warn!("Negative difficulty {} treated as 1", diff);
        }
        1.0
    };

    let mut remaining = TRUEDIFFONE * multiplier / diff;
    let mut limbs = [0u64; 4];
    if remaining >= LIMB_WEIGHTS[0] * BITS64 {
        limbs = [u64::MAX; 4];
    } else {
        for (i, weight) in LIMB_WEIGHTS.iter().enumerate() {
            let limb = (remaining / weight).floor();
            limbs[3 - i] = limb as u64;
            remaining -= limb * weight;
        }
    }

    let mut target = [0u8; 32];
    for (chunk, limb) in target.chunks_exact_mut(8).zip(limbs) {
        chunk.copy_from_slice(&limb.to_le_bytes());
    }
    debug!(
        "Target for difficulty {} (x{}): {}",
        diff,
        multiplier,
        hex::encode(target)
    );
    target
}

/// Whether `hash` is at or below `target`
pub fn fulltest(hash: &[u8; 32], target: &[u8; 32]) -> bool {
    U256::from_little_endian(hash) <= U256::from_little_endian(target)
}

/// Difficulty a share hash achieves for `algo`
pub fn share_diff(algo: &Algorithm, hash: &[u8; 32]) -> f64 {
    let value = le256_to_f64(hash);
    if value == 0.0 {
        return f64::INFINITY;
    }
    TRUEDIFFONE * algo.share_diff_multiplier / value
}

/// Difficulty represented by `target` for `algo`
pub fn work_difficulty(algo: &Algorithm, target: &[u8; 32]) -> f64 {
    let value = le256_to_f64(target);
    if value == 0.0 {
        return f64::INFINITY;
    }
    TRUEDIFFONE * algo.diff_multiplier2 / value
}

/// 64-bit target word the kernels compare against for `device_diff`
pub fn device_target(algo: &Algorithm, device_diff: f64) -> u64 {
    let diff = if device_diff > 0.0 { device_diff } else { 1.0 };
    (algo.diff_numerator as f64 / diff) as u64
}
