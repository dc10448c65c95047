// src/miner/sizing.rs
//! Work sizing
//!
//! Turns a user intensity setting and the descriptor's shift hints into the
//! number of device threads per batch, and reads found nonces back out of
//! the result buffer using the descriptor's `found_idx`.

use crate::miner::algorithm::Algorithm;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};

/// How much work to generate per batch
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// `1 << (intensity_shift + n)` threads
    Standard(i32),
    /// Scaled by the device's shader count
    Extended(u32),
    /// Explicit thread count
    Raw(u32),
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Standard(8)
    }
}

/// Thread counts for one batch
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSizing {
    /// Total threads (always a multiple of `local_threads`)
    pub global_threads: u32,
    /// Threads per work group
    pub local_threads: u32,
}

impl WorkSizing {
    /// Computes the batch size for `algo` on a device
    ///
    /// # Arguments
    /// * `algo` - Descriptor providing the intensity shifts
    /// * `intensity` - User setting
    /// * `compute_shaders` - Shader count, used by extended intensity
    /// * `work_size` - Local work size; global threads round up to it
    pub fn for_algorithm(
        algo: &Algorithm,
        intensity: Intensity,
        compute_shaders: u32,
        work_size: u32,
    ) -> Result<Self, MinerError> {
        let local = work_size.max(1);
        let threads = match intensity {
            Intensity::Raw(threads) => threads,
            Intensity::Extended(x) => {
                let per_shader = if algo.xintensity_shift == 0 {
                    x
                } else {
                    shifted(algo.xintensity_shift as i64 + x as i64)?
                };
                compute_shaders.checked_mul(per_shader).ok_or_else(|| {
                    MinerError::InputError(format!("xintensity {} overflows thread count", x))
                })?
            }
            Intensity::Standard(n) => shifted(algo.intensity_shift as i64 + n as i64)?,
        };

        if threads == 0 {
            return Err(MinerError::InputError(
                "Intensity yields zero threads".to_string(),
            ));
        }

        let global_threads = threads
            .div_ceil(local)
            .checked_mul(local)
            .ok_or_else(|| MinerError::InputError("Thread count overflows".to_string()))?;

        Ok(WorkSizing {
            global_threads,
            local_threads: local,
        })
    }
}

fn shifted(shift: i64) -> Result<u32, MinerError> {
    if !(0..32).contains(&shift) {
        return Err(MinerError::InputError(format!(
            "Intensity shift {} outside 0..32",
            shift
        )));
    }
    Ok(1u32 << shift)
}

/// Number of 32-bit words in the kernel's result buffer
pub fn output_buffer_words(algo: &Algorithm) -> usize {
    algo.found_idx as usize + 1
}

/// Nonces reported in a result buffer
///
/// `output[found_idx]` holds the count; the nonces occupy the slots before
/// it. A count larger than the available slots is clamped.
pub fn found_nonces(algo: &Algorithm, output: &[u32]) -> Vec<u32> {
    let idx = algo.found_idx as usize;
    let Some(&count) = output.get(idx) else {
        return Vec::new();
    };
    let count = (count as usize).min(idx);
    output[..count].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_intensity_uses_intensity_shift() {
        let algo = Algorithm::new("scrypt");
        let sizing = WorkSizing::for_algorithm(&algo, Intensity::Standard(13), 2048, 256).unwrap();
        assert_eq!(sizing.global_threads, 1 << 13);

        let keccak = Algorithm::new("maxcoin");
        let sizing = WorkSizing::for_algorithm(&keccak, Intensity::Standard(5), 2048, 256).unwrap();
        assert_eq!(sizing.global_threads, 1 << 20);
    }

    #[test]
    fn extended_intensity_scales_with_shaders() {
        let algo = Algorithm::new("darkcoin-mod");
        let sizing = WorkSizing::for_algorithm(&algo, Intensity::Extended(3), 2048, 256).unwrap();
        assert_eq!(sizing.global_threads, 3 * 2048);

        let keccak = Algorithm::new("keccak");
        let sizing = WorkSizing::for_algorithm(&keccak, Intensity::Extended(1), 64, 64).unwrap();
        assert_eq!(sizing.global_threads, 64 * (1 << 5));
    }

    #[test]
    fn raw_intensity_rounds_up_to_work_size() {
        let algo = Algorithm::new("sia");
        let sizing = WorkSizing::for_algorithm(&algo, Intensity::Raw(1000), 0, 256).unwrap();
        assert_eq!(sizing.global_threads, 1024);
        assert_eq!(sizing.local_threads, 256);
    }

    #[test]
    fn overflowing_intensity_is_rejected() {
        let keccak = Algorithm::new("maxcoin");
        assert!(WorkSizing::for_algorithm(&keccak, Intensity::Standard(20), 0, 1).is_err());
        let algo = Algorithm::new("scrypt");
        assert!(WorkSizing::for_algorithm(&algo, Intensity::Standard(-1), 0, 1).is_err());
        assert!(WorkSizing::for_algorithm(&algo, Intensity::Raw(0), 0, 1).is_err());
    }

    #[test]
    fn found_nonces_reads_count_slot() {
        let algo = Algorithm::new("maxcoin");
        assert_eq!(output_buffer_words(&algo), 16);

        let mut output = vec![0u32; output_buffer_words(&algo)];
        output[0] = 0xdead;
        output[1] = 0xbeef;
        output[15] = 2;
        assert_eq!(found_nonces(&algo, &output), vec![0xdead, 0xbeef]);

        output[15] = 99;
        assert_eq!(found_nonces(&algo, &output).len(), 15);
        assert!(found_nonces(&algo, &output[..4]).is_empty());
    }
}
