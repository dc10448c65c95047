// src/miner/algorithm/memory_hard.rs
//! Memory-hard families
//!
//! Scrypt, N-scrypt, NeoScrypt, Pluck and Yescrypt. Their scratch memory
//! grows with `N`, so the descriptor's read/write buffer is refreshed
//! whenever the N-factor changes. The hash bodies themselves run on the
//! device.

use crate::backend::{BufferRole, CompileOptions, DeviceInfo, KernelArg, KernelStage};
use crate::miner::algorithm::digest::MerkleHash;
use crate::miner::algorithm::{Algorithm, AlgorithmOps, CompileStyle};
use crate::miner::work::{Work, WorkBlock};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;

/// Capability set for one memory-hard family
pub struct MemoryHardOps {
    algorithm_type: AlgorithmType,
    /// Bytes of scratch per unit of N (128 * r)
    block_bytes: u64,
    style: CompileStyle,
}

impl MemoryHardOps {
    /// # Arguments
    /// * `algorithm_type` - Identity served
    /// * `block_bytes` - Scratch bytes per unit of N
    /// * `style` - Kernel build flags
    pub fn new(algorithm_type: AlgorithmType, block_bytes: u64, style: CompileStyle) -> Self {
        MemoryHardOps {
            algorithm_type,
            block_bytes,
            style,
        }
    }
}

impl AlgorithmOps for MemoryHardOps {
    fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    fn regenhash(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(MinerError::unavailable(algo.name().as_str(), "regenhash"))
    }

    fn kernel_stages(&self, algo: &Algorithm, blk: &WorkBlock) -> Vec<KernelStage> {
        let mut primary = vec![
            KernelArg::Words(blk.data.clone()),
            KernelArg::Buffer(BufferRole::Output),
            KernelArg::Buffer(BufferRole::Scratch),
            KernelArg::Words(blk.midstate.to_vec()),
            KernelArg::U32((blk.target >> 32) as u32),
        ];
        // N is a compile-time constant for plain scrypt kernels
        if self.algorithm_type == AlgorithmType::NScrypt {
            primary.push(KernelArg::U32(algo.n()));
        }

        let mut stages = vec![KernelStage::new(primary)];
        for _ in 0..algo.n_extra_kernels {
            stages.push(KernelStage::new(vec![
                KernelArg::Buffer(BufferRole::Scratch),
                KernelArg::Buffer(BufferRole::Output),
            ]));
        }
        stages
    }

    fn gen_hash(&self, _algo: &Algorithm, data: &[u8]) -> Result<[u8; 32], MinerError> {
        Ok(MerkleHash::Sha256d.compute(data))
    }

    fn set_compile_options(&self, opts: &mut CompileOptions, device: &DeviceInfo, algo: &Algorithm) {
        self.style.apply(opts, device, algo);
    }

    fn scratch_bytes_per_thread(&self, n: u32) -> Option<u64> {
        Some(self.block_bytes * n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::RwBuffer;

    #[test]
    fn scratch_scales_with_n() {
        let ops = MemoryHardOps::new(AlgorithmType::Yescrypt, 1024, CompileStyle::NeoScrypt);
        assert_eq!(ops.scratch_bytes_per_thread(2048), Some(2 * 1024 * 1024));
    }

    #[test]
    fn nscrypt_passes_n_to_the_kernel() {
        let algo = Algorithm::new("nscrypt");
        let blk = WorkBlock {
            target: 0x0000_ffff_0000_0000,
            ..WorkBlock::default()
        };
        let stages = algo.ops().kernel_stages(&algo, &blk);
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].args.last(), Some(&KernelArg::U32(2048)));
        assert!(stages[0].args.contains(&KernelArg::U32(0xffff)));

        let scrypt = Algorithm::new("scrypt");
        let stages = scrypt.ops().kernel_stages(&scrypt, &blk);
        assert_eq!(stages[0].args.last(), Some(&KernelArg::U32(0xffff)));
    }

    #[test]
    fn neoscrypt_buffer_tracks_nfactor() {
        let mut algo = Algorithm::new("neoscrypt");
        algo.set_nfactor(7).unwrap();
        assert_eq!(algo.rw_buffer_size, RwBuffer::PerThread(256 * 128));
    }

    #[test]
    fn hash_body_is_external() {
        let algo = Algorithm::new("yescrypt");
        let mut work = Work::new("job", vec![0u8; 80]);
        assert!(matches!(
            algo.regenhash(&mut work),
            Err(MinerError::KernelUnavailable { operation: "regenhash", .. })
        ));
        assert!(algo.gen_hash(b"coinbase").is_ok());
        assert!(algo.calc_midstate(&mut work).is_ok());
    }
}
