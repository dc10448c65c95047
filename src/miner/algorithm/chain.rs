// src/miner/algorithm/chain.rs
//! Multi-round hash-chain families
//!
//! X11, X13, X14, X15, Quark, NIST5, Fresh, Twecoin, Whirlpool, Lyra2RE,
//! Lyra2REv2 and LBRY. Each round is a separate hash function; "mod" kernels
//! split the rounds into chained stages that hand intermediate hashes to
//! each other through the scratch buffer.

use crate::backend::{CompileOptions, DeviceInfo, KernelArg, KernelStage};
use crate::miner::algorithm::digest::{self, MerkleHash};
use crate::miner::algorithm::{Algorithm, AlgorithmOps, CompileStyle, chained_stages};
use crate::miner::work::{Work, WorkBlock};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;

/// Capability set for one hash-chain family
pub struct ChainOps {
    algorithm_type: AlgorithmType,
    merkle: MerkleHash,
    style: CompileStyle,
    /// Lyra2 kernels start from a BLAKE-256 midstate instead of SHA-256
    blake_midstate: bool,
}

impl ChainOps {
    /// Chain family with SHA-256 midstate
    pub fn new(algorithm_type: AlgorithmType, merkle: MerkleHash, style: CompileStyle) -> Self {
        ChainOps {
            algorithm_type,
            merkle,
            style,
            blake_midstate: false,
        }
    }

    /// Chain family whose midstate is BLAKE-256
    pub fn with_blake_midstate(mut self) -> Self {
        self.blake_midstate = true;
        self
    }
}

impl AlgorithmOps for ChainOps {
    fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    fn regenhash(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(MinerError::unavailable(algo.name().as_str(), "regenhash"))
    }

    fn calc_midstate(&self, algo: &Algorithm, work: &mut Work) -> Result<(), MinerError> {
        if self.blake_midstate {
            return Err(MinerError::unavailable(algo.name().as_str(), "calc_midstate"));
        }
        work.midstate = digest::sha256_midstate(&work.data)?;
        Ok(())
    }

    fn host_midstate(&self) -> bool {
        !self.blake_midstate
    }

    fn kernel_stages(&self, algo: &Algorithm, blk: &WorkBlock) -> Vec<KernelStage> {
        let mut primary = Vec::with_capacity(2);
        if self.blake_midstate {
            primary.push(KernelArg::Words(blk.midstate.to_vec()));
        }
        primary.push(KernelArg::Words(blk.data.clone()));
        chained_stages(primary, algo.n_extra_kernels, blk.target)
    }

    fn gen_hash(&self, _algo: &Algorithm, data: &[u8]) -> Result<[u8; 32], MinerError> {
        Ok(self.merkle.compute(data))
    }

    fn set_compile_options(&self, opts: &mut CompileOptions, device: &DeviceInfo, algo: &Algorithm) {
        self.style.apply(opts, device, algo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BufferRole;

    #[test]
    fn mod_kernels_chain_through_scratch() {
        let algo = Algorithm::new("x15");
        assert_eq!(algo.n_extra_kernels, 14);

        let blk = WorkBlock {
            data: vec![1, 2, 3],
            target: 42,
            ..WorkBlock::default()
        };
        let stages = algo.ops().kernel_stages(&algo, &blk);
        assert_eq!(stages.len(), 15);
        assert_eq!(
            stages[0].args,
            vec![
                KernelArg::Words(vec![1, 2, 3]),
                KernelArg::Buffer(BufferRole::Scratch)
            ]
        );
        assert_eq!(
            stages[14].args,
            vec![
                KernelArg::Buffer(BufferRole::Scratch),
                KernelArg::Buffer(BufferRole::Output),
                KernelArg::U64(42)
            ]
        );
    }

    #[test]
    fn single_kernel_writes_output_directly() {
        let algo = Algorithm::new("quarkcoin");
        let stages = algo.ops().kernel_stages(&algo, &WorkBlock::default());
        assert_eq!(stages.len(), 1);
        assert!(stages[0].args.contains(&KernelArg::Buffer(BufferRole::Output)));
    }

    #[test]
    fn lyra2_midstate_is_external() {
        let algo = Algorithm::new("lyra2v2");
        let mut work = Work::new("job", vec![0u8; 80]);
        assert!(matches!(
            algo.calc_midstate(&mut work),
            Err(MinerError::KernelUnavailable { operation: "calc_midstate", .. })
        ));

        let x11 = Algorithm::new("x11");
        assert!(x11.calc_midstate(&mut work).is_ok());
    }

    #[test]
    fn x13_options_include_hamsi() {
        let algo = Algorithm::new("x13");
        let opts = algo.compile_options(&DeviceInfo::default());
        assert!(opts.compiler_options.contains("SPH_HAMSI_EXPAND_BIG"));
    }

    #[test]
    fn whirlcoin_merkle_is_single_sha256() {
        let algo = Algorithm::new("whirlpool");
        assert_eq!(algo.gen_hash(b"abc").unwrap(), digest::sha256(b"abc"));
    }
}
