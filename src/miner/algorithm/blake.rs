// src/miner/algorithm/blake.rs
//! BLAKE-256 families: Blakecoin (8 rounds), Vanilla (8 rounds), BLAKE
//! (14 rounds) and Decred (14 rounds over a 180-byte header).

use crate::backend::{BufferRole, CompileOptions, DeviceInfo, KernelArg, KernelStage};
use crate::miner::algorithm::digest::MerkleHash;
use crate::miner::algorithm::{Algorithm, AlgorithmOps, CompileStyle};
use crate::miner::work::{Work, WorkBlock};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;

/// Decred header length
pub const DECRED_HEADER_LEN: usize = 180;

/// Decred nonce position
pub const DECRED_NONCE_OFFSET: usize = 140;

/// Words covered by the Decred midstate (first 128 bytes)
const DECRED_MIDSTATE_WORDS: usize = 32;

/// Words of the Decred header tail the kernel needs after the midstate
const DECRED_TAIL_WORDS: usize = 13;

/// Capability set for one BLAKE-256 family
pub struct BlakeOps {
    algorithm_type: AlgorithmType,
    merkle: MerkleHash,
    style: CompileStyle,
}

impl BlakeOps {
    /// BLAKE family with the given merkle hash and build flags
    pub fn new(algorithm_type: AlgorithmType, merkle: MerkleHash, style: CompileStyle) -> Self {
        BlakeOps {
            algorithm_type,
            merkle,
            style,
        }
    }

    fn is_decred(&self) -> bool {
        self.algorithm_type == AlgorithmType::Decred
    }
}

impl AlgorithmOps for BlakeOps {
    fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    fn nonce_offset(&self) -> usize {
        if self.is_decred() {
            DECRED_NONCE_OFFSET
        } else {
            super::DEFAULT_NONCE_OFFSET
        }
    }

    fn regenhash(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(MinerError::unavailable(algo.name().as_str(), "regenhash"))
    }

    fn calc_midstate(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(MinerError::unavailable(algo.name().as_str(), "calc_midstate"))
    }

    fn host_midstate(&self) -> bool {
        false
    }

    fn prepare_work(&self, blk: &mut WorkBlock, midstate: &[u32; 8], data: &[u32]) {
        blk.midstate = *midstate;
        blk.data = if self.is_decred() {
            data.iter()
                .skip(DECRED_MIDSTATE_WORDS)
                .take(DECRED_TAIL_WORDS)
                .copied()
                .collect()
        } else {
            // 8-round and 14-round kernels only need the last 16 bytes
            data.iter().skip(16).take(4).copied().collect()
        };
    }

    fn kernel_stages(&self, _algo: &Algorithm, blk: &WorkBlock) -> Vec<KernelStage> {
        vec![KernelStage::new(vec![
            KernelArg::Words(blk.midstate.to_vec()),
            KernelArg::Words(blk.data.clone()),
            KernelArg::Buffer(BufferRole::Output),
            KernelArg::U64(blk.target),
        ])]
    }

    fn gen_hash(&self, _algo: &Algorithm, data: &[u8]) -> Result<[u8; 32], MinerError> {
        Ok(self.merkle.compute(data))
    }

    fn set_compile_options(&self, opts: &mut CompileOptions, device: &DeviceInfo, algo: &Algorithm) {
        self.style.apply(opts, device, algo);
    }
}
