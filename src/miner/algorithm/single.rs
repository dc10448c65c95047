// src/miner/algorithm/single.rs
//! Single-pass hash families
//!
//! Keccak (maxcoin), Sia, Credits, the Fugue/Groestl family and WhirlpoolX.
//! Keccak, Sia and Credits use hash functions available in-process, so
//! their `regenhash` recomputes the share hash on the host.

use crate::backend::{KernelArg, KernelStage};
use crate::miner::algorithm::digest::{self, MerkleHash};
use crate::miner::algorithm::{Algorithm, AlgorithmOps, chained_stages};
use crate::miner::work::{Work, WorkBlock, flip_words};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;

/// Proof-of-work hash of a single-pass family
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowHash {
    /// Keccak-256 over the word-swapped header
    Keccak256,
    /// BLAKE2b-256 over the raw header
    Blake2b256,
    /// Double SHA-256 over the word-swapped header
    Sha256d,
    /// Only available on the device
    External,
}

/// Header layout of a single-pass family
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Bytes hashed by `regenhash`
    pub len: usize,
    /// Nonce position
    pub nonce_offset: usize,
}

impl HeaderLayout {
    /// 80-byte header, nonce in the last word
    pub const STANDARD: HeaderLayout = HeaderLayout {
        len: 80,
        nonce_offset: 76,
    };
    /// Sia: nonce follows the 32-byte parent id
    pub const SIA: HeaderLayout = HeaderLayout {
        len: 80,
        nonce_offset: 32,
    };
    /// Credits: 168-byte header, nonce in the last word
    pub const CREDITS: HeaderLayout = HeaderLayout {
        len: 168,
        nonce_offset: 164,
    };
}

/// Capability set for one single-pass family
pub struct SingleOps {
    algorithm_type: AlgorithmType,
    pow: PowHash,
    merkle: MerkleHash,
    layout: HeaderLayout,
}

impl SingleOps {
    /// # Arguments
    /// * `algorithm_type` - Identity served
    /// * `pow` - Share hash
    /// * `merkle` - Hash used by `gen_hash`
    /// * `layout` - Header length and nonce position
    pub fn new(
        algorithm_type: AlgorithmType,
        pow: PowHash,
        merkle: MerkleHash,
        layout: HeaderLayout,
    ) -> Self {
        SingleOps {
            algorithm_type,
            pow,
            merkle,
            layout,
        }
    }
}

impl AlgorithmOps for SingleOps {
    fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    fn nonce_offset(&self) -> usize {
        self.layout.nonce_offset
    }

    fn regenhash(&self, algo: &Algorithm, work: &mut Work) -> Result<(), MinerError> {
        let hash: fn(&[u8]) -> [u8; 32] = match self.pow {
            PowHash::Keccak256 => |h| digest::keccak256(&flip_words(h)),
            PowHash::Blake2b256 => digest::blake2b256,
            PowHash::Sha256d => |h| digest::sha256d(&flip_words(h)),
            PowHash::External => {
                return Err(MinerError::unavailable(algo.name().as_str(), "regenhash"));
            }
        };
        let header = work.data.get(..self.layout.len).ok_or_else(|| {
            MinerError::InputError(format!(
                "{} needs a {}-byte header, got {}",
                algo.name(),
                self.layout.len,
                work.data.len()
            ))
        })?;

        work.hash = hash(header);
        Ok(())
    }

    fn calc_midstate(&self, _algo: &Algorithm, work: &mut Work) -> Result<(), MinerError> {
        // BLAKE2b kernels hash the whole header per nonce
        if self.pow == PowHash::Blake2b256 {
            return Ok(());
        }
        work.midstate = digest::sha256_midstate(&work.data)?;
        Ok(())
    }

    fn kernel_stages(&self, algo: &Algorithm, blk: &WorkBlock) -> Vec<KernelStage> {
        let mut primary = Vec::with_capacity(2);
        if self.pow == PowHash::Keccak256 {
            primary.push(KernelArg::Words(blk.midstate.to_vec()));
        }
        primary.push(KernelArg::Words(blk.data.clone()));
        chained_stages(primary, algo.n_extra_kernels, blk.target)
    }

    fn gen_hash(&self, _algo: &Algorithm, data: &[u8]) -> Result<[u8; 32], MinerError> {
        Ok(self.merkle.compute(data))
    }
}
