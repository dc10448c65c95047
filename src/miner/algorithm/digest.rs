// src/miner/algorithm/digest.rs
//! Hash primitives used by the family implementations
//!
//! Only the generic building blocks live here (SHA-256, Keccak-256,
//! BLAKE2b-256 and the SHA-256 midstate). Family-specific chains are
//! provided by the device kernels, not by this crate.

use crate::miner::work::flip_words;
use crate::utils::error::MinerError;
use blake2::Blake2b;
use blake2::digest::consts::U32;
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;

const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Single SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Keccak-256 (pre-standard padding)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// BLAKE2b with a 256-bit output
pub fn blake2b256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// SHA-256 state after compressing the first 64 bytes of `header`
///
/// The header is word-swapped first, matching how the kernels consume it.
/// State words are returned little-endian.
pub fn sha256_midstate(header: &[u8]) -> Result<[u8; 32], MinerError> {
    if header.len() < 64 {
        return Err(MinerError::InputError(format!(
            "Midstate needs 64 header bytes, got {}",
            header.len()
        )));
    }
    let block = flip_words(&header[..64]);
    let mut state = SHA256_IV;
    sha2::compress256(&mut state, &[GenericArray::clone_from_slice(&block)]);

    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    Ok(out)
}

/// Which hash a family uses for `gen_hash`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MerkleHash {
    /// SHA-256 applied twice
    Sha256d,
    /// SHA-256 applied once
    Sha256,
    /// BLAKE2b-256
    Blake2b256,
}

impl MerkleHash {
    /// Hashes `data`
    pub fn compute(self, data: &[u8]) -> [u8; 32] {
        match self {
            MerkleHash::Sha256d => sha256d(data),
            MerkleHash::Sha256 => sha256(data),
            MerkleHash::Blake2b256 => blake2b256(data),
        }
    }
}
