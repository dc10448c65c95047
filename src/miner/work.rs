// src/miner/work.rs
//! Units of work passed through the dispatch layer
//!
//! [`Work`] is the host-side record of one block header being mined: the raw
//! header bytes, the precomputed midstate, the share target and the last
//! recomputed hash. [`WorkBlock`] is the device-facing layout a family's
//! `prepare_work` produces from it.

use crate::utils::error::MinerError;

/// Standard block header length
pub const HEADER_LEN: usize = 80;

/// A host-side unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct Work {
    /// Job identifier this work belongs to
    pub job_id: String,
    /// Raw header bytes (80 for most families, 168 for credits, 180 for decred)
    pub data: Vec<u8>,
    /// Partial hash state over the header prefix
    pub midstate: [u8; 32],
    /// Share target, 256-bit little-endian
    pub target: [u8; 32],
    /// Hash recomputed by `regenhash`
    pub hash: [u8; 32],
    /// Difficulty the device is working at
    pub device_diff: f64,
}

impl Work {
    /// Creates a work unit for the given header
    pub fn new(job_id: impl Into<String>, data: Vec<u8>) -> Self {
        Work {
            job_id: job_id.into(),
            data,
            midstate: [0u8; 32],
            target: [0xFFu8; 32],
            hash: [0u8; 32],
            device_diff: 1.0,
        }
    }

    /// Writes a little-endian nonce at `offset`
    pub fn set_nonce(&mut self, offset: usize, nonce: u32) -> Result<(), MinerError> {
        let len = self.data.len();
        let slot = offset
            .checked_add(4)
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or_else(|| {
                MinerError::InputError(format!(
                    "Header of {} bytes has no nonce at offset {}",
                    len, offset
                ))
            })?;
        slot.copy_from_slice(&nonce.to_le_bytes());
        Ok(())
    }

    /// Reads the little-endian nonce at `offset`
    pub fn nonce(&self, offset: usize) -> Option<u32> {
        let bytes = self.data.get(offset..offset.checked_add(4)?)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    /// Header as little-endian 32-bit words (trailing partial word dropped)
    pub fn header_words(&self) -> Vec<u32> {
        self.data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Midstate as little-endian 32-bit words
    pub fn midstate_words(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        for (w, c) in words.iter_mut().zip(self.midstate.chunks_exact(4)) {
            *w = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);
        }
        words
    }

    /// Top 32-bit word of the recomputed hash (bytes 28..32, little-endian)
    pub fn hash_top_word(&self) -> u32 {
        u32::from_le_bytes([self.hash[28], self.hash[29], self.hash[30], self.hash[31]])
    }
}

/// Byte-swaps every 32-bit word of `data` (trailing partial word kept as-is)
pub fn flip_words(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(4) {
        chunk.reverse();
    }
    out
}

/// Device-facing work block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkBlock {
    /// Midstate words
    pub midstate: [u32; 8],
    /// Header words the kernel still needs after the midstate
    pub data: Vec<u32>,
    /// High 64 bits of the device target
    pub target: u64,
    /// First nonce of this batch
    pub nonce: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_written_little_endian() {
        let mut work = Work::new("job", vec![0u8; HEADER_LEN]);
        work.set_nonce(76, 0x11223344).unwrap();
        assert_eq!(&work.data[76..80], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(work.nonce(76), Some(0x11223344));
    }

    #[test]
    fn nonce_outside_header_is_rejected() {
        let mut work = Work::new("job", vec![0u8; 40]);
        assert!(matches!(
            work.set_nonce(76, 1),
            Err(MinerError::InputError(_))
        ));
        assert_eq!(work.nonce(76), None);
    }

    #[test]
    fn nonce_error_reports_header_length() {
        let mut work = Work::new("job", vec![0u8; 78]);
        match work.set_nonce(76, 1) {
            Err(MinerError::InputError(msg)) => assert!(msg.contains("78 bytes")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(work.set_nonce(usize::MAX - 1, 1).is_err());
        assert_eq!(work.nonce(usize::MAX - 1), None);
    }

    #[test]
    fn flip_words_swaps_each_word() {
        assert_eq!(
            flip_words(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
            vec![4, 3, 2, 1, 8, 7, 6, 5, 9]
        );
    }

    #[test]
    fn header_words_are_little_endian() {
        let work = Work::new("job", vec![1, 0, 0, 0, 0, 0, 0, 0x80]);
        assert_eq!(work.header_words(), vec![1, 0x8000_0000]);
    }
}
