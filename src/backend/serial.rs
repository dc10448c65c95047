// src/backend/serial.rs
//! Serial-link device adapter
//!
//! Frame layout, little-endian throughout:
//!
//! ```text
//! 0x55 0xAA | len: u16 | midstate: 8 x u32 | target: u64 | nonce: u32
//!           | threads: u32 | words: u16 | data: words x u32
//! ```
//!
//! `len` counts the bytes after itself. The device answers with a single
//! signed status byte.

use crate::backend::{BackendKind, BackendStatus, ComputeBackend, KernelLaunch};
use crate::miner::work::WorkBlock;
use crate::utils::error::MinerError;
use log::{debug, trace};
use std::io::{Read, Write};

/// Frame preamble
pub const PREAMBLE: [u8; 2] = [0x55, 0xAA];

/// Backend for boards reached over a byte stream
pub struct SerialBackend<L: Read + Write + Send> {
    link: L,
}

impl<L: Read + Write + Send> SerialBackend<L> {
    /// Wraps an opened link
    pub fn new(link: L) -> Self {
        SerialBackend { link }
    }

    /// The wrapped link
    pub fn link(&self) -> &L {
        &self.link
    }
}

/// Encodes one work frame
pub fn encode_frame(block: &WorkBlock, threads: u32) -> Result<Vec<u8>, MinerError> {
    let words = u16::try_from(block.data.len())
        .map_err(|_| MinerError::BackendError(format!("{} data words do not fit a frame", block.data.len())))?;
    let payload_len = 32 + 8 + 4 + 4 + 2 + 4 * block.data.len();
    let len = u16::try_from(payload_len)
        .map_err(|_| MinerError::BackendError(format!("Frame payload of {} bytes is too long", payload_len)))?;

    let mut frame = Vec::with_capacity(4 + payload_len);
    frame.extend_from_slice(&PREAMBLE);
    frame.extend_from_slice(&len.to_le_bytes());
    for word in block.midstate {
        frame.extend_from_slice(&word.to_le_bytes());
    }
    frame.extend_from_slice(&block.target.to_le_bytes());
    frame.extend_from_slice(&block.nonce.to_le_bytes());
    frame.extend_from_slice(&threads.to_le_bytes());
    frame.extend_from_slice(&words.to_le_bytes());
    for word in &block.data {
        frame.extend_from_slice(&word.to_le_bytes());
    }
    Ok(frame)
}

impl<L: Read + Write + Send> ComputeBackend for SerialBackend<L> {
    fn kind(&self) -> BackendKind {
        BackendKind::Serial
    }

    fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError> {
        let frame = encode_frame(launch.block, launch.sizing.global_threads)?;
        debug!("Serial batch: {} ({} byte frame)", launch.kernel, frame.len());
        trace!("Frame: {}", hex::encode(&frame));

        self.link.write_all(&frame)?;
        self.link.flush()?;

        let mut status = [0u8; 1];
        self.link.read_exact(&mut status)?;
        Ok(BackendStatus(i8::from_le_bytes(status) as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::QueueProperties;
    use crate::miner::sizing::WorkSizing;
    use std::io::Cursor;

    struct FakeLink {
        written: Vec<u8>,
        reply: Cursor<Vec<u8>>,
    }

    impl Read for FakeLink {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reply.read(buf)
        }
    }

    impl Write for FakeLink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn launch(block: &WorkBlock) -> KernelLaunch<'_> {
        KernelLaunch {
            kernel: "sia",
            stages: Vec::new(),
            block,
            sizing: WorkSizing {
                global_threads: 0x100,
                local_threads: 0x100,
            },
            rw_buffer_bytes: 0,
            queue_properties: QueueProperties::NONE,
        }
    }

    #[test]
    fn frame_layout() {
        let block = WorkBlock {
            midstate: [1; 8],
            data: vec![0xAABBCCDD],
            target: 2,
            nonce: 3,
        };
        let frame = encode_frame(&block, 0x100).unwrap();
        assert_eq!(&frame[..2], &PREAMBLE);
        assert_eq!(u16::from_le_bytes([frame[2], frame[3]]) as usize, frame.len() - 4);
        assert_eq!(&frame[4..8], &[1, 0, 0, 0]);
        assert_eq!(&frame[36..44], &2u64.to_le_bytes());
        assert_eq!(&frame[44..48], &3u32.to_le_bytes());
        assert_eq!(&frame[48..52], &0x100u32.to_le_bytes());
        assert_eq!(&frame[52..54], &[1, 0]);
        assert_eq!(&frame[54..], &[0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn device_status_is_returned_unchanged() {
        let block = WorkBlock::default();
        let link = FakeLink {
            written: Vec::new(),
            reply: Cursor::new(vec![0xFE]),
        };
        let mut backend = SerialBackend::new(link);
        assert_eq!(backend.submit(&launch(&block)).unwrap(), BackendStatus(-2));
        assert_eq!(&backend.link().written[..2], &PREAMBLE);
    }

    #[test]
    fn silent_device_is_an_io_error() {
        let block = WorkBlock::default();
        let link = FakeLink {
            written: Vec::new(),
            reply: Cursor::new(Vec::new()),
        };
        let mut backend = SerialBackend::new(link);
        assert!(matches!(
            backend.submit(&launch(&block)),
            Err(MinerError::IoError(_))
        ));
    }
}
