// src/backend/coprocessor.rs
//! Manycore co-processor adapter
//!
//! The batch's nonce range is split evenly across a rows x cols core grid.
//! Each core receives its own copy of the work block with its starting
//! nonce, then the whole grid is launched at once.

use crate::backend::{BackendKind, BackendStatus, ComputeBackend, KernelLaunch, KernelStage};
use crate::miner::work::WorkBlock;
use crate::utils::error::MinerError;
use log::{debug, warn};

/// Core grid of a co-processor
///
/// Write and launch calls return the device status, `0` on success.
pub trait CoreGrid: Send {
    /// Grid rows
    fn rows(&self) -> u32;

    /// Grid columns
    fn cols(&self) -> u32;

    /// Copies one core's work block and stage arguments into its local memory
    fn write_block(
        &mut self,
        row: u32,
        col: u32,
        block: &WorkBlock,
        nonces: u32,
        stages: &[KernelStage],
    ) -> i32;

    /// Starts every core and waits for completion
    fn launch(&mut self) -> i32;
}

/// Backend for manycore co-processors
pub struct CoprocessorBackend<G: CoreGrid> {
    grid: G,
}

impl<G: CoreGrid> CoprocessorBackend<G> {
    /// Wraps an opened grid
    pub fn new(grid: G) -> Self {
        CoprocessorBackend { grid }
    }

    /// The wrapped grid
    pub fn grid(&self) -> &G {
        &self.grid
    }
}

impl<G: CoreGrid> ComputeBackend for CoprocessorBackend<G> {
    fn kind(&self) -> BackendKind {
        BackendKind::Coprocessor
    }

    fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let cores = rows.checked_mul(cols).ok_or_else(|| {
            MinerError::BackendError(format!("Core grid {}x{} is too large", rows, cols))
        })?;
        if cores == 0 {
            return Err(MinerError::BackendError("Core grid has no cores".to_string()));
        }
        let per_core = launch.sizing.global_threads.div_ceil(cores);
        debug!(
            "Co-processor batch: {} over {}x{} cores, {} nonces each",
            launch.kernel, rows, cols, per_core
        );

        let mut block = launch.block.clone();
        for row in 0..rows {
            for col in 0..cols {
                let core = row * cols + col;
                block.nonce = launch.block.nonce.wrapping_add(core.wrapping_mul(per_core));
                let status = self
                    .grid
                    .write_block(row, col, &block, per_core, &launch.stages);
                if status != 0 {
                    warn!("Writing core ({}, {}) failed with status {}", row, col, status);
                    return Ok(BackendStatus(status));
                }
            }
        }
        Ok(BackendStatus(self.grid.launch()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::QueueProperties;
    use crate::miner::sizing::WorkSizing;

    struct FakeGrid {
        rows: u32,
        cols: u32,
        writes: Vec<(u32, u32, u32, u32)>,
        launch_status: i32,
    }

    impl FakeGrid {
        fn new(rows: u32, cols: u32, launch_status: i32) -> Self {
            FakeGrid {
                rows,
                cols,
                writes: Vec::new(),
                launch_status,
            }
        }
    }

    impl CoreGrid for FakeGrid {
        fn rows(&self) -> u32 {
            self.rows
        }

        fn cols(&self) -> u32 {
            self.cols
        }

        fn write_block(
            &mut self,
            row: u32,
            col: u32,
            block: &WorkBlock,
            nonces: u32,
            _stages: &[KernelStage],
        ) -> i32 {
            self.writes.push((row, col, block.nonce, nonces));
            0
        }

        fn launch(&mut self) -> i32 {
            self.launch_status
        }
    }

    fn launch(block: &WorkBlock, threads: u32) -> KernelLaunch<'_> {
        KernelLaunch {
            kernel: "scrypt",
            stages: vec![KernelStage::default()],
            block,
            sizing: WorkSizing {
                global_threads: threads,
                local_threads: 1,
            },
            rw_buffer_bytes: 0,
            queue_properties: QueueProperties::NONE,
        }
    }

    #[test]
    fn nonce_range_is_split_across_cores() {
        let block = WorkBlock {
            nonce: 1000,
            ..WorkBlock::default()
        };
        let mut backend = CoprocessorBackend::new(FakeGrid::new(2, 2, 0));
        let status = backend.submit(&launch(&block, 1024)).unwrap();
        assert!(status.is_success());
        assert_eq!(
            backend.grid().writes,
            vec![
                (0, 0, 1000, 256),
                (0, 1, 1256, 256),
                (1, 0, 1512, 256),
                (1, 1, 1768, 256)
            ]
        );
    }

    #[test]
    fn launch_status_is_returned_unchanged() {
        let block = WorkBlock::default();
        let mut backend = CoprocessorBackend::new(FakeGrid::new(1, 4, 7));
        assert_eq!(backend.submit(&launch(&block, 10)).unwrap(), BackendStatus(7));
        assert_eq!(backend.grid().writes[0].3, 3);
    }

    #[test]
    fn empty_grid_is_a_transport_error() {
        let block = WorkBlock::default();
        let mut backend = CoprocessorBackend::new(FakeGrid::new(0, 4, 0));
        assert!(matches!(
            backend.submit(&launch(&block, 10)),
            Err(MinerError::BackendError(_))
        ));
    }

    #[test]
    fn oversized_grid_is_a_transport_error() {
        let block = WorkBlock::default();
        let mut backend = CoprocessorBackend::new(FakeGrid::new(1 << 16, 1 << 16, 0));
        assert!(matches!(
            backend.submit(&launch(&block, 10)),
            Err(MinerError::BackendError(_))
        ));
        assert!(backend.grid().writes.is_empty());
    }
}
