// src/miner/worker.rs
//! Worker implementation
//!
//! A worker owns a backend and a private reference to the published
//! descriptor. It turns host work into device batches and checks the
//! nonces the device reports. Descriptor switches are picked up between
//! batches, never during one.

use crate::backend::{BackendStatus, ComputeBackend, DeviceInfo};
use crate::miner::algorithm::Algorithm;
use crate::miner::difficulty::{device_target, fulltest};
use crate::miner::scheduler::{AlgorithmSwitch, Share};
use crate::miner::sizing::{Intensity, WorkSizing, found_nonces, output_buffer_words};
use crate::miner::work::{Work, WorkBlock};
use crate::utils::error::MinerError;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// Result of one submitted batch
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Device status, unchanged
    pub status: BackendStatus,
    /// First nonce of the batch
    pub start_nonce: u32,
    /// Nonces the device reported, empty unless `status` is success
    pub candidates: Vec<u32>,
}

/// Device-bound worker
///
/// Each worker processes batches for a single device and
/// reports candidate nonces back to the scheduler.
pub struct Worker<B: ComputeBackend> {
    /// Worker index, used in log lines
    id: usize,
    /// Descriptor this worker mines with
    algorithm: Arc<Algorithm>,
    /// Generation of `algorithm` in the switch it came from
    generation: u64,
    /// Device this worker drives
    backend: B,
    /// User intensity, re-evaluated on every descriptor change
    intensity: Intensity,
    /// Device parameters
    device: DeviceInfo,
    /// Batch size for the current descriptor
    sizing: WorkSizing,
}

impl<B: ComputeBackend> Worker<B> {
    /// Creates a worker bound to the switch's current descriptor
    ///
    /// # Arguments
    /// * `id` - Worker index
    /// * `switch` - Source of the descriptor
    /// * `backend` - Device to drive
    /// * `intensity` - Batch size setting
    /// * `device` - Device parameters
    pub fn new(
        id: usize,
        switch: &AlgorithmSwitch,
        backend: B,
        intensity: Intensity,
        device: DeviceInfo,
    ) -> Result<Self, MinerError> {
        let (algorithm, generation) = switch.snapshot();
        algorithm.ensure_mineable()?;
        let sizing = WorkSizing::for_algorithm(
            &algorithm,
            intensity,
            device.compute_shaders,
            device.work_size,
        )?;
        debug!(
            "Worker {} on {} backend: {} with {} threads per batch",
            id,
            backend.kind(),
            algorithm.name(),
            sizing.global_threads
        );
        Ok(Worker {
            id,
            algorithm,
            generation,
            backend,
            intensity,
            device,
            sizing,
        })
    }

    /// Descriptor this worker currently uses
    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// Batch size for the current descriptor
    pub fn sizing(&self) -> WorkSizing {
        self.sizing
    }

    /// The driven backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Picks up a newly published descriptor
    ///
    /// Returns `true` if the worker switched. The switch is all-or-nothing:
    /// if the new descriptor cannot be prepared or sized for this device
    /// the worker keeps the old one.
    pub fn sync(&mut self, switch: &AlgorithmSwitch) -> Result<bool, MinerError> {
        if switch.generation() == self.generation {
            return Ok(false);
        }
        let (algorithm, generation) = switch.snapshot();
        algorithm.ensure_mineable()?;
        let sizing = WorkSizing::for_algorithm(
            &algorithm,
            self.intensity,
            self.device.compute_shaders,
            self.device.work_size,
        )?;
        info!(
            "Worker {} switching {} -> {}",
            self.id,
            self.algorithm.name(),
            algorithm.name()
        );
        self.algorithm = algorithm;
        self.generation = generation;
        self.sizing = sizing;
        Ok(true)
    }

    /// Submits one batch of `work` starting at `start_nonce`
    ///
    /// Computes the midstate, lays the header out for the device, queues
    /// the family's kernels and reads back candidate nonces.
    pub fn process(&mut self, work: &Work, start_nonce: u32) -> Result<Batch, MinerError> {
        let algo = Arc::clone(&self.algorithm);
        let mut work = work.clone();
        work.set_nonce(algo.nonce_offset(), start_nonce)?;
        algo.calc_midstate(&mut work)?;

        let mut blk = WorkBlock {
            target: device_target(&algo, work.device_diff),
            nonce: start_nonce,
            ..WorkBlock::default()
        };
        algo.prepare_work(&mut blk, &work.midstate_words(), &work.header_words());

        let status = algo.queue_kernel(&mut self.backend, &blk, self.sizing)?;
        if !status.is_success() {
            warn!(
                "Worker {}: {} batch at nonce {} failed with status {}",
                self.id,
                algo.name(),
                start_nonce,
                status.0
            );
            return Ok(Batch {
                status,
                start_nonce,
                candidates: Vec::new(),
            });
        }

        let output = self.backend.read_output(output_buffer_words(&algo))?;
        Ok(Batch {
            status,
            start_nonce,
            candidates: found_nonces(&algo, &output),
        })
    }

    /// Checks candidate nonces on the host in parallel
    ///
    /// Candidates whose hash misses `work.target` are dropped. Families whose
    /// hash only exists on the device are forwarded unverified.
    pub fn verify_nonces(&self, work: &Work, candidates: &[u32]) -> Result<Vec<Share>, MinerError> {
        let id = self.id;
        let algo = Arc::clone(&self.algorithm);
        let offset = algo.nonce_offset();
        let checked: Vec<Result<Option<Share>, MinerError>> = candidates
            .par_iter()
            .map(|&nonce| {
                let mut trial = work.clone();
                trial.set_nonce(offset, nonce)?;
                match algo.regenhash(&mut trial) {
                    Ok(()) if fulltest(&trial.hash, &trial.target) => Ok(Some(Share {
                        job_id: trial.job_id,
                        nonce,
                        hash: Some(trial.hash),
                    })),
                    Ok(()) => {
                        debug!("Worker {}: nonce {:08x} misses target", id, nonce);
                        Ok(None)
                    }
                    Err(MinerError::KernelUnavailable { .. }) => Ok(Some(Share {
                        job_id: trial.job_id,
                        nonce,
                        hash: None,
                    })),
                    Err(e) => Err(e),
                }
            })
            .collect();
        checked
            .into_iter()
            .filter_map(Result::transpose)
            .collect()
    }
}
