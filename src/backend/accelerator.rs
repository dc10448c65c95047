// src/backend/accelerator.rs
//! Command-queue accelerator adapter
//!
//! Binds each stage's arguments and enqueues the stage in order. The queue
//! itself is abstracted behind [`CommandQueue`] so the adapter can drive any
//! runtime that speaks in numeric status codes.

use crate::backend::{
    BackendKind, BackendStatus, ComputeBackend, KernelArg, KernelLaunch, QueueProperties,
};
use crate::utils::error::MinerError;
use log::{debug, trace, warn};

/// Device command queue
///
/// Every call returns the runtime's status code, `0` on success.
pub trait CommandQueue: Send {
    /// Makes sure the shared scratch buffer holds at least `bytes`
    fn ensure_scratch(&mut self, bytes: u64) -> i32;

    /// Binds argument `index` of kernel stage `stage`
    fn set_kernel_arg(&mut self, stage: usize, index: u32, arg: &KernelArg) -> i32;

    /// Enqueues kernel stage `stage` over `global` threads in groups of `local`
    fn enqueue_kernel(
        &mut self,
        stage: usize,
        global: u32,
        local: u32,
        properties: QueueProperties,
    ) -> i32;

    /// Copies `words` result words back from the device
    fn read_output(&mut self, words: usize) -> Result<Vec<u32>, i32>;
}

/// Backend for command-queue devices
pub struct AcceleratorBackend<Q: CommandQueue> {
    queue: Q,
}

impl<Q: CommandQueue> AcceleratorBackend<Q> {
    /// Wraps an open command queue
    pub fn new(queue: Q) -> Self {
        AcceleratorBackend { queue }
    }

    /// The wrapped queue
    pub fn queue(&self) -> &Q {
        &self.queue
    }
}

fn checked(status: i32, what: &str) -> Result<(), BackendStatus> {
    if status == 0 {
        Ok(())
    } else {
        warn!("{} failed with status {}", what, status);
        Err(BackendStatus(status))
    }
}

impl<Q: CommandQueue> AcceleratorBackend<Q> {
    fn run(&mut self, launch: &KernelLaunch<'_>) -> Result<(), BackendStatus> {
        if launch.rw_buffer_bytes > 0 {
            checked(
                self.queue.ensure_scratch(launch.rw_buffer_bytes),
                "Scratch allocation",
            )?;
        }
        for (stage, kernel) in launch.stages.iter().enumerate() {
            for (index, arg) in kernel.args.iter().enumerate() {
                checked(
                    self.queue.set_kernel_arg(stage, index as u32, arg),
                    "Setting kernel argument",
                )?;
            }
            trace!(
                "Enqueueing {} stage {} ({} threads)",
                launch.kernel, stage, launch.sizing.global_threads
            );
            checked(
                self.queue.enqueue_kernel(
                    stage,
                    launch.sizing.global_threads,
                    launch.sizing.local_threads,
                    launch.queue_properties,
                ),
                "Enqueueing kernel",
            )?;
        }
        Ok(())
    }
}

impl<Q: CommandQueue> ComputeBackend for AcceleratorBackend<Q> {
    fn kind(&self) -> BackendKind {
        BackendKind::Accelerator
    }

    fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError> {
        debug!(
            "Accelerator batch: {} with {} stage(s)",
            launch.kernel,
            launch.stages.len()
        );
        Ok(match self.run(launch) {
            Ok(()) => BackendStatus::SUCCESS,
            Err(status) => status,
        })
    }

    fn read_output(&mut self, words: usize) -> Result<Vec<u32>, MinerError> {
        self.queue.read_output(words).map_err(|status| {
            MinerError::BackendError(format!("Reading results failed with status {}", status))
        })
    }
}
