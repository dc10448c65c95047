// src/backend/mod.rs
//! Compute backends
//!
//! A family's `queue_kernel` slot describes one batch of device work as a
//! [`KernelLaunch`]; a [`ComputeBackend`] turns that description into
//! whatever its hardware needs. Three adapters exist:
//! - [`accelerator`]: command-queue devices (OpenCL-style)
//! - [`coprocessor`]: manycore grids addressed per core
//! - [`serial`]: external boards reached over a serial link
//!
//! Exactly one of them is the build's active ABI, chosen with the
//! `accelerator`, `coprocessor` or `serial` Cargo feature. `accelerator` is
//! on by default, so the others need `--no-default-features`, e.g.
//! `cargo build --no-default-features --features serial`.

#[cfg(any(
    all(feature = "accelerator", feature = "coprocessor"),
    all(feature = "accelerator", feature = "serial"),
    all(feature = "coprocessor", feature = "serial"),
))]
compile_error!(
    "enable only one of the `accelerator`, `coprocessor` and `serial` features \
     (use --no-default-features to drop the default accelerator)"
);

#[cfg(not(any(feature = "accelerator", feature = "coprocessor", feature = "serial")))]
compile_error!("enable one of the `accelerator`, `coprocessor` or `serial` features");

/// Command-queue accelerator adapter
pub mod accelerator;

/// Manycore co-processor adapter
pub mod coprocessor;

/// Serial-link device adapter
pub mod serial;

pub use accelerator::{AcceleratorBackend, CommandQueue};
pub use coprocessor::{CoprocessorBackend, CoreGrid};
pub use serial::SerialBackend;

use crate::miner::sizing::WorkSizing;
use crate::miner::work::WorkBlock;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backend ABI a build targets
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Accelerator with command queues
    Accelerator,
    /// Manycore co-processor
    Coprocessor,
    /// External device over a serial link
    Serial,
}

impl BackendKind {
    /// The backend selected at build time
    pub const fn active() -> Self {
        if cfg!(feature = "coprocessor") {
            BackendKind::Coprocessor
        } else if cfg!(feature = "serial") {
            BackendKind::Serial
        } else {
            BackendKind::Accelerator
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Accelerator => write!(f, "accelerator"),
            BackendKind::Coprocessor => write!(f, "coprocessor"),
            BackendKind::Serial => write!(f, "serial"),
        }
    }
}

/// Command-queue configuration flags
///
/// Only the accelerator interprets these; other backends see
/// [`QueueProperties::NONE`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueProperties(pub u64);

impl QueueProperties {
    /// No flags
    pub const NONE: QueueProperties = QueueProperties(0);
    /// Allow the device to reorder queued commands
    pub const OUT_OF_ORDER_EXEC_MODE_ENABLE: QueueProperties = QueueProperties(1 << 0);
    /// Record profiling timestamps
    pub const PROFILING_ENABLE: QueueProperties = QueueProperties(1 << 1);

    /// Whether every flag in `other` is set
    pub fn contains(self, other: QueueProperties) -> bool {
        self.0 & other.0 == other.0
    }

    /// The properties a descriptor carries under the active backend
    pub fn for_active_backend(self) -> QueueProperties {
        match BackendKind::active() {
            BackendKind::Accelerator => self,
            _ => QueueProperties::NONE,
        }
    }
}

/// Opaque device status code
///
/// Zero means success on every backend; anything else is passed back to
/// the caller untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendStatus(pub i32);

impl BackendStatus {
    /// Successful submission
    pub const SUCCESS: BackendStatus = BackendStatus(0);

    /// Whether the device accepted the batch
    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// Buffers a kernel argument can refer to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferRole {
    /// Nonce result buffer
    Output,
    /// Read/write scratch buffer between stages
    Scratch,
    /// Header/midstate input buffer
    Input,
}

/// One kernel argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelArg {
    /// 32-bit scalar
    U32(u32),
    /// 64-bit scalar
    U64(u64),
    /// Inline vector of words
    Words(Vec<u32>),
    /// Device buffer binding
    Buffer(BufferRole),
}

/// Arguments for one kernel stage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KernelStage {
    /// Arguments in positional order
    pub args: Vec<KernelArg>,
}

impl KernelStage {
    /// Stage with the given arguments
    pub fn new(args: Vec<KernelArg>) -> Self {
        KernelStage { args }
    }
}

/// One batch of work as handed to a backend
#[derive(Clone, Debug, PartialEq)]
pub struct KernelLaunch<'a> {
    /// Kernel source the backend was built from
    pub kernel: &'a str,
    /// Primary stage followed by the family's extra stages
    pub stages: Vec<KernelStage>,
    /// Device-facing work block
    pub block: &'a WorkBlock,
    /// Thread counts for this batch
    pub sizing: WorkSizing,
    /// Bytes of read/write scratch the stages share
    pub rw_buffer_bytes: u64,
    /// Queue flags from the descriptor
    pub queue_properties: QueueProperties,
}

/// A device that executes kernel launches
pub trait ComputeBackend: Send {
    /// Which ABI this backend implements
    fn kind(&self) -> BackendKind;

    /// Submits one batch
    ///
    /// # Returns
    /// - `Ok(status)` with the device's status code, unchanged
    /// - `Err(MinerError)` only if the batch never reached the device
    fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError>;

    /// Reads the result buffer of the last batch
    ///
    /// Backends that report results out of band return an all-zero buffer,
    /// which reads as "no nonces found".
    fn read_output(&mut self, words: usize) -> Result<Vec<u32>, MinerError> {
        Ok(vec![0; words])
    }
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError> {
        (**self).submit(launch)
    }

    fn read_output(&mut self, words: usize) -> Result<Vec<u32>, MinerError> {
        (**self).read_output(words)
    }
}

/// Device parameters that feed kernel compilation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Scrypt lookup gap
    pub lookup_gap: u32,
    /// Threads resident at once (scrypt "thread concurrency")
    pub thread_concurrency: u32,
    /// Local work size
    pub work_size: u32,
    /// Compute units times shaders per unit
    pub compute_shaders: u32,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        DeviceInfo {
            lookup_gap: 2,
            thread_concurrency: 8192,
            work_size: 256,
            compute_shaders: 2048,
        }
    }
}

/// Build flags produced by `set_compile_options`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Kernel source stem
    pub kernel: String,
    /// Preprocessor flags passed to the device compiler
    pub compiler_options: String,
    /// Suffix distinguishing cached binaries built with different flags
    pub binary_suffix: String,
}

impl CompileOptions {
    /// Options every kernel gets regardless of family
    pub fn new(kernel: &str, device: &DeviceInfo) -> Self {
        CompileOptions {
            kernel: kernel.to_string(),
            compiler_options: format!("-D WORKSIZE={}", device.work_size),
            binary_suffix: format!("w{}", device.work_size),
        }
    }

    /// Appends a `-D NAME=value` define
    pub fn define(&mut self, name: &str, value: impl fmt::Display) {
        self.compiler_options
            .push_str(&format!(" -D {}={}", name, value));
    }

    /// Appends to the binary suffix
    pub fn suffix(&mut self, part: &str) {
        self.binary_suffix.push_str(part);
    }

    /// Cached binary file name for this build
    pub fn binary_filename(&self) -> String {
        format!("{}{}.bin", self.kernel, self.binary_suffix)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory backend used by the dispatch tests

    use super::*;

    /// Records every launch it receives and answers with a fixed status
    pub struct RecordingBackend {
        pub kind: BackendKind,
        pub status: BackendStatus,
        pub launches: Vec<RecordedLaunch>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedLaunch {
        pub kernel: String,
        pub stages: Vec<KernelStage>,
        pub block: WorkBlock,
        pub sizing: WorkSizing,
        pub rw_buffer_bytes: u64,
    }

    impl RecordingBackend {
        pub fn new(status: i32) -> Self {
            RecordingBackend {
                kind: BackendKind::active(),
                status: BackendStatus(status),
                launches: Vec::new(),
            }
        }
    }

    impl ComputeBackend for RecordingBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn submit(&mut self, launch: &KernelLaunch<'_>) -> Result<BackendStatus, MinerError> {
            self.launches.push(RecordedLaunch {
                kernel: launch.kernel.to_string(),
                stages: launch.stages.clone(),
                block: launch.block.clone(),
                sizing: launch.sizing,
                rw_buffer_bytes: launch.rw_buffer_bytes,
            });
            Ok(self.status)
        }
    }
}
