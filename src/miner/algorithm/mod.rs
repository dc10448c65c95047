// src/miner/algorithm/mod.rs
//! Algorithm dispatch
//!
//! An [`Algorithm`] is the live descriptor a mining session holds: the
//! numeric parameters of one proof-of-work family plus a handle to that
//! family's capability set ([`AlgorithmOps`]). Descriptors are created from
//! the immutable [`catalog`] by name, tuned with [`Algorithm::set_nfactor`],
//! and compared with [`cmp_algorithm`] to decide whether a running backend
//! must be rebuilt.
//!
//! Family implementations:
//! - [`memory_hard`]: scrypt, N-scrypt, NeoScrypt, Pluck, Yescrypt
//! - [`chain`]: multi-round hash chains (X11..X15, Quark, NIST5, Lyra2, ...)
//! - [`blake`]: BLAKE-256 families including Decred
//! - [`single`]: single-pass hashes (Keccak, Sia, Credits, Fugue, WhirlpoolX)

/// Immutable preset registry
pub mod catalog;

/// Multi-round hash-chain families
pub mod chain;

/// BLAKE-256 families
pub mod blake;

/// Hash primitives shared by the families
pub mod digest;

/// Memory-hard scrypt-like families
pub mod memory_hard;

/// Single-pass hash families
pub mod single;

use crate::backend::{
    BackendStatus, CompileOptions, ComputeBackend, DeviceInfo, KernelArg, KernelLaunch,
    KernelStage, QueueProperties,
};
use crate::miner::sizing::WorkSizing;
use crate::miner::work::{Work, WorkBlock};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Largest N-factor whose `n = 2^nfactor` fits the 32-bit N field
pub const MAX_NFACTOR: u8 = 31;

/// Header offset of the 32-bit nonce for 80-byte headers
pub const DEFAULT_NONCE_OFFSET: usize = 76;

/// The capability set every family implements
///
/// One instance is shared by all descriptors built from the same preset.
/// Implementations must report the identity they were built for so a
/// descriptor can never pair one family's parameters with another's slots.
pub trait AlgorithmOps: Send + Sync {
    /// Identity this implementation serves
    fn algorithm_type(&self) -> AlgorithmType;

    /// Byte offset of the nonce inside the header
    fn nonce_offset(&self) -> usize {
        DEFAULT_NONCE_OFFSET
    }

    /// Recomputes the proof-of-work hash of `work` into `work.hash`
    fn regenhash(&self, algo: &Algorithm, work: &mut Work) -> Result<(), MinerError>;

    /// Precomputes the partial hash state reused across nonces
    ///
    /// Defaults to the SHA-256 state after the first 64 header bytes.
    fn calc_midstate(&self, _algo: &Algorithm, work: &mut Work) -> Result<(), MinerError> {
        work.midstate = digest::sha256_midstate(&work.data)?;
        Ok(())
    }

    /// Whether `calc_midstate` runs on the host
    ///
    /// Families whose midstate comes from a hash this crate does not carry
    /// cannot be prepared for a device.
    fn host_midstate(&self) -> bool {
        true
    }

    /// Lays `data` out for the device
    fn prepare_work(&self, blk: &mut WorkBlock, midstate: &[u32; 8], data: &[u32]) {
        blk.midstate = *midstate;
        blk.data = data.to_vec();
    }

    /// Kernel arguments for one batch, primary stage first
    fn kernel_stages(&self, algo: &Algorithm, blk: &WorkBlock) -> Vec<KernelStage>;

    /// Submits one batch to `backend`
    ///
    /// The backend's status is returned unchanged.
    fn queue_kernel(
        &self,
        algo: &Algorithm,
        backend: &mut dyn ComputeBackend,
        blk: &WorkBlock,
        sizing: WorkSizing,
    ) -> Result<BackendStatus, MinerError> {
        let launch = KernelLaunch {
            kernel: algo.kernel_source(),
            stages: self.kernel_stages(algo, blk),
            block: blk,
            sizing,
            rw_buffer_bytes: algo.rw_buffer_size.total_bytes(sizing.global_threads),
            queue_properties: algo.cq_properties,
        };
        backend.submit(&launch)
    }

    /// The family's merkle/verification hash
    fn gen_hash(&self, algo: &Algorithm, data: &[u8]) -> Result<[u8; 32], MinerError>;

    /// Adds family-specific kernel build flags
    fn set_compile_options(&self, _opts: &mut CompileOptions, _device: &DeviceInfo, _algo: &Algorithm) {}

    /// Per-thread scratch bytes for memory-hard families, `None` otherwise
    fn scratch_bytes_per_thread(&self, _n: u32) -> Option<u64> {
        None
    }
}

/// Shared handle to a family's capability set
#[derive(Clone)]
pub struct OpsHandle(Arc<dyn AlgorithmOps>);

impl OpsHandle {
    pub(crate) fn new(ops: impl AlgorithmOps + 'static) -> Self {
        OpsHandle(Arc::new(ops))
    }

    /// The capability set
    pub fn ops(&self) -> &dyn AlgorithmOps {
        self.0.as_ref()
    }
}

impl fmt::Debug for OpsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpsHandle({})", self.0.algorithm_type())
    }
}

impl PartialEq for OpsHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

/// Bounded, validated algorithm name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AlgorithmName(String);

impl AlgorithmName {
    /// Longest accepted name
    pub const MAX_LEN: usize = 19;

    /// Validates `name`: non-empty, at most [`Self::MAX_LEN`] printable ASCII
    /// characters
    pub fn new(name: &str) -> Result<Self, MinerError> {
        if name.is_empty() || name.len() > Self::MAX_LEN {
            return Err(MinerError::InputError(format!(
                "Algorithm name must be 1..={} characters, got {}",
                Self::MAX_LEN,
                name.len()
            )));
        }
        if !name.chars().all(|c| c.is_ascii_graphic()) {
            return Err(MinerError::InputError(format!(
                "Algorithm name {:?} contains non-printable characters",
                name
            )));
        }
        Ok(AlgorithmName(name.to_string()))
    }

    pub(crate) fn from_static(name: &'static str) -> Self {
        AlgorithmName(name.to_string())
    }

    /// Name used by the unknown descriptor
    pub fn unknown() -> Self {
        AlgorithmName::from_static("unknown")
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for AlgorithmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read/write scratch buffer requirement
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "bytes")]
pub enum RwBuffer {
    /// No scratch buffer
    #[default]
    None,
    /// Fixed total size in bytes
    Fixed(u64),
    /// Bytes per device thread
    PerThread(u64),
}

impl RwBuffer {
    /// Total bytes for a batch of `threads`
    pub fn total_bytes(&self, threads: u32) -> u64 {
        match *self {
            RwBuffer::None => 0,
            RwBuffer::Fixed(bytes) => bytes,
            RwBuffer::PerThread(bytes) => bytes.saturating_mul(threads as u64),
        }
    }
}

/// Live algorithm descriptor
///
/// Identity, name, `n`/`nfactor` and the capability handle are private so
/// that `n == 2^nfactor` and the identity/slot pairing always hold; the
/// remaining tuning fields are public and may be adjusted by the owner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Algorithm {
    name: AlgorithmName,
    #[serde(rename = "type")]
    algorithm_type: AlgorithmType,
    /// Alternate kernel source, `None` for the family default
    pub kernelfile: Option<String>,
    n: u32,
    nfactor: u8,
    /// Native-to-network difficulty scaling
    pub diff_multiplier1: f64,
    /// Difficulty scaling used when deriving targets
    pub diff_multiplier2: f64,
    /// Difficulty scaling used for share difficulty
    pub share_diff_multiplier: f64,
    /// Shift applied to extended intensity
    pub xintensity_shift: u32,
    /// Shift applied to standard intensity
    pub intensity_shift: u32,
    /// Result buffer slot holding the found-nonce count
    pub found_idx: u32,
    /// Numerator for the device's 64-bit target word
    pub diff_numerator: u64,
    /// Largest top hash word accepted as a difficulty-1 share
    pub diff1targ: u32,
    /// Kernel stages after the primary one
    pub n_extra_kernels: usize,
    /// Scratch buffer shared by the stages
    pub rw_buffer_size: RwBuffer,
    /// Command-queue flags, neutral unless the accelerator backend is active
    pub cq_properties: QueueProperties,
    #[serde(skip)]
    ops: OpsHandle,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::unknown()
    }
}

impl Algorithm {
    /// Builds a descriptor for `name` (preset name or alias, case-insensitive)
    ///
    /// Unknown names produce the [`AlgorithmType::Unknown`] descriptor; check
    /// [`Algorithm::is_unknown`] before using the result.
    pub fn new(name: &str) -> Self {
        match catalog::lookup(name) {
            Some(preset) => Algorithm::from_preset(preset),
            None => {
                warn!("Algorithm {} not found", name);
                Algorithm::unknown()
            }
        }
    }

    /// Builds a descriptor from a catalog row with the row's default nfactor
    pub fn from_preset(preset: &catalog::AlgorithmPreset) -> Self {
        let mut algo = Algorithm {
            name: preset.name.clone(),
            algorithm_type: preset.algorithm_type,
            kernelfile: preset.kernelfile.map(str::to_string),
            n: 1,
            nfactor: 0,
            diff_multiplier1: preset.diff_multiplier1,
            diff_multiplier2: preset.diff_multiplier2,
            share_diff_multiplier: preset.share_diff_multiplier,
            xintensity_shift: preset.xintensity_shift,
            intensity_shift: preset.intensity_shift,
            found_idx: preset.found_idx,
            diff_numerator: preset.diff_numerator,
            diff1targ: preset.diff1targ,
            n_extra_kernels: preset.n_extra_kernels,
            rw_buffer_size: preset.rw_buffer_size,
            cq_properties: preset.cq_properties.for_active_backend(),
            ops: preset.ops.clone(),
        };
        algo.apply_nfactor(preset.default_nfactor.min(MAX_NFACTOR));
        debug!(
            "Algorithm {} ({}) selected with nfactor {}",
            algo.name, algo.algorithm_type, algo.nfactor
        );
        algo
    }

    /// The inert descriptor for unrecognized names
    pub fn unknown() -> Self {
        Algorithm {
            name: AlgorithmName::unknown(),
            algorithm_type: AlgorithmType::Unknown,
            kernelfile: None,
            n: 1,
            nfactor: 0,
            diff_multiplier1: 1.0,
            diff_multiplier2: 1.0,
            share_diff_multiplier: 1.0,
            xintensity_shift: 0,
            intensity_shift: 0,
            found_idx: 0,
            diff_numerator: 0,
            diff1targ: 0,
            n_extra_kernels: 0,
            rw_buffer_size: RwBuffer::None,
            cq_properties: QueueProperties::NONE,
            ops: catalog::unknown_ops(),
        }
    }

    /// Descriptor name
    pub fn name(&self) -> &AlgorithmName {
        &self.name
    }

    /// Algorithm identity
    pub fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    /// Whether the name did not resolve to a catalog entry
    pub fn is_unknown(&self) -> bool {
        self.algorithm_type == AlgorithmType::Unknown
    }

    /// Memory-hardness parameter, always `2^nfactor`
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Exponent of `n`
    pub fn nfactor(&self) -> u8 {
        self.nfactor
    }

    /// Capability set bound to this descriptor
    pub fn ops(&self) -> &dyn AlgorithmOps {
        self.ops.ops()
    }

    /// Sets the memory-cost exponent
    ///
    /// Recomputes `n` and, for memory-hard families, the per-thread scratch
    /// size. Applying the same value twice leaves the descriptor unchanged.
    ///
    /// # Errors
    /// `NfactorOutOfRange` if `2^nfactor` does not fit in 32 bits; the
    /// descriptor is left untouched.
    pub fn set_nfactor(&mut self, nfactor: u8) -> Result<(), MinerError> {
        if nfactor > MAX_NFACTOR {
            warn!(
                "Rejecting nfactor {} for {}: N would overflow",
                nfactor, self.name
            );
            return Err(MinerError::NfactorOutOfRange {
                nfactor,
                max: MAX_NFACTOR,
            });
        }
        if nfactor != self.nfactor {
            debug!(
                "Algorithm {} nfactor {} -> {}",
                self.name, self.nfactor, nfactor
            );
        }
        self.apply_nfactor(nfactor);
        Ok(())
    }

    fn apply_nfactor(&mut self, nfactor: u8) {
        self.nfactor = nfactor;
        self.n = 1u32 << nfactor;
        if let Some(bytes) = self.ops().scratch_bytes_per_thread(self.n) {
            self.rw_buffer_size = RwBuffer::PerThread(bytes);
        }
    }

    /// Operational equivalence
    ///
    /// True when both descriptors would drive a backend identically: same
    /// name, identity, `n`/`nfactor`, difficulty constants and kernel
    /// override.
    pub fn is_equivalent(&self, other: &Algorithm) -> bool {
        self.algorithm_type == other.algorithm_type
            && self.name == other.name
            && self.n == other.n
            && self.nfactor == other.nfactor
            && self.kernelfile == other.kernelfile
            && self.diff_multiplier1.to_bits() == other.diff_multiplier1.to_bits()
            && self.diff_multiplier2.to_bits() == other.diff_multiplier2.to_bits()
            && self.share_diff_multiplier.to_bits() == other.share_diff_multiplier.to_bits()
            && self.diff_numerator == other.diff_numerator
            && self.diff1targ == other.diff1targ
    }

    /// Kernel source this descriptor compiles: the override, else its name
    pub fn kernel_source(&self) -> &str {
        self.kernelfile
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Header offset of the nonce for this family
    pub fn nonce_offset(&self) -> usize {
        self.ops().nonce_offset()
    }

    /// Recomputes `work.hash`
    pub fn regenhash(&self, work: &mut Work) -> Result<(), MinerError> {
        self.ops().regenhash(self, work)
    }

    /// Fills `work.midstate`
    pub fn calc_midstate(&self, work: &mut Work) -> Result<(), MinerError> {
        self.ops().calc_midstate(self, work)
    }

    /// Whether workers can prepare batches for this descriptor
    pub fn is_mineable(&self) -> bool {
        !self.is_unknown() && self.ops().host_midstate()
    }

    /// Fails with `KernelUnavailable` unless workers can prepare batches
    pub fn ensure_mineable(&self) -> Result<(), MinerError> {
        if self.is_mineable() {
            Ok(())
        } else {
            Err(MinerError::unavailable(self.name().as_str(), "calc_midstate"))
        }
    }

    /// Fills a device work block from a midstate and header words
    pub fn prepare_work(&self, blk: &mut WorkBlock, midstate: &[u32; 8], data: &[u32]) {
        self.ops().prepare_work(blk, midstate, data)
    }

    /// Submits one batch and returns the backend's status unchanged
    pub fn queue_kernel(
        &self,
        backend: &mut dyn ComputeBackend,
        blk: &WorkBlock,
        sizing: WorkSizing,
    ) -> Result<BackendStatus, MinerError> {
        self.ops().queue_kernel(self, backend, blk, sizing)
    }

    /// Computes the family's verification hash of `data`
    pub fn gen_hash(&self, data: &[u8]) -> Result<[u8; 32], MinerError> {
        self.ops().gen_hash(self, data)
    }

    /// Adds this family's build flags to `opts`
    pub fn set_compile_options(&self, opts: &mut CompileOptions, device: &DeviceInfo) {
        self.ops().set_compile_options(opts, device, self)
    }

    /// Full build options for this descriptor on `device`
    pub fn compile_options(&self, device: &DeviceInfo) -> CompileOptions {
        let mut opts = CompileOptions::new(self.kernel_source(), device);
        self.set_compile_options(&mut opts, device);
        opts
    }

    /// Recomputes the hash and checks its top word against `diff1targ`
    pub fn test_nonce(&self, work: &mut Work) -> Result<bool, MinerError> {
        self.regenhash(work)?;
        Ok(work.hash_top_word() <= self.diff1targ)
    }
}

/// Populates `algo` from the catalog entry named `name`
///
/// Unknown names leave `algo` as the [`AlgorithmType::Unknown`] descriptor.
pub fn set_algorithm(algo: &mut Algorithm, name: &str) {
    *algo = Algorithm::new(name);
}

/// Sets `algo`'s nfactor, see [`Algorithm::set_nfactor`]
pub fn set_algorithm_nfactor(algo: &mut Algorithm, nfactor: u8) -> Result<(), MinerError> {
    algo.set_nfactor(nfactor)
}

/// Compares two optional descriptors for operational equivalence
///
/// Two absent descriptors are equivalent; an absent and a present one are not.
pub fn cmp_algorithm(a: Option<&Algorithm>, b: Option<&Algorithm>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_equivalent(b),
        (None, None) => true,
        _ => false,
    }
}

/// Kernel build flag sets shared across families
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompileStyle {
    /// No family flags
    Plain,
    /// Lookup gap, thread concurrency and N-factor
    Scrypt,
    /// Global thread cap
    NeoScrypt,
    /// SPH options for the 11-round chain
    X11,
    /// SPH options for the 13+ round chains
    X13,
    /// BLAKE round count
    Blake(u8),
}

impl CompileStyle {
    /// Appends this style's flags
    pub fn apply(self, opts: &mut CompileOptions, device: &DeviceInfo, algo: &Algorithm) {
        match self {
            CompileStyle::Plain => {}
            CompileStyle::Scrypt => {
                opts.define("LOOKUP_GAP", device.lookup_gap);
                opts.define("CONCURRENT_THREADS", device.thread_concurrency);
                opts.define("NFACTOR", algo.nfactor());
                opts.suffix(&format!(
                    "lg{}tc{}nf{}",
                    device.lookup_gap,
                    device.thread_concurrency,
                    algo.nfactor()
                ));
            }
            CompileStyle::NeoScrypt => {
                opts.define("MAX_GLOBAL_THREADS", device.thread_concurrency);
                opts.suffix(&format!("tc{}", device.thread_concurrency));
            }
            CompileStyle::X11 => {
                opts.define("SPH_COMPACT_BLAKE_64", 0);
                opts.define("SPH_LUFFA_PARALLEL", 0);
                opts.define("SPH_KECCAK_UNROLL", 0);
            }
            CompileStyle::X13 => {
                opts.define("SPH_COMPACT_BLAKE_64", 0);
                opts.define("SPH_LUFFA_PARALLEL", 0);
                opts.define("SPH_KECCAK_UNROLL", 0);
                opts.define("SPH_HAMSI_EXPAND_BIG", 4);
            }
            CompileStyle::Blake(rounds) => {
                opts.define("BLAKE_ROUNDS", rounds);
                opts.suffix(&format!("r{}", rounds));
            }
        }
    }
}

/// Stage list for a primary kernel followed by `extra` chained stages
///
/// Chained stages pass intermediate hashes through the scratch buffer; the
/// last stage writes found nonces to the output buffer.
pub(crate) fn chained_stages(primary: Vec<KernelArg>, extra: usize, target: u64) -> Vec<KernelStage> {
    use crate::backend::BufferRole;

    if extra == 0 {
        let mut args = primary;
        args.push(KernelArg::Buffer(BufferRole::Output));
        args.push(KernelArg::U64(target));
        return vec![KernelStage::new(args)];
    }

    let mut first = primary;
    first.push(KernelArg::Buffer(BufferRole::Scratch));
    let mut stages = vec![KernelStage::new(first)];
    for _ in 1..extra {
        stages.push(KernelStage::new(vec![KernelArg::Buffer(BufferRole::Scratch)]));
    }
    stages.push(KernelStage::new(vec![
        KernelArg::Buffer(BufferRole::Scratch),
        KernelArg::Buffer(BufferRole::Output),
        KernelArg::U64(target),
    ]));
    stages
}

/// Capability set of the unknown descriptor: every slot refuses
pub(crate) struct UnknownOps;

impl UnknownOps {
    fn refuse(algo: &Algorithm, operation: &str) -> MinerError {
        MinerError::AlgorithmError(format!(
            "{} invoked on unconfigured algorithm {}",
            operation,
            algo.name()
        ))
    }
}

impl AlgorithmOps for UnknownOps {
    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::Unknown
    }

    fn regenhash(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(Self::refuse(algo, "regenhash"))
    }

    fn calc_midstate(&self, algo: &Algorithm, _work: &mut Work) -> Result<(), MinerError> {
        Err(Self::refuse(algo, "calc_midstate"))
    }

    fn host_midstate(&self) -> bool {
        false
    }

    fn prepare_work(&self, blk: &mut WorkBlock, _midstate: &[u32; 8], _data: &[u32]) {
        *blk = WorkBlock::default();
    }

    fn kernel_stages(&self, _algo: &Algorithm, _blk: &WorkBlock) -> Vec<KernelStage> {
        Vec::new()
    }

    fn queue_kernel(
        &self,
        algo: &Algorithm,
        _backend: &mut dyn ComputeBackend,
        _blk: &WorkBlock,
        _sizing: WorkSizing,
    ) -> Result<BackendStatus, MinerError> {
        Err(Self::refuse(algo, "queue_kernel"))
    }

    fn gen_hash(&self, algo: &Algorithm, _data: &[u8]) -> Result<[u8; 32], MinerError> {
        Err(Self::refuse(algo, "gen_hash"))
    }
}
