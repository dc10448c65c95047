//! Multi-algorithm miner - algorithm dispatch layer
//!
//! This crate provides the part of a proof-of-work miner that sits between
//! work scheduling and the compute devices:
//! - An immutable catalog of algorithm presets (scrypt, X11..X15, Keccak,
//!   NeoScrypt, Lyra2, BLAKE, Sia and more)
//! - Live descriptors built from the catalog, N-factor tuning and
//!   equivalence checks for hot reconfiguration
//! - Per-family capability sets that prepare work and queue kernels
//! - Accelerator, co-processor and serial backend adapters

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Compute backend interface and adapters
pub mod backend;

/// Miner core implementation including algorithms and scheduling
pub mod miner;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use backend::{BackendKind, BackendStatus, ComputeBackend};
pub use cli::Commands;
pub use config::Config;
pub use miner::{
    Algorithm, AlgorithmSwitch, MiningJob, Scheduler, Share, Work, WorkBlock, Worker,
    cmp_algorithm, set_algorithm, set_algorithm_nfactor,
};
pub use types::AlgorithmType;
pub use utils::{MinerError, init_logging};
