// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components of the dispatch layer:
//! - Algorithm catalog, descriptors and family implementations
//! - Difficulty and target arithmetic
//! - Work units and batch sizing
//! - Job scheduling, algorithm switching and device workers

/// Algorithm catalog, descriptors and family implementations
///
/// Resolves algorithm names to presets, builds live descriptors, tunes
/// their N-factor and compares them for equivalence.
pub mod algorithm;

/// Target and difficulty arithmetic
pub mod difficulty;

/// Mining job scheduler
///
/// Handles distribution of jobs to workers, publication of algorithm
/// switches and collection of shares.
pub mod scheduler;

/// Intensity and result-buffer sizing
pub mod sizing;

/// Host and device work units
pub mod work;

/// Device-bound worker
///
/// Turns work into kernel batches on one backend and verifies the nonces
/// it reports.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::algorithm::{Algorithm, cmp_algorithm, set_algorithm, set_algorithm_nfactor};
pub use self::scheduler::{AlgorithmSwitch, MiningJob, NonceRange, Scheduler, Share};
pub use self::sizing::{Intensity, WorkSizing};
pub use self::work::{Work, WorkBlock};
pub use self::worker::Worker;
