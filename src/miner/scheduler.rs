// src/miner/scheduler.rs
//! Mining job scheduler implementation
//!
//! Distributes header jobs and nonce ranges to device workers, publishes
//! algorithm switches, and forwards found shares.

use crate::backend::{ComputeBackend, DeviceInfo};
use crate::miner::algorithm::{Algorithm, cmp_algorithm};
use crate::miner::sizing::Intensity;
use crate::miner::work::Work;
use crate::miner::worker::Worker;
use crate::utils::error::MinerError;
use arc_swap::ArcSwap;
use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Pause before polling again when there is nothing to do
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// A header job received from the work source
#[derive(Debug, Clone, PartialEq)]
pub struct MiningJob {
    /// Unique identifier for the job
    pub job_id: String,
    /// Block header to mine
    pub header: Vec<u8>,
    /// Share target, 256-bit little-endian
    pub target: [u8; 32],
    /// Difficulty the device works at
    pub device_diff: f64,
}

impl MiningJob {
    /// Host work unit for this job
    pub fn to_work(&self) -> Work {
        Work {
            target: self.target,
            device_diff: self.device_diff,
            ..Work::new(self.job_id.clone(), self.header.clone())
        }
    }
}

/// A nonce reported by a device
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    /// Job ID this share belongs to
    pub job_id: String,
    /// Nonce that produced the share
    pub nonce: u32,
    /// Host-verified hash, `None` if the family's hash only runs on the device
    pub hash: Option<[u8; 32]>,
}

/// Published descriptor shared by all workers
///
/// Replacement descriptors are fully built before they are stored, and
/// workers swap their reference atomically when the generation moves.
/// The shared descriptor itself is never mutated.
pub struct AlgorithmSwitch {
    current: ArcSwap<Algorithm>,
    generation: AtomicU64,
}

impl AlgorithmSwitch {
    /// Starts with `algorithm` at generation zero
    pub fn new(algorithm: Algorithm) -> Self {
        AlgorithmSwitch {
            current: ArcSwap::from_pointee(algorithm),
            generation: AtomicU64::new(0),
        }
    }

    /// The published descriptor
    pub fn current(&self) -> Arc<Algorithm> {
        self.current.load_full()
    }

    /// Bumped every time a non-equivalent descriptor is published
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Descriptor together with the generation it belongs to
    pub fn snapshot(&self) -> (Arc<Algorithm>, u64) {
        loop {
            let generation = self.generation();
            let algorithm = self.current();
            if generation == self.generation() {
                return (algorithm, generation);
            }
        }
    }

    /// Publishes `next`
    ///
    /// Returns `true` if `next` is not equivalent to the current descriptor,
    /// meaning workers have to reinitialize. Equivalent descriptors are
    /// ignored.
    ///
    /// # Errors
    /// `AlgorithmError` if `next` is the unknown descriptor,
    /// `KernelUnavailable` if workers cannot prepare batches for it.
    pub fn publish(&self, next: Algorithm) -> Result<bool, MinerError> {
        if next.is_unknown() {
            return Err(MinerError::AlgorithmError(
                "Refusing to publish an unknown algorithm".to_string(),
            ));
        }
        next.ensure_mineable()?;
        let current = self.current();
        if cmp_algorithm(Some(&current), Some(&next)) {
            info!("Algorithm {} unchanged, keeping workers running", next.name());
            return Ok(false);
        }
        info!(
            "Switching algorithm {} (nfactor {}) -> {} (nfactor {})",
            current.name(),
            current.nfactor(),
            next.name(),
            next.nfactor()
        );
        self.current.store(Arc::new(next));
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(true)
    }
}

/// Hands out disjoint nonce ranges of the current job
///
/// The cursor is 64-bit so the last range of the 32-bit nonce space can be
/// claimed without wrapping back to zero.
#[derive(Debug, Default)]
pub struct NonceRange {
    next: AtomicU64,
}

impl NonceRange {
    /// Claims `batch` nonces, returning the first one
    ///
    /// Returns `None` once every nonce of the job has been handed out.
    pub fn claim(&self, batch: u32) -> Option<u32> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                (next <= u64::from(u32::MAX)).then(|| next + u64::from(batch.max(1)))
            })
            .ok()
            .and_then(|start| u32::try_from(start).ok())
    }

    /// Starts over at nonce zero
    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
    }
}

/// Coordinates mining jobs across device workers
pub struct Scheduler {
    /// Published descriptor
    switch: Arc<AlgorithmSwitch>,
    /// Current active job (atomically swappable)
    current_job: Arc<ArcSwap<Option<MiningJob>>>,
    /// Next unassigned nonce of the current job
    nonce_counter: Arc<NonceRange>,
    /// Channel for sending shares
    share_sender: Sender<Share>,
    /// Flag to control worker threads
    active: Arc<AtomicBool>,
}

impl Scheduler {
    /// Creates a new Scheduler instance
    ///
    /// # Arguments
    /// * `algorithm` - Initial descriptor
    /// * `share_sender` - Channel for found shares
    pub fn new(algorithm: Algorithm, share_sender: Sender<Share>) -> Result<Self, MinerError> {
        let switch = AlgorithmSwitch::new(Algorithm::unknown());
        switch.publish(algorithm)?;
        Ok(Scheduler {
            switch: Arc::new(switch),
            current_job: Arc::new(ArcSwap::from_pointee(None)),
            nonce_counter: Arc::new(NonceRange::default()),
            share_sender,
            active: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The algorithm switch workers follow
    pub fn switch(&self) -> &Arc<AlgorithmSwitch> {
        &self.switch
    }

    /// Replaces the current job and restarts the nonce range
    pub fn update_job(&self, new_job: MiningJob) {
        info!("New job {}", new_job.job_id);
        self.current_job.store(Arc::new(Some(new_job)));
        self.nonce_counter.reset();
    }

    /// Builds a descriptor for `name` and publishes it
    ///
    /// Returns whether workers had to reinitialize.
    pub fn switch_algorithm(&self, name: &str, nfactor: Option<u8>) -> Result<bool, MinerError> {
        let mut algorithm = Algorithm::new(name);
        if algorithm.is_unknown() {
            return Err(MinerError::ConfigError(format!("Unknown algorithm {}", name)));
        }
        if let Some(nfactor) = nfactor {
            algorithm.set_nfactor(nfactor)?;
        }
        let changed = self.switch.publish(algorithm)?;
        if changed {
            self.nonce_counter.reset();
        }
        Ok(changed)
    }

    /// Spawns one worker thread per backend
    ///
    /// # Arguments
    /// * `backends` - One backend per device
    /// * `intensity` - Batch size setting shared by all workers
    /// * `device` - Device parameters shared by all workers
    pub fn start_mining<B>(
        &self,
        backends: Vec<B>,
        intensity: Intensity,
        device: DeviceInfo,
    ) -> Result<Vec<JoinHandle<()>>, MinerError>
    where
        B: ComputeBackend + 'static,
    {
        let mut handles = Vec::with_capacity(backends.len());
        for (id, backend) in backends.into_iter().enumerate() {
            let mut worker = Worker::new(id, &self.switch, backend, intensity, device.clone())?;
            let switch = self.switch.clone();
            let job_arc = self.current_job.clone();
            let nonce_ctr = self.nonce_counter.clone();
            let sender = self.share_sender.clone();
            let active = self.active.clone();

            handles.push(std::thread::spawn(move || {
                info!("Worker {} started", id);
                let state = WorkerState {
                    switch,
                    job: job_arc,
                    nonce_counter: nonce_ctr,
                    sender,
                    active,
                };
                match state.run(&mut worker) {
                    Ok(()) => info!("Worker {} stopped", id),
                    Err(e) => warn!("Worker {} stopped: {}", id, e),
                }
            }));
        }
        Ok(handles)
    }

    /// Stops all mining workers
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Shared handles a worker thread polls between batches
struct WorkerState {
    switch: Arc<AlgorithmSwitch>,
    job: Arc<ArcSwap<Option<MiningJob>>>,
    nonce_counter: Arc<NonceRange>,
    sender: Sender<Share>,
    active: Arc<AtomicBool>,
}

impl WorkerState {
    /// Mines until stopped or until shares can no longer be delivered
    fn run<B: ComputeBackend>(&self, worker: &mut Worker<B>) -> Result<(), MinerError> {
        while self.active.load(Ordering::Relaxed) {
            if let Err(e) = worker.sync(&self.switch) {
                error!("Cannot use new algorithm: {}", e);
                std::thread::sleep(IDLE_WAIT);
                continue;
            }
            let current_job = self.job.load();
            let Some(job) = &**current_job else {
                std::thread::sleep(IDLE_WAIT);
                continue;
            };

            let work = job.to_work();
            let batch = worker.sizing().global_threads;
            let Some(start_nonce) = self.nonce_counter.claim(batch) else {
                debug!("Nonce space of job {} exhausted, waiting for a new job", job.job_id);
                std::thread::sleep(IDLE_WAIT);
                continue;
            };
            let shares = worker
                .process(&work, start_nonce)
                .and_then(|b| worker.verify_nonces(&work, &b.candidates));
            match shares {
                Ok(shares) => {
                    for share in shares {
                        self.sender.send(share)?;
                    }
                }
                Err(e) => {
                    error!("Batch at nonce {} failed: {}", start_nonce, e);
                    std::thread::sleep(IDLE_WAIT);
                }
            }
        }
        Ok(())
    }
}
