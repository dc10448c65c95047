// src/main.rs
use clap::Parser;
use multialgo_miner::backend::{BackendKind, DeviceInfo};
use multialgo_miner::miner::algorithm::catalog;
use multialgo_miner::miner::difficulty::share_diff;
use multialgo_miner::{cli, config, utils};
use multialgo_miner::{Algorithm, MinerError, Work};

/// Main entry point for the miner CLI
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Initializes logging
/// 3. Delegates to appropriate subcommand handler
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();
    if cli.verbose {
        utils::init_verbose_logging();
    } else {
        utils::init_logging();
    }

    match cli.action {
        cli::Action::List(opts) => list_algorithms(opts),
        cli::Action::Show(opts) => show_algorithm(opts),
        cli::Action::Hash(opts) => hash_input(opts),
        cli::Action::Check(opts) => check_config(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Builds a descriptor, treating an unknown name as a configuration error
fn resolve(name: &str) -> Result<Algorithm, MinerError> {
    let algo = Algorithm::new(name);
    if algo.is_unknown() {
        return Err(MinerError::ConfigError(format!(
            "Unknown algorithm {:?} (see `list --aliases`)",
            name
        )));
    }
    Ok(algo)
}

/// Prints every preset with its identity, optionally followed by aliases
fn list_algorithms(opts: cli::ListOptions) -> Result<(), MinerError> {
    for preset in catalog::presets() {
        println!(
            "{:<20} {:<16} nfactor {}",
            preset.name, preset.algorithm_type, preset.default_nfactor
        );
    }
    if opts.aliases {
        println!();
        for (alias, target) in catalog::aliases() {
            println!("{:<20} -> {}", alias, target);
        }
    }
    Ok(())
}

/// Prints the descriptor for a name, with an optional nfactor applied
fn show_algorithm(opts: cli::ShowOptions) -> Result<(), MinerError> {
    let mut algo = resolve(&opts.name)?;
    if let Some(nfactor) = opts.nfactor {
        algo.set_nfactor(nfactor)?;
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&algo)?);
        return Ok(());
    }

    let build = algo.compile_options(&DeviceInfo::default());
    println!("name:              {}", algo.name());
    println!("type:              {}", algo.algorithm_type());
    println!("kernel:            {}", algo.kernel_source());
    println!("n / nfactor:       {} / {}", algo.n(), algo.nfactor());
    println!(
        "diff multipliers:  {} / {} / share {}",
        algo.diff_multiplier1, algo.diff_multiplier2, algo.share_diff_multiplier
    );
    println!(
        "intensity shifts:  {} (x {})",
        algo.intensity_shift, algo.xintensity_shift
    );
    println!("found_idx:         {}", algo.found_idx);
    println!("diff_numerator:    {:#x}", algo.diff_numerator);
    println!("diff1targ:         {:#010x}", algo.diff1targ);
    println!("extra kernels:     {}", algo.n_extra_kernels);
    println!("rw buffer:         {:?}", algo.rw_buffer_size);
    println!(
        "queue properties:  {:#x} ({} backend)",
        algo.cq_properties.0,
        BackendKind::active()
    );
    println!("build options:     {}", build.compiler_options);
    println!("binary:            {}", build.binary_filename());
    Ok(())
}

/// Hashes hex input with the algorithm's verification or share hash
fn hash_input(opts: cli::HashOptions) -> Result<(), MinerError> {
    let algo = resolve(&opts.name)?;
    let data = hex::decode(opts.hex.trim())?;

    if opts.pow {
        let mut work = Work::new("cli", data);
        algo.regenhash(&mut work)?;
        println!("{}", hex::encode(work.hash));
        log::info!("Share difficulty {:.6}", share_diff(&algo, &work.hash));
    } else {
        println!("{}", hex::encode(algo.gen_hash(&data)?));
    }
    Ok(())
}

/// Validates a configuration file and prints the batch setup it produces
fn check_config(opts: cli::CheckOptions) -> Result<(), MinerError> {
    let config = config::load(&opts.config)?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .map_err(|e| MinerError::ConfigError(format!("Thread pool setup failed: {}", e)))?;

    let algo = config.build_algorithm()?;
    let sizing = config.work_sizing(&algo)?;
    let build = algo.compile_options(&config.device.device_info());

    println!("algorithm:      {} ({})", algo.name(), algo.algorithm_type());
    println!("n / nfactor:    {} / {}", algo.n(), algo.nfactor());
    println!(
        "threads:        {} global / {} local",
        sizing.global_threads, sizing.local_threads
    );
    println!(
        "scratch:        {} bytes",
        algo.rw_buffer_size.total_bytes(sizing.global_threads)
    );
    println!("build options:  {}", build.compiler_options);
    println!("binary:         {}", build.binary_filename());
    println!("verify threads: {}", config.worker_threads);
    if let Err(e) = algo.ensure_mineable() {
        log::warn!("Workers cannot mine this algorithm: {}", e);
    }
    Ok(())
}

/// Generates configuration template file
///
/// # Arguments
/// * `opts` - Configuration generation options
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    log::info!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
