// src/config/config.rs
use crate::backend::DeviceInfo;
use crate::miner::algorithm::{Algorithm, catalog};
use crate::miner::sizing::{Intensity, WorkSizing};
use crate::utils::error::MinerError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the miner
///
/// Contains the algorithm selection, device tuning and worker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of host threads used for share verification
    /// (default: number of CPU cores)
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Algorithm selection
    pub algorithm: AlgorithmConfig,

    /// Device tuning
    #[serde(default)]
    pub device: DeviceConfig,
}

/// `[algorithm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Preset name or alias (e.g. "scrypt", "x11", "neoscrypt")
    pub name: String,

    /// N-factor override for memory-hard families
    #[serde(default)]
    pub nfactor: Option<u8>,

    /// Alternate kernel source
    #[serde(default)]
    pub kernelfile: Option<String>,
}

/// `[device]` section
///
/// At most one of `intensity`, `xintensity` and `rawintensity` may be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Standard intensity
    #[serde(default)]
    pub intensity: Option<i32>,

    /// Extended intensity, scaled by shader count
    #[serde(default)]
    pub xintensity: Option<u32>,

    /// Raw thread count
    #[serde(default)]
    pub rawintensity: Option<u32>,

    /// Local work size
    #[serde(default = "default_worksize")]
    pub worksize: u32,

    /// Scrypt lookup gap
    #[serde(default = "default_lookup_gap")]
    pub lookup_gap: u32,

    /// Scrypt thread concurrency
    #[serde(default = "default_thread_concurrency")]
    pub thread_concurrency: u32,

    /// Compute units times shaders per unit
    #[serde(default = "default_compute_shaders")]
    pub compute_shaders: u32,
}

fn default_worker_threads() -> usize {
    num_cpus::get()
}

fn default_worksize() -> u32 {
    DeviceInfo::default().work_size
}

fn default_lookup_gap() -> u32 {
    DeviceInfo::default().lookup_gap
}

fn default_thread_concurrency() -> u32 {
    DeviceInfo::default().thread_concurrency
}

fn default_compute_shaders() -> u32 {
    DeviceInfo::default().compute_shaders
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            intensity: None,
            xintensity: None,
            rawintensity: None,
            worksize: default_worksize(),
            lookup_gap: default_lookup_gap(),
            thread_concurrency: default_thread_concurrency(),
            compute_shaders: default_compute_shaders(),
        }
    }
}

impl DeviceConfig {
    /// The configured intensity mode, defaulting to standard intensity
    pub fn intensity(&self) -> Result<Intensity, MinerError> {
        match (self.intensity, self.xintensity, self.rawintensity) {
            (None, None, None) => Ok(Intensity::default()),
            (Some(n), None, None) => Ok(Intensity::Standard(n)),
            (None, Some(x), None) => Ok(Intensity::Extended(x)),
            (None, None, Some(raw)) => Ok(Intensity::Raw(raw)),
            _ => Err(MinerError::ConfigError(
                "Set only one of intensity, xintensity and rawintensity".to_string(),
            )),
        }
    }

    /// Device parameters for kernel builds and sizing
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            lookup_gap: self.lookup_gap,
            thread_concurrency: self.thread_concurrency,
            work_size: self.worksize,
            compute_shaders: self.compute_shaders,
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config from {}", path.display());
        Config::parse(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn parse(text: &str) -> Result<Self, MinerError> {
        toml::from_str(text)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Builds the descriptor this configuration selects
    ///
    /// Unknown names are rejected; the N-factor and kernel overrides are
    /// applied after the preset defaults.
    pub fn build_algorithm(&self) -> Result<Algorithm, MinerError> {
        let mut algo = Algorithm::new(&self.algorithm.name);
        if algo.is_unknown() {
            return Err(MinerError::ConfigError(format!(
                "Unknown algorithm {:?}",
                self.algorithm.name
            )));
        }
        if let Some(nfactor) = self.algorithm.nfactor {
            algo.set_nfactor(nfactor)?;
        }
        // An empty kernelfile means no override
        if let Some(kernelfile) = self.algorithm.kernelfile.as_deref().filter(|k| !k.is_empty()) {
            algo.kernelfile = Some(kernelfile.to_string());
        }
        info!(
            "Using {} ({}) nfactor {} kernel {}",
            algo.name(),
            algo.algorithm_type(),
            algo.nfactor(),
            algo.kernel_source()
        );
        Ok(algo)
    }

    /// Batch size for `algo` under this device configuration
    pub fn work_sizing(&self, algo: &Algorithm) -> Result<WorkSizing, MinerError> {
        WorkSizing::for_algorithm(
            algo,
            self.device.intensity()?,
            self.device.compute_shaders,
            self.device.worksize,
        )
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let names: Vec<&str> = catalog::names().collect();
        let defaults = DeviceInfo::default();

        let mut template = String::new();
        template.push_str("# Multi-algorithm miner configuration\n\n");
        template.push_str("# Host threads for share verification (0 = auto-detect)\n");
        template.push_str(&format!("worker_threads = {}\n\n", num_cpus::get()));

        template.push_str("[algorithm]\n");
        template.push_str("# Presets:\n");
        for chunk in names.chunks(8) {
            template.push_str(&format!("#   {}\n", chunk.join(", ")));
        }
        template.push_str("# Aliases such as scrypt, x11, x13, keccak or blake are accepted too\n");
        template.push_str("name = \"scrypt\"\n");
        template.push_str("# N-factor for memory-hard families (n = 2^nfactor, max 31)\n");
        template.push_str("# nfactor = 10\n");
        template.push_str("# Alternate kernel source\n");
        template.push_str("# kernelfile = \"ckolivas\"\n\n");

        template.push_str("[device]\n");
        template.push_str("# Set only one of intensity, xintensity, rawintensity\n");
        template.push_str("intensity = 13\n");
        template.push_str("# xintensity = 64\n");
        template.push_str("# rawintensity = 262144\n");
        template.push_str(&format!("worksize = {}\n", defaults.work_size));
        template.push_str(&format!("lookup_gap = {}\n", defaults.lookup_gap));
        template.push_str(&format!(
            "thread_concurrency = {}\n",
            defaults.thread_concurrency
        ));
        template.push_str(&format!("compute_shaders = {}\n", defaults.compute_shaders));

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::cmp_algorithm;
    use crate::types::AlgorithmType;

    #[test]
    fn template_parses_and_builds() {
        let config = Config::parse(&Config::generate_template()).unwrap();
        assert_eq!(config.algorithm.name, "scrypt");
        assert_eq!(config.device.intensity().unwrap(), Intensity::Standard(13));
        let algo = config.build_algorithm().unwrap();
        assert_eq!(algo.algorithm_type(), AlgorithmType::Scrypt);
        assert_eq!(config.work_sizing(&algo).unwrap().global_threads, 8192);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse("[algorithm]\nname = \"neoscrypt\"\n").unwrap();
        assert_eq!(config.device, DeviceConfig::default());
        assert_eq!(config.device.device_info(), DeviceInfo::default());
        assert!(config.worker_threads >= 1);
    }

    #[test]
    fn overrides_apply_after_preset() {
        let config = Config::parse(
            "[algorithm]\nname = \"x13\"\nnfactor = 12\nkernelfile = \"marucoin-test\"\n",
        )
        .unwrap();
        let algo = config.build_algorithm().unwrap();
        assert_eq!(algo.nfactor(), 12);
        assert_eq!(algo.kernel_source(), "marucoin-test");
    }

    #[test]
    fn empty_kernelfile_keeps_the_preset() {
        let config = Config::parse("[algorithm]\nname = \"x11\"\nkernelfile = \"\"\n").unwrap();
        let algo = config.build_algorithm().unwrap();
        assert_eq!(algo.kernelfile, None);
        assert!(cmp_algorithm(Some(&algo), Some(&Algorithm::new("x11"))));

        let config = Config::parse("[algorithm]\nname = \"nscrypt\"\nkernelfile = \"\"\n").unwrap();
        let algo = config.build_algorithm().unwrap();
        assert_eq!(algo.kernel_source(), "ckolivas");
        assert!(cmp_algorithm(Some(&algo), Some(&Algorithm::new("nscrypt"))));
    }

    #[test]
    fn unknown_algorithm_is_a_config_error() {
        let config = Config::parse("[algorithm]\nname = \"scrypt-x\"\n").unwrap();
        assert!(matches!(
            config.build_algorithm(),
            Err(MinerError::ConfigError(_))
        ));
    }

    #[test]
    fn nfactor_out_of_range_is_rejected() {
        let config = Config::parse("[algorithm]\nname = \"scrypt\"\nnfactor = 32\n").unwrap();
        assert!(matches!(
            config.build_algorithm(),
            Err(MinerError::NfactorOutOfRange { nfactor: 32, .. })
        ));
    }

    #[test]
    fn conflicting_intensities_are_rejected() {
        let config = Config::parse(
            "[algorithm]\nname = \"sia\"\n[device]\nintensity = 8\nrawintensity = 1024\n",
        )
        .unwrap();
        assert!(config.device.intensity().is_err());

        let config =
            Config::parse("[algorithm]\nname = \"sia\"\n[device]\nxintensity = 4\n").unwrap();
        assert_eq!(config.device.intensity().unwrap(), Intensity::Extended(4));
    }

    #[test]
    fn missing_algorithm_section_fails() {
        assert!(matches!(
            Config::parse("worker_threads = 2\n"),
            Err(MinerError::ConfigError(_))
        ));
    }
}
