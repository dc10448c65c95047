// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multi-algorithm miner CLI - algorithm catalog and dispatch tools
#[derive(Parser, Debug)]
#[command(name = "multialgo-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// List catalog presets and aliases
    List(ListOptions),

    /// Show the descriptor built for an algorithm name
    Show(ShowOptions),

    /// Hash hex input with an algorithm's verification or share hash
    Hash(HashOptions),

    /// Validate a configuration file and print the resulting batch setup
    Check(CheckOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for listing the catalog
#[derive(Parser, Debug)]
pub struct ListOptions {
    /// Print aliases as well
    #[arg(short, long)]
    pub aliases: bool,
}

/// Options for showing a descriptor
#[derive(Parser, Debug)]
pub struct ShowOptions {
    /// Preset name or alias
    pub name: String,

    /// N-factor to apply after the preset default
    #[arg(short, long)]
    pub nfactor: Option<u8>,

    /// Print the descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for hashing input
#[derive(Parser, Debug)]
pub struct HashOptions {
    /// Preset name or alias
    pub name: String,

    /// Input bytes as hex
    pub hex: String,

    /// Compute the proof-of-work hash of a header instead of the
    /// verification hash
    #[arg(short, long)]
    pub pow: bool,
}

/// Options for checking a configuration file
#[derive(Parser, Debug)]
pub struct CheckOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_overrides() {
        let cli = Commands::try_parse_from(["multialgo-miner", "show", "scrypt", "-n", "12", "--json"])
            .unwrap();
        match cli.action {
            Action::Show(opts) => {
                assert_eq!(opts.name, "scrypt");
                assert_eq!(opts.nfactor, Some(12));
                assert!(opts.json);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Commands::try_parse_from(["multialgo-miner", "list", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn hash_requires_input() {
        assert!(Commands::try_parse_from(["multialgo-miner", "hash", "sia"]).is_err());
    }

    #[test]
    fn nfactor_must_fit_a_byte() {
        assert!(Commands::try_parse_from(["multialgo-miner", "show", "scrypt", "-n", "300"]).is_err());
    }
}
