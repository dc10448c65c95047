// src/cli/mod.rs
//! Command-line interface definitions

/// Argument structures parsed by clap
pub mod commands;

pub use commands::{
    Action, CheckOptions, Commands, ConfigOptions, HashOptions, ListOptions, ShowOptions,
};
