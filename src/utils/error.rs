// src/utils/error.rs
use crate::miner::scheduler::Share;
use serde_json;
use std::io;
use thiserror::Error;

/// Main error type for the dispatch layer
///
/// Backend status codes are not represented here: a submission that reaches
/// the device returns its status unchanged. These variants cover failures
/// the dispatch layer itself can observe.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Generic algorithm misuse (e.g. invoking slots on an unknown descriptor)
    #[error("Algorithm error: {0}")]
    AlgorithmError(String),

    /// Requested nfactor does not fit the 32-bit N field
    #[error("N-factor {nfactor} out of range (max {max})")]
    NfactorOutOfRange {
        /// Rejected value
        nfactor: u8,
        /// Largest accepted value
        max: u8,
    },

    /// The hash body for this family lives outside the dispatch layer
    #[error("{operation} is not available in-process for {algorithm}")]
    KernelUnavailable {
        /// Descriptor name
        algorithm: String,
        /// Operation slot that was invoked
        operation: &'static str,
    },

    /// Backend transport failure (not a device status code)
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),
}

impl MinerError {
    pub(crate) fn unavailable(algorithm: &str, operation: &'static str) -> Self {
        MinerError::KernelUnavailable {
            algorithm: algorithm.to_string(),
            operation,
        }
    }
}

/// Converts crossbeam channel send errors for shares into MinerError
impl From<crossbeam_channel::SendError<Share>> for MinerError {
    fn from(e: crossbeam_channel::SendError<Share>) -> Self {
        MinerError::ChannelError(format!("Share send failed: {}", e))
    }
}

/// Converts hex decoding errors into MinerError
///
/// Used when invalid hex data is encountered in headers passed on the
/// command line or in tests.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_operation() {
        let err = MinerError::unavailable("darkcoin", "regenhash");
        assert_eq!(
            err.to_string(),
            "regenhash is not available in-process for darkcoin"
        );

        let err = MinerError::NfactorOutOfRange { nfactor: 40, max: 31 };
        assert_eq!(err.to_string(), "N-factor 40 out of range (max 31)");
    }

    #[test]
    fn hex_errors_become_input_errors() {
        let err: MinerError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, MinerError::InputError(_)));
    }
}
