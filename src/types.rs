// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proof-of-work families known to the dispatch layer
///
/// Every descriptor carries exactly one identity. `Unknown` marks a
/// descriptor produced from a name the catalog does not know; it must be
/// treated as a configuration error by callers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmType {
    /// Unrecognized algorithm name
    #[default]
    Unknown,
    /// Credits (double SHA-256 over a 168-byte header)
    Credits,
    /// Scrypt with the canonical N = 1024
    Scrypt,
    /// Scrypt with an adjustable N-factor
    NScrypt,
    /// 11-round hash chain
    X11,
    /// 13-round hash chain
    X13,
    /// 14-round hash chain
    X14,
    /// 15-round hash chain
    X15,
    /// Keccak-256
    Keccak,
    /// Quark hash chain
    Quark,
    /// Twecoin hash chain
    Twe,
    /// Fugue-256 / Groestl single-pass family
    Fugue,
    /// NIST5 hash chain
    Nist,
    /// Fresh hash chain
    Fresh,
    /// Whirlpool
    Whirl,
    /// NeoScrypt
    NeoScrypt,
    /// WhirlpoolX
    WhirlpoolX,
    /// Lyra2RE
    Lyra2Re,
    /// Lyra2REv2
    Lyra2ReV2,
    /// Pluck
    Pluck,
    /// Yescrypt
    Yescrypt,
    /// Yescrypt, multi-kernel variant
    #[serde(rename = "yescrypt-multi")]
    YescryptMulti,
    /// BLAKE-256 with 8 rounds
    Blakecoin,
    /// BLAKE-256 with 14 rounds
    Blake,
    /// Decred (BLAKE-256 over a 180-byte header)
    Decred,
    /// Vanilla (BLAKE-256 with 8 rounds)
    Vanilla,
    /// Sia (BLAKE2b)
    Sia,
    /// LBRY
    Lbry,
}

impl AlgorithmType {
    /// Every identity in declaration order, `Unknown` first
    pub const ALL: [AlgorithmType; 28] = [
        AlgorithmType::Unknown,
        AlgorithmType::Credits,
        AlgorithmType::Scrypt,
        AlgorithmType::NScrypt,
        AlgorithmType::X11,
        AlgorithmType::X13,
        AlgorithmType::X14,
        AlgorithmType::X15,
        AlgorithmType::Keccak,
        AlgorithmType::Quark,
        AlgorithmType::Twe,
        AlgorithmType::Fugue,
        AlgorithmType::Nist,
        AlgorithmType::Fresh,
        AlgorithmType::Whirl,
        AlgorithmType::NeoScrypt,
        AlgorithmType::WhirlpoolX,
        AlgorithmType::Lyra2Re,
        AlgorithmType::Lyra2ReV2,
        AlgorithmType::Pluck,
        AlgorithmType::Yescrypt,
        AlgorithmType::YescryptMulti,
        AlgorithmType::Blakecoin,
        AlgorithmType::Blake,
        AlgorithmType::Decred,
        AlgorithmType::Vanilla,
        AlgorithmType::Sia,
        AlgorithmType::Lbry,
    ];

    /// Stable lowercase identifier used in logs and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::Unknown => "unknown",
            AlgorithmType::Credits => "credits",
            AlgorithmType::Scrypt => "scrypt",
            AlgorithmType::NScrypt => "nscrypt",
            AlgorithmType::X11 => "x11",
            AlgorithmType::X13 => "x13",
            AlgorithmType::X14 => "x14",
            AlgorithmType::X15 => "x15",
            AlgorithmType::Keccak => "keccak",
            AlgorithmType::Quark => "quark",
            AlgorithmType::Twe => "twe",
            AlgorithmType::Fugue => "fugue",
            AlgorithmType::Nist => "nist",
            AlgorithmType::Fresh => "fresh",
            AlgorithmType::Whirl => "whirl",
            AlgorithmType::NeoScrypt => "neoscrypt",
            AlgorithmType::WhirlpoolX => "whirlpoolx",
            AlgorithmType::Lyra2Re => "lyra2re",
            AlgorithmType::Lyra2ReV2 => "lyra2rev2",
            AlgorithmType::Pluck => "pluck",
            AlgorithmType::Yescrypt => "yescrypt",
            AlgorithmType::YescryptMulti => "yescrypt-multi",
            AlgorithmType::Blakecoin => "blakecoin",
            AlgorithmType::Blake => "blake",
            AlgorithmType::Decred => "decred",
            AlgorithmType::Vanilla => "vanilla",
            AlgorithmType::Sia => "sia",
            AlgorithmType::Lbry => "lbry",
        }
    }

    /// Whether the family's scratch memory scales with N
    pub fn is_memory_hard(&self) -> bool {
        matches!(
            self,
            AlgorithmType::Scrypt
                | AlgorithmType::NScrypt
                | AlgorithmType::NeoScrypt
                | AlgorithmType::Pluck
                | AlgorithmType::Yescrypt
                | AlgorithmType::YescryptMulti
        )
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        AlgorithmType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("Unknown algorithm type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_from_str() {
        for t in AlgorithmType::ALL {
            assert_eq!(t.as_str().parse::<AlgorithmType>().unwrap(), t);
        }
    }

    #[test]
    fn from_str_ignores_case() {
        assert_eq!("NeoScrypt".parse::<AlgorithmType>(), Ok(AlgorithmType::NeoScrypt));
        assert!("neo".parse::<AlgorithmType>().is_err());
    }

    #[test]
    fn serde_names_match_identifiers() {
        for t in AlgorithmType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn memory_hard_families() {
        assert!(AlgorithmType::Scrypt.is_memory_hard());
        assert!(AlgorithmType::Yescrypt.is_memory_hard());
        assert!(!AlgorithmType::X11.is_memory_hard());
        assert!(!AlgorithmType::Unknown.is_memory_hard());
    }
}
