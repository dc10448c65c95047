// src/miner/algorithm/catalog.rs
//! Immutable preset registry
//!
//! Rows are built once on first use and only handed out as shared
//! references. Rows of the same family share one capability set.

use crate::backend::QueueProperties;
use crate::miner::algorithm::blake::BlakeOps;
use crate::miner::algorithm::chain::ChainOps;
use crate::miner::algorithm::digest::MerkleHash;
use crate::miner::algorithm::memory_hard::MemoryHardOps;
use crate::miner::algorithm::single::{HeaderLayout, PowHash, SingleOps};
use crate::miner::algorithm::{AlgorithmName, CompileStyle, OpsHandle, RwBuffer, UnknownOps};
use crate::types::AlgorithmType;
use lazy_static::lazy_static;

/// N-factor every preset starts with unless its row says otherwise
pub const DEFAULT_NFACTOR: u8 = 10;

/// Scratch shared by the 8x16 chained "mod" kernels
const MOD_SCRATCH: u64 = 8 * 16 * 4_194_304;

/// A read-only catalog row
#[derive(Clone, Debug)]
pub struct AlgorithmPreset {
    /// Row name, also the default kernel source
    pub name: AlgorithmName,
    /// Identity served by the row
    pub algorithm_type: AlgorithmType,
    /// Alternate kernel source
    pub kernelfile: Option<&'static str>,
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
    /// Scratch buffer before the N-factor is applied
    pub rw_buffer_size: RwBuffer,
    /// Command-queue flags requested on the accelerator backend
    pub cq_properties: QueueProperties,
    /// N-factor applied on instantiation
    pub default_nfactor: u8,
    pub(crate) ops: OpsHandle,
}

impl AlgorithmPreset {
    /// Row with the neutral column values most families use
    fn base(name: &'static str, ops: &OpsHandle) -> Self {
        AlgorithmPreset {
            name: AlgorithmName::from_static(name),
            algorithm_type: ops.ops().algorithm_type(),
            kernelfile: None,
            diff_multiplier1: 1.0,
            diff_multiplier2: 1.0,
            share_diff_multiplier: 1.0,
            xintensity_shift: 0,
            intensity_shift: 0,
            found_idx: 0xFF,
            diff_numerator: 0xFFFF,
            diff1targ: 0x0000_FFFF,
            n_extra_kernels: 0,
            rw_buffer_size: RwBuffer::None,
            cq_properties: QueueProperties::NONE,
            default_nfactor: DEFAULT_NFACTOR,
            ops: ops.clone(),
        }
    }

    /// Row for the scrypt-like families: 65536 multipliers, out-of-order queue
    fn memory_hard(name: &'static str, ops: &OpsHandle, diff_numerator: u64) -> Self {
        AlgorithmPreset {
            diff_multiplier2: 65536.0,
            share_diff_multiplier: 65536.0,
            diff_numerator,
            cq_properties: QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE,
            ..AlgorithmPreset::base(name, ops)
        }
    }

    fn multipliers(mut self, diff1: f64, diff2: f64, share: f64) -> Self {
        self.diff_multiplier1 = diff1;
        self.diff_multiplier2 = diff2;
        self.share_diff_multiplier = share;
        self
    }

    fn extra_kernels(mut self, n_extra: usize, rw_buffer_size: RwBuffer) -> Self {
        self.n_extra_kernels = n_extra;
        self.rw_buffer_size = rw_buffer_size;
        self
    }
}

fn scrypt_rows(rows: &mut Vec<AlgorithmPreset>) {
    let scrypt = OpsHandle::new(MemoryHardOps::new(AlgorithmType::Scrypt, 128, CompileStyle::Scrypt));
    for name in [
        "ckolivas",
        "alexkarnew",
        "alexkarnold",
        "bufius",
        "psw",
        "zuikkis",
        "arebyp",
    ] {
        rows.push(AlgorithmPreset::memory_hard(name, &scrypt, 0xFFFF_FFFF));
    }

    let nscrypt = OpsHandle::new(MemoryHardOps::new(AlgorithmType::NScrypt, 128, CompileStyle::Scrypt));
    rows.push(AlgorithmPreset {
        kernelfile: Some("ckolivas"),
        default_nfactor: 11,
        ..AlgorithmPreset::memory_hard("nscrypt", &nscrypt, 0xFFFF_FFFF)
    });

    let neoscrypt = OpsHandle::new(MemoryHardOps::new(AlgorithmType::NeoScrypt, 256, CompileStyle::NeoScrypt));
    rows.push(AlgorithmPreset::memory_hard("neoscrypt", &neoscrypt, 0xFFFF_0000_0000_0000));

    let pluck = OpsHandle::new(MemoryHardOps::new(AlgorithmType::Pluck, 128, CompileStyle::NeoScrypt));
    rows.push(AlgorithmPreset::memory_hard("pluck", &pluck, 0xFFFF_0000_0000_0000));

    let yescrypt = OpsHandle::new(MemoryHardOps::new(AlgorithmType::Yescrypt, 1024, CompileStyle::NeoScrypt));
    rows.push(AlgorithmPreset::memory_hard("yescrypt", &yescrypt, 0xFFFF_0000_0000_0000));

    let multi = OpsHandle::new(MemoryHardOps::new(AlgorithmType::YescryptMulti, 1024, CompileStyle::NeoScrypt));
    rows.push(AlgorithmPreset {
        n_extra_kernels: 2,
        ..AlgorithmPreset::memory_hard("yescrypt-multi", &multi, 0xFFFF_0000_0000_0000)
    });
}

fn chain_rows(rows: &mut Vec<AlgorithmPreset>) {
    let quark = OpsHandle::new(ChainOps::new(AlgorithmType::Quark, MerkleHash::Sha256d, CompileStyle::Plain));
    for name in ["quarkcoin", "qubitcoin", "animecoin", "sifcoin"] {
        rows.push(AlgorithmPreset {
            diff_numerator: 0xFF_FFFF,
            ..AlgorithmPreset::base(name, &quark).multipliers(256.0, 256.0, 256.0)
        });
    }

    let x11 = OpsHandle::new(ChainOps::new(AlgorithmType::X11, MerkleHash::Sha256d, CompileStyle::X11));
    for name in ["darkcoin", "inkcoin", "myriadcoin-groestl"] {
        rows.push(AlgorithmPreset::base(name, &x11));
    }
    rows.push(AlgorithmPreset::base("darkcoin-mod", &x11).extra_kernels(10, RwBuffer::Fixed(MOD_SCRATCH)));

    let twe = OpsHandle::new(ChainOps::new(AlgorithmType::Twe, MerkleHash::Sha256, CompileStyle::Plain));
    rows.push(AlgorithmPreset::base("twecoin", &twe));

    let x13 = OpsHandle::new(ChainOps::new(AlgorithmType::X13, MerkleHash::Sha256d, CompileStyle::X13));
    rows.push(AlgorithmPreset::base("marucoin", &x13));
    rows.push(AlgorithmPreset::base("marucoin-mod", &x13).extra_kernels(12, RwBuffer::Fixed(MOD_SCRATCH)));
    rows.push(AlgorithmPreset::base("marucoin-modold", &x13).extra_kernels(10, RwBuffer::Fixed(MOD_SCRATCH)));

    let x14 = OpsHandle::new(ChainOps::new(AlgorithmType::X14, MerkleHash::Sha256d, CompileStyle::X13));
    rows.push(AlgorithmPreset::base("x14", &x14).extra_kernels(13, RwBuffer::Fixed(MOD_SCRATCH)));
    rows.push(AlgorithmPreset::base("x14old", &x14).extra_kernels(10, RwBuffer::Fixed(MOD_SCRATCH)));

    let x15 = OpsHandle::new(ChainOps::new(AlgorithmType::X15, MerkleHash::Sha256d, CompileStyle::X13));
    rows.push(AlgorithmPreset::base("bitblock", &x15).extra_kernels(14, RwBuffer::Fixed(MOD_SCRATCH)));
    rows.push(AlgorithmPreset::base("bitblockold", &x15).extra_kernels(10, RwBuffer::Fixed(MOD_SCRATCH)));

    let nist = OpsHandle::new(ChainOps::new(AlgorithmType::Nist, MerkleHash::Sha256d, CompileStyle::Plain));
    rows.push(AlgorithmPreset::base("talkcoin-mod", &nist).extra_kernels(4, RwBuffer::Fixed(MOD_SCRATCH)));

    let fresh = OpsHandle::new(ChainOps::new(AlgorithmType::Fresh, MerkleHash::Sha256d, CompileStyle::Plain));
    rows.push(
        AlgorithmPreset::base("fresh", &fresh)
            .multipliers(1.0, 256.0, 256.0)
            .extra_kernels(4, RwBuffer::Fixed(4 * 16 * 4_194_304)),
    );

    let whirl = OpsHandle::new(ChainOps::new(AlgorithmType::Whirl, MerkleHash::Sha256, CompileStyle::Plain));
    rows.push(AlgorithmPreset::base("whirlcoin", &whirl).extra_kernels(3, RwBuffer::Fixed(MOD_SCRATCH)));

    let lyra2re = OpsHandle::new(
        ChainOps::new(AlgorithmType::Lyra2Re, MerkleHash::Sha256d, CompileStyle::Plain).with_blake_midstate(),
    );
    rows.push(
        AlgorithmPreset::base("lyra2re", &lyra2re)
            .multipliers(1.0, 128.0, 128.0)
            .extra_kernels(4, RwBuffer::Fixed(2 * 8 * 4_194_304)),
    );

    let lyra2rev2 = OpsHandle::new(
        ChainOps::new(AlgorithmType::Lyra2ReV2, MerkleHash::Sha256d, CompileStyle::Plain).with_blake_midstate(),
    );
    rows.push(
        AlgorithmPreset::base("lyra2rev2", &lyra2rev2)
            .multipliers(1.0, 256.0, 256.0)
            .extra_kernels(6, RwBuffer::PerThread(4 * 4 * 8)),
    );

    let lbry = OpsHandle::new(ChainOps::new(AlgorithmType::Lbry, MerkleHash::Sha256d, CompileStyle::Plain));
    rows.push(
        AlgorithmPreset::base("lbry", &lbry)
            .multipliers(1.0, 256.0, 256.0)
            .extra_kernels(2, RwBuffer::Fixed(4 * 8 * 4_194_304)),
    );
}

fn single_rows(rows: &mut Vec<AlgorithmPreset>) {
    let keccak = OpsHandle::new(SingleOps::new(
        AlgorithmType::Keccak,
        PowHash::Keccak256,
        MerkleHash::Sha256,
        HeaderLayout::STANDARD,
    ));
    rows.push(AlgorithmPreset {
        xintensity_shift: 4,
        intensity_shift: 15,
        found_idx: 0x0F,
        diff1targ: 0x0000_00FF,
        ..AlgorithmPreset::base("maxcoin", &keccak).multipliers(1.0, 256.0, 1.0)
    });

    let fugue = OpsHandle::new(SingleOps::new(
        AlgorithmType::Fugue,
        PowHash::External,
        MerkleHash::Sha256,
        HeaderLayout::STANDARD,
    ));
    for name in ["fuguecoin", "groestlcoin"] {
        rows.push(AlgorithmPreset::base(name, &fugue).multipliers(1.0, 256.0, 256.0));
    }
    let diamond = OpsHandle::new(SingleOps::new(
        AlgorithmType::Fugue,
        PowHash::External,
        MerkleHash::Sha256d,
        HeaderLayout::STANDARD,
    ));
    rows.push(AlgorithmPreset::base("diamond", &diamond).multipliers(1.0, 256.0, 256.0));

    let whirlpoolx = OpsHandle::new(SingleOps::new(
        AlgorithmType::WhirlpoolX,
        PowHash::External,
        MerkleHash::Sha256d,
        HeaderLayout::STANDARD,
    ));
    rows.push(AlgorithmPreset::base("whirlpoolx", &whirlpoolx));

    let credits = OpsHandle::new(SingleOps::new(
        AlgorithmType::Credits,
        PowHash::Sha256d,
        MerkleHash::Sha256d,
        HeaderLayout::CREDITS,
    ));
    rows.push(AlgorithmPreset {
        diff_numerator: 0xFF_FFFF,
        cq_properties: QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE,
        ..AlgorithmPreset::base("credits", &credits)
    });

    let sia = OpsHandle::new(SingleOps::new(
        AlgorithmType::Sia,
        PowHash::Blake2b256,
        MerkleHash::Blake2b256,
        HeaderLayout::SIA,
    ));
    rows.push(AlgorithmPreset::base("sia", &sia));
}

fn blake_rows(rows: &mut Vec<AlgorithmPreset>) {
    let blake_row = |name: &'static str, ops: &OpsHandle| AlgorithmPreset {
        found_idx: 0x7F,
        diff1targ: 0x0000_00FF,
        rw_buffer_size: RwBuffer::Fixed(128),
        ..AlgorithmPreset::base(name, ops)
    };

    let blakecoin = OpsHandle::new(BlakeOps::new(AlgorithmType::Blakecoin, MerkleHash::Sha256, CompileStyle::Blake(8)));
    rows.push(blake_row("blake256r8", &blakecoin));

    let blake = OpsHandle::new(BlakeOps::new(AlgorithmType::Blake, MerkleHash::Sha256d, CompileStyle::Blake(14)));
    rows.push(blake_row("blake256r14", &blake));

    let vanilla = OpsHandle::new(BlakeOps::new(AlgorithmType::Vanilla, MerkleHash::Sha256d, CompileStyle::Plain));
    rows.push(blake_row("vanilla", &vanilla));

    let decred = OpsHandle::new(BlakeOps::new(AlgorithmType::Decred, MerkleHash::Sha256d, CompileStyle::Blake(14)));
    rows.push(AlgorithmPreset {
        diff1targ: 0x0000_00FF,
        ..AlgorithmPreset::base("decred", &decred)
    });
}

lazy_static! {
    static ref PRESETS: Vec<AlgorithmPreset> = {
        let mut rows = Vec::with_capacity(48);
        scrypt_rows(&mut rows);
        chain_rows(&mut rows);
        single_rows(&mut rows);
        blake_rows(&mut rows);
        rows
    };

    static ref UNKNOWN_OPS: OpsHandle = OpsHandle::new(UnknownOps);
}

/// Alternate names and the row each one selects
const ALIASES: &[(&str, &str)] = &[
    ("scrypt", "ckolivas"),
    ("adaptive-nfactor", "nscrypt"),
    ("adaptive-n-factor", "nscrypt"),
    ("adaptive-nscrypt", "nscrypt"),
    ("adaptive-n-scrypt", "nscrypt"),
    ("x11", "darkcoin-mod"),
    ("x11mod", "darkcoin-mod"),
    ("x13", "marucoin-mod"),
    ("x13mod", "marucoin-mod"),
    ("x13old", "marucoin-modold"),
    ("x13modold", "marucoin-modold"),
    ("x15", "bitblock"),
    ("x15mod", "bitblock"),
    ("x15old", "bitblockold"),
    ("x15modold", "bitblockold"),
    ("nist5", "talkcoin-mod"),
    ("keccak", "maxcoin"),
    ("whirlpool", "whirlcoin"),
    ("lyra2", "lyra2re"),
    ("lyra2v2", "lyra2rev2"),
    ("blakecoin", "blake256r8"),
    ("blake", "blake256r14"),
];

fn find(name: &str) -> Option<&'static AlgorithmPreset> {
    PRESETS.iter().find(|p| p.name.as_str().eq_ignore_ascii_case(name))
}

/// Finds the row for `name` or one of its aliases, ignoring ASCII case
///
/// Names must match exactly; prefixes never select a row.
pub fn lookup(name: &str) -> Option<&'static AlgorithmPreset> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map_or(name, |&(_, target)| target);
    find(canonical)
}

/// Every row name, in catalog order
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name.as_str())
}

/// Every alias with the row name it selects
pub fn aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    ALIASES.iter().copied()
}

/// All rows
pub fn presets() -> &'static [AlgorithmPreset] {
    &PRESETS
}

pub(crate) fn unknown_ops() -> OpsHandle {
    UNKNOWN_OPS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for name in names() {
            assert!(seen.insert(name.to_ascii_lowercase()), "duplicate {}", name);
        }
    }

    #[test]
    fn aliases_point_at_rows_and_never_shadow_them() {
        for (alias, target) in aliases() {
            assert!(find(target).is_some(), "{} -> {}", alias, target);
            assert!(find(alias).is_none(), "alias {} shadows a row", alias);
        }
    }

    #[test]
    fn every_identity_except_unknown_has_a_row() {
        let covered: HashSet<AlgorithmType> = presets().iter().map(|p| p.algorithm_type).collect();
        for ty in AlgorithmType::ALL {
            assert_eq!(covered.contains(&ty), ty != AlgorithmType::Unknown, "{}", ty);
        }
    }

    #[test]
    fn rows_of_one_family_share_their_slots() {
        let a = lookup("ckolivas").unwrap();
        let b = lookup("zuikkis").unwrap();
        assert_eq!(a.ops, b.ops);
        assert_ne!(a.ops, lookup("nscrypt").unwrap().ops);
    }

    #[test]
    fn lookup_is_exact() {
        assert!(lookup("SCRYPT").is_some());
        assert!(lookup("darkcoin-mod ").is_none());
        assert!(lookup("ckoliv").is_none());
        assert!(lookup("").is_none());
    }

    /// name, multipliers (diff1, diff2, share), shifts (x, standard),
    /// found_idx, diff_numerator, diff1targ, extra kernels, scratch,
    /// out-of-order queue, default nfactor
    type Row = (&'static str, [f64; 3], [u32; 2], u32, u64, u32, usize, RwBuffer, bool, u8);

    const SCRYPT_NUM: u64 = 0xFFFF_FFFF;
    const NEO_NUM: u64 = 0xFFFF_0000_0000_0000;

    #[rustfmt::skip]
    const ROWS: &[Row] = &[
        ("ckolivas",           [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("alexkarnew",         [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("alexkarnold",        [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("bufius",             [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("psw",                [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("zuikkis",            [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("arebyp",             [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 10),
        ("nscrypt",            [1.0, 65536.0, 65536.0], [0, 0],  0xFF, SCRYPT_NUM, 0xFFFF, 0,  RwBuffer::None, true, 11),
        ("neoscrypt",          [1.0, 65536.0, 65536.0], [0, 0],  0xFF, NEO_NUM,    0xFFFF, 0,  RwBuffer::None, true, 10),
        ("pluck",              [1.0, 65536.0, 65536.0], [0, 0],  0xFF, NEO_NUM,    0xFFFF, 0,  RwBuffer::None, true, 10),
        ("yescrypt",           [1.0, 65536.0, 65536.0], [0, 0],  0xFF, NEO_NUM,    0xFFFF, 0,  RwBuffer::None, true, 10),
        ("yescrypt-multi",     [1.0, 65536.0, 65536.0], [0, 0],  0xFF, NEO_NUM,    0xFFFF, 2,  RwBuffer::None, true, 10),
        ("quarkcoin",          [256.0, 256.0, 256.0],   [0, 0],  0xFF, 0xFF_FFFF,  0xFFFF, 0,  RwBuffer::None, false, 10),
        ("qubitcoin",          [256.0, 256.0, 256.0],   [0, 0],  0xFF, 0xFF_FFFF,  0xFFFF, 0,  RwBuffer::None, false, 10),
        ("animecoin",          [256.0, 256.0, 256.0],   [0, 0],  0xFF, 0xFF_FFFF,  0xFFFF, 0,  RwBuffer::None, false, 10),
        ("sifcoin",            [256.0, 256.0, 256.0],   [0, 0],  0xFF, 0xFF_FFFF,  0xFFFF, 0,  RwBuffer::None, false, 10),
        ("darkcoin",           [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("inkcoin",            [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("myriadcoin-groestl", [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("darkcoin-mod",       [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 10, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("twecoin",            [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("marucoin",           [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("marucoin-mod",       [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 12, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("marucoin-modold",    [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 10, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("x14",                [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 13, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("x14old",             [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 10, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("bitblock",           [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 14, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("bitblockold",        [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 10, RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("talkcoin-mod",       [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 4,  RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("fresh",              [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 4,  RwBuffer::Fixed(4 * 16 * 4_194_304), false, 10),
        ("whirlcoin",          [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 3,  RwBuffer::Fixed(MOD_SCRATCH), false, 10),
        ("lyra2re",            [1.0, 128.0, 128.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 4,  RwBuffer::Fixed(2 * 8 * 4_194_304), false, 10),
        ("lyra2rev2",          [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 6,  RwBuffer::PerThread(128), false, 10),
        ("lbry",               [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 2,  RwBuffer::Fixed(4 * 8 * 4_194_304), false, 10),
        ("maxcoin",            [1.0, 256.0, 1.0],       [4, 15], 0x0F, 0xFFFF,     0xFF,   0,  RwBuffer::None, false, 10),
        ("fuguecoin",          [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("groestlcoin",        [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("diamond",            [1.0, 256.0, 256.0],     [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("whirlpoolx",         [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("credits",            [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFF_FFFF,  0xFFFF, 0,  RwBuffer::None, true, 10),
        ("sia",                [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFFFF, 0,  RwBuffer::None, false, 10),
        ("blake256r8",         [1.0, 1.0, 1.0],         [0, 0],  0x7F, 0xFFFF,     0xFF,   0,  RwBuffer::Fixed(128), false, 10),
        ("blake256r14",        [1.0, 1.0, 1.0],         [0, 0],  0x7F, 0xFFFF,     0xFF,   0,  RwBuffer::Fixed(128), false, 10),
        ("vanilla",            [1.0, 1.0, 1.0],         [0, 0],  0x7F, 0xFFFF,     0xFF,   0,  RwBuffer::Fixed(128), false, 10),
        ("decred",             [1.0, 1.0, 1.0],         [0, 0],  0xFF, 0xFFFF,     0xFF,   0,  RwBuffer::None, false, 10),
    ];

    #[test]
    fn rows_carry_reference_columns() {
        assert_eq!(ROWS.len(), presets().len());
        for &(name, [m1, m2, share], [xshift, shift], found_idx, numerator, diff1targ, extra, rw, ooo, nf) in ROWS {
            let p = find(name).unwrap_or_else(|| panic!("missing row {}", name));
            assert_eq!(
                [p.diff_multiplier1, p.diff_multiplier2, p.share_diff_multiplier],
                [m1, m2, share],
                "{} multipliers",
                name
            );
            assert_eq!([p.xintensity_shift, p.intensity_shift], [xshift, shift], "{} shifts", name);
            assert_eq!(p.found_idx, found_idx, "{} found_idx", name);
            assert_eq!(p.diff_numerator, numerator, "{} diff_numerator", name);
            assert_eq!(p.diff1targ, diff1targ, "{} diff1targ", name);
            assert_eq!(p.n_extra_kernels, extra, "{} extra kernels", name);
            assert_eq!(p.rw_buffer_size, rw, "{} scratch", name);
            assert_eq!(
                p.cq_properties.contains(QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE),
                ooo,
                "{} queue",
                name
            );
            assert_eq!(p.default_nfactor, nf, "{} nfactor", name);
        }
    }

    #[test]
    fn memory_hard_rows_request_out_of_order_queues() {
        for preset in presets() {
            if preset.algorithm_type.is_memory_hard() {
                assert!(
                    preset.cq_properties.contains(QueueProperties::OUT_OF_ORDER_EXEC_MODE_ENABLE),
                    "{}",
                    preset.name
                );
            }
        }
    }
}
