//! # File Size
//!
//! Storage quantities from bits to yottabytes.
//!
//! ```text
//! ┌────────────┬────────────────────────────────┬────────────────┐
//! │ Unit       │ Bits                           │ Aliases        │
//! ├────────────┼────────────────────────────────┼────────────────┤
//! │ bits       │ 1                              │ b, bit         │  ← atom
//! │ bytes      │ 8                              │ B, byte        │  ← default
//! │ kilobytes  │ 8 × 1024                       │ kb, kilobyte   │
//! │ kibibytes  │ 8 × 1024                       │ kib, kibibyte  │
//! │ megabytes  │ 8 × 1024²                      │ mb, megabyte   │
//! │ …          │                                │                │
//! │ yottabytes │ 8 × 1024⁸                      │ yb, yottabyte  │
//! └────────────┴────────────────────────────────┴────────────────┘
//! ```
//!
//! `kilobytes` through `yottabytes` carry the binary (1024-based) magnitudes,
//! so `kilobytes` and `kibibytes` are the same size. Existing callers depend
//! on these numbers; a 1000-based unit can be added with
//! `with_added_unit_exchange_rate`.
//!
//! `"B"` is bytes and `"b"` is bits: exact-case aliases are matched first.

use std::sync::{Arc, OnceLock};

use super::converter::UnitConverter;
use super::table::{StaticRate, UnitTable};
use super::UnitSystem;

pub const UNIT_BITS: &str = "bits";
pub const UNIT_BYTES: &str = "bytes";
pub const UNIT_KILOBYTES: &str = "kilobytes";
pub const UNIT_KIBIBYTES: &str = "kibibytes";
pub const UNIT_MEGABYTES: &str = "megabytes";
pub const UNIT_GIGABYTES: &str = "gigabytes";
pub const UNIT_TERABYTES: &str = "terabytes";
pub const UNIT_PETABYTES: &str = "petabytes";
pub const UNIT_EXABYTES: &str = "exabytes";
pub const UNIT_ZETTABYTES: &str = "zettabytes";
pub const UNIT_YOTTABYTES: &str = "yottabytes";

const RATES: &[StaticRate] = &[
    (UNIT_BITS, 1, 0),
    (UNIT_BYTES, 8, 0),
    (UNIT_KILOBYTES, 8_192, 0),
    (UNIT_KIBIBYTES, 8_192, 0),
    (UNIT_MEGABYTES, 8_388_608, 0),
    (UNIT_GIGABYTES, 8_589_934_592, 0),
    (UNIT_TERABYTES, 8_796_093_022_208, 0),
    (UNIT_PETABYTES, 9_007_199_254_740_992, 0),
    (UNIT_EXABYTES, 9_223_372_036_854_775_808, 0),
    (UNIT_ZETTABYTES, 9_444_732_965_739_290_427_392, 0),
    (UNIT_YOTTABYTES, 9_671_406_556_917_033_397_649_408, 0),
];

const ALIASES: &[(&str, &str)] = &[
    ("b", UNIT_BITS),
    ("bit", UNIT_BITS),
    ("B", UNIT_BYTES),
    ("byte", UNIT_BYTES),
    ("kb", UNIT_KILOBYTES),
    ("kilobyte", UNIT_KILOBYTES),
    ("kib", UNIT_KIBIBYTES),
    ("kibibyte", UNIT_KIBIBYTES),
    ("mb", UNIT_MEGABYTES),
    ("megabyte", UNIT_MEGABYTES),
    ("gb", UNIT_GIGABYTES),
    ("gigabyte", UNIT_GIGABYTES),
    ("tb", UNIT_TERABYTES),
    ("terabyte", UNIT_TERABYTES),
    ("pb", UNIT_PETABYTES),
    ("petabyte", UNIT_PETABYTES),
    ("eb", UNIT_EXABYTES),
    ("exabyte", UNIT_EXABYTES),
    ("zb", UNIT_ZETTABYTES),
    ("zettabyte", UNIT_ZETTABYTES),
    ("yb", UNIT_YOTTABYTES),
    ("yottabyte", UNIT_YOTTABYTES),
];

/// Built-in storage units.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSizeUnits;

impl UnitSystem for FileSizeUnits {
    fn unit_table() -> Arc<UnitTable> {
        static TABLE: OnceLock<Arc<UnitTable>> = OnceLock::new();
        Arc::clone(
            TABLE.get_or_init(|| Arc::new(UnitTable::builtin(RATES, ALIASES, UNIT_BITS, UNIT_BYTES))),
        )
    }
}

/// A storage quantity.
///
/// ## Example
/// ```rust
/// use numkit_core::{FileSize, HumanizeOptions};
///
/// let upload = FileSize::parse("1.5 GB", None).unwrap();
/// assert_eq!(upload.to_megabytes().unwrap().to_string(), "1536");
///
/// let options = HumanizeOptions::new().units(["GB", "MB"]);
/// assert_eq!(upload.humanize(&options).unwrap(), "1GB 512MB");
/// ```
pub type FileSize = UnitConverter<FileSizeUnits>;

super::unit_shortcuts!(FileSizeUnits {
    to_bits => "bits",
    to_bytes => "bytes",
    to_kilobytes => "kilobytes",
    to_kibibytes => "kibibytes",
    to_megabytes => "megabytes",
    to_gigabytes => "gigabytes",
    to_terabytes => "terabytes",
    to_petabytes => "petabytes",
    to_exabytes => "exabytes",
    to_zettabytes => "zettabytes",
    to_yottabytes => "yottabytes",
});
