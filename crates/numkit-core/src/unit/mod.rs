//! # Unit Module
//!
//! Quantities with units: conversion, composite parsing and humanized
//! breakdowns.
//!
//! ## Module Layout
//! ```text
//! unit/
//! ├── table.rs      - UnitTable: rates, aliases, atom/default unit
//! ├── tokens.rs     - "1h 30m" scanner
//! ├── converter.rs  - UnitConverter<D>: the value type
//! ├── humanize.rs   - greedy breakdown, Suffix, HumanizeOptions
//! ├── duration.rs   - Duration = UnitConverter<DurationUnits>
//! └── file_size.rs  - FileSize = UnitConverter<FileSizeUnits>
//! ```
//!
//! A [`UnitSystem`] marker supplies the built-in table of a domain. Values of
//! one system share that table until one of them changes its rates.

/// Writes `to_<unit>()` shortcuts for a built-in system.
macro_rules! unit_shortcuts {
    ($system:ty { $($method:ident => $unit:literal),+ $(,)? }) => {
        impl $crate::unit::UnitConverter<$system> {
            $(
                #[doc = concat!("Magnitude in ", $unit, ".")]
                pub fn $method(&self) -> $crate::error::CoreResult<$crate::decimal::Decimal> {
                    self.to($unit)
                }
            )+
        }
    };
}

pub(crate) use unit_shortcuts;

mod converter;
mod duration;
mod file_size;
mod humanize;
mod table;
mod tokens;

use std::sync::{Arc, OnceLock};

pub use converter::{Quantity, UnitConverter};
pub use duration::{Duration, DurationUnits};
pub use file_size::{FileSize, FileSizeUnits};
pub use humanize::{HumanizeOptions, Suffix, SuffixFn};
pub use table::{UnitNormalizer, UnitTable};

/// Supplies the initial exchange table of a unit domain.
pub trait UnitSystem {
    fn unit_table() -> Arc<UnitTable>;
}

/// Caller-defined units. Starts from an empty table; build values with
/// [`UnitConverter::with_table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomUnits;

impl UnitSystem for CustomUnits {
    fn unit_table() -> Arc<UnitTable> {
        static TABLE: OnceLock<Arc<UnitTable>> = OnceLock::new();
        Arc::clone(TABLE.get_or_init(|| Arc::new(UnitTable::empty())))
    }
}
