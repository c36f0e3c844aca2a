//! # numkit-core: Numeric Encoding and Unit Conversion
//!
//! Pure library behind the `numkit` command line tool. No I/O of any kind.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          numkit Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    numkit-cli (binary)                          │   │
//! │  │    clap args ──► NumkitConfig ──► command handlers ──► stdout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ numkit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  decimal  │  │   base    │  │   unit    │  │ validation│  │   │
//! │  │   │  Decimal  │  │ Alphabet  │  │ Duration  │  │ alphabets │  │   │
//! │  │   │ Rounding  │  │ Converter │  │ FileSize  │  │   rates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILES • NO ENVIRONMENT • NO NETWORK • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`decimal`] - Arbitrary-precision decimal with rounding modes
//! - [`base`] - Integer ↔ string encoding over custom alphabets
//! - [`unit`] - Quantities with units: convert, parse, humanize
//! - [`error`] - Error types
//! - [`validation`] - Alphabet and exchange-rate checks
//!
//! ## Example Usage
//!
//! ```rust
//! use numkit_core::{BaseConverter, Duration, FileSize, HumanizeOptions};
//!
//! let short_id = BaseConverter::default().encode(&12345.into()).unwrap();
//! assert_eq!(short_id, "9IX");
//!
//! let elapsed = Duration::parse("1h 2m 3s", None).unwrap();
//! let options = HumanizeOptions::new().units(["h", "m", "s"]);
//! assert_eq!(elapsed.humanize(&options).unwrap(), "1h 2m 3s");
//!
//! let size = FileSize::new(1, "megabytes").unwrap();
//! assert_eq!(size.to_bytes().unwrap().to_string(), "1048576");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod base;
pub mod decimal;
pub mod error;
pub mod unit;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use base::{Alphabet, BaseConverter, BuiltinAlphabet};
pub use decimal::{Decimal, RoundingMode};
pub use error::{CoreError, CoreResult, ValidationError};
pub use num_bigint::BigInt;
pub use unit::{Duration, FileSize, HumanizeOptions, Quantity, Suffix, UnitConverter, UnitTable};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fractional digits kept when a division does not terminate and the
/// caller gave no scale.
pub const DEFAULT_DIVISION_SCALE: u32 = 32;

/// Largest scale (fractional digits) a `Decimal` may be parsed with or
/// rounded to. Also bounds the exponent of `1e…` literals.
pub const MAX_DECIMAL_SCALE: u32 = 1_000;

/// Smallest usable alphabet: radix 2.
pub const MIN_ALPHABET_SYMBOLS: usize = 2;
