//! # Error Types
//!
//! Domain-specific error types for numkit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  numkit-core errors (this file)                                        │
//! │  ├── CoreError        - Conversion failures                            │
//! │  └── ValidationError  - Bad alphabets, rates, unit names               │
//! │                                                                         │
//! │  numkit-cli errors (separate crate)                                    │
//! │  └── CliError         - Config file, I/O, argument failures            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is caused by the caller's input or configuration. Nothing
//! here is transient, so nothing is retried.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Conversion errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Text could not be read as a number, encoded value or quantity.
    ///
    /// ## When This Occurs
    /// - `decode()` meets a symbol outside the alphabet, or an empty string
    /// - `parse()` finds no `<number><unit>` token
    /// - A decimal literal is malformed (`"1.2.3"`)
    #[error("Invalid format for '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },

    /// A value falls outside what the operation can represent.
    ///
    /// ## When This Occurs
    /// - `encode()` receives a value that is negative after the offset
    /// - A duration does not fit `std::time::Duration` / `chrono::TimeDelta`
    #[error("Value {value} is out of range: {reason}")]
    OutOfRange { value: String, reason: String },

    /// Unit missing from the exchange table (after alias normalization).
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Alphabet or exchange table is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// Division by a zero decimal.
    #[error("Division by zero")]
    DivisionByZero,

    /// `RoundingMode::Unnecessary` was requested but the result is inexact.
    #[error("Rounding necessary to represent the result at scale {scale}")]
    RoundingNecessary { scale: u32 },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Configuration validation errors.
///
/// Raised while building an [`Alphabet`](crate::base::Alphabet) or a
/// [`UnitTable`](crate::unit::UnitTable), before any conversion runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Not enough symbols to form a positional system.
    #[error("{field} must have at least {min} symbols, got {actual}")]
    TooFewSymbols {
        field: String,
        min: usize,
        actual: usize,
    },

    /// The same symbol appears twice in an alphabet.
    #[error("{field} contains duplicate symbol '{symbol}' at position {position}")]
    DuplicateSymbol {
        field: String,
        symbol: char,
        position: usize,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn invalid_format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(value: impl ToString, reason: impl Into<String>) -> Self {
        CoreError::OutOfRange {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownUnit("fortnights".to_string());
        assert_eq!(err.to_string(), "Unknown unit: fortnights");

        let err = CoreError::invalid_format("1h2", "no unit suffix");
        assert_eq!(err.to_string(), "Invalid format for '1h2': no unit suffix");

        let err = CoreError::out_of_range(-3, "negative after offset");
        assert_eq!(err.to_string(), "Value -3 is out of range: negative after offset");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooFewSymbols {
            field: "alphabet".to_string(),
            min: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "alphabet must have at least 2 symbols, got 1"
        );

        let err = ValidationError::DuplicateSymbol {
            field: "alphabet".to_string(),
            symbol: 'A',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "alphabet contains duplicate symbol 'A' at position 3"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidConfiguration(_)));
    }
}
