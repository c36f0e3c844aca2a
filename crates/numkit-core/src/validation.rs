//! # Validation Module
//!
//! Configuration checks that run before any conversion does.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Happens                           │
//! │                                                                         │
//! │  Alphabet::new("0123…")      ──► validate_alphabet()                   │
//! │  UnitTable::new(…)           ──► validate_unit_name()                  │
//! │                                  validate_exchange_rate()              │
//! │  with_added_unit_exchange_rate() ──► validate_exchange_rate()          │
//! │                                                                         │
//! │  Once constructed, an Alphabet or UnitTable is known-good:             │
//! │  encode/decode/convert never re-check it.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::decimal::Decimal;
use crate::error::ValidationError;
use crate::MIN_ALPHABET_SYMBOLS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Alphabet Validators
// =============================================================================

/// Validates an encoding alphabet and returns its symbols in order.
///
/// ## Rules
/// - At least 2 symbols (radix 1 has no positional notation)
/// - Every symbol distinct, otherwise decoding would be ambiguous
///
/// ## Example
/// ```rust
/// use numkit_core::validation::validate_alphabet;
///
/// assert_eq!(validate_alphabet("01").unwrap(), vec!['0', '1']);
/// assert!(validate_alphabet("0").is_err());
/// assert!(validate_alphabet("0120").is_err());
/// ```
pub fn validate_alphabet(alphabet: &str) -> ValidationResult<Vec<char>> {
    let symbols: Vec<char> = alphabet.chars().collect();

    if symbols.len() < MIN_ALPHABET_SYMBOLS {
        return Err(ValidationError::TooFewSymbols {
            field: "alphabet".to_string(),
            min: MIN_ALPHABET_SYMBOLS,
            actual: symbols.len(),
        });
    }

    let mut seen: HashMap<char, usize> = HashMap::with_capacity(symbols.len());
    for (position, symbol) in symbols.iter().enumerate() {
        if seen.insert(*symbol, position).is_some() {
            return Err(ValidationError::DuplicateSymbol {
                field: "alphabet".to_string(),
                symbol: *symbol,
                position,
            });
        }
    }

    Ok(symbols)
}

// =============================================================================
// Unit Table Validators
// =============================================================================

/// Validates a unit name used as an exchange table key.
pub fn validate_unit_name(unit: &str) -> ValidationResult<()> {
    if unit.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    Ok(())
}

/// Validates an exchange rate.
///
/// ## Rules
/// - Must be strictly positive: rates are divisors during conversion
///
/// ## Example
/// ```rust
/// use numkit_core::decimal::Decimal;
/// use numkit_core::validation::validate_exchange_rate;
///
/// assert!(validate_exchange_rate("seconds", &Decimal::from(1)).is_ok());
/// assert!(validate_exchange_rate("never", &Decimal::zero()).is_err());
/// ```
pub fn validate_exchange_rate(unit: &str, rate: &Decimal) -> ValidationResult<()> {
    validate_unit_name(unit)?;

    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: format!("exchange rate of '{}'", unit),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_alphabet() {
        assert!(validate_alphabet("01").is_ok());
        assert!(validate_alphabet("0123456789abcdef").is_ok());
        assert!(validate_alphabet("αβγ").is_ok());

        assert!(matches!(
            validate_alphabet(""),
            Err(ValidationError::TooFewSymbols { actual: 0, .. })
        ));
        assert!(matches!(
            validate_alphabet("x"),
            Err(ValidationError::TooFewSymbols { actual: 1, .. })
        ));
        assert!(matches!(
            validate_alphabet("abca"),
            Err(ValidationError::DuplicateSymbol {
                symbol: 'a',
                position: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_unit_name() {
        assert!(validate_unit_name("seconds").is_ok());
        assert!(validate_unit_name("").is_err());
        assert!(validate_unit_name("   ").is_err());
    }

    #[test]
    fn test_validate_exchange_rate() {
        assert!(validate_exchange_rate("bits", &Decimal::from(1)).is_ok());
        assert!(validate_exchange_rate("ns", &"0.000000001".parse().unwrap()).is_ok());

        assert!(validate_exchange_rate("zero", &Decimal::zero()).is_err());
        assert!(validate_exchange_rate("negative", &Decimal::from(-1)).is_err());
        assert!(validate_exchange_rate("", &Decimal::from(1)).is_err());
    }
}
