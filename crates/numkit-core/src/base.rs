//! # Base Conversion Module
//!
//! Maps non-negative integers of any size to short strings over a symbol
//! alphabet, and back. Typical uses: public IDs, short links, sortable
//! tokens.
//!
//! ## Positional Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  encode(12345) with BASE36 ("0-9A-Z", radix 36)                         │
//! │                                                                         │
//! │    12345 mod 36 = 33 → 'X'      12345 / 36 = 342                        │
//! │      342 mod 36 = 18 → 'I'        342 / 36 = 9                          │
//! │        9 mod 36 =  9 → '9'          9 / 36 = 0  (stop)                  │
//! │                                                                         │
//! │    digits are produced least-significant first → "9IX"                  │
//! │                                                                         │
//! │  decode("9IX") (Horner):  ((0×36 + 9)×36 + 18)×36 + 33 = 12345          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Offset
//! The offset is added before encoding and subtracted after decoding, so
//! small IDs can be pushed into longer, less guessable strings:
//! `encode(n, offset = k) == encode(n + k, offset = 0)`.
//!
//! ## Usage
//! ```rust
//! use numkit_core::base::{BaseConverter, BuiltinAlphabet};
//! use numkit_core::BigInt;
//!
//! let converter = BaseConverter::default(); // BASE36, offset 0
//! assert_eq!(converter.encode(&BigInt::from(12345)).unwrap(), "9IX");
//! assert_eq!(converter.decode("9IX").unwrap(), BigInt::from(12345));
//!
//! let short_ids = converter.with_builtin(BuiltinAlphabet::Base58).with_offset(1_000_000);
//! let id = short_ids.encode(&BigInt::from(42)).unwrap();
//! assert_eq!(short_ids.decode(&id).unwrap(), BigInt::from(42));
//! ```

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::trace;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_alphabet;

// =============================================================================
// Built-in Alphabets
// =============================================================================

/// RFC 4648 base32.
pub const BASE32: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// RFC 4648 base32 with the extended hex alphabet (sort order preserved).
pub const BASE32_HEX: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Digits then upper-case letters.
pub const BASE36: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letters then digits. Kept for identifiers already issued with this ordering.
pub const BASE36_LETTERS_FIRST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Bitcoin alphabet: no `0`, `O`, `I`, `l`.
pub const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Digits, lower-case, upper-case.
pub const BASE62: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// BASE62 plus `-` and `_`, safe in URLs and file names.
pub const BASE64_SAFE: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-_";

/// Named built-in alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BuiltinAlphabet {
    Base32,
    Base32Hex,
    #[default]
    Base36,
    Base36LettersFirst,
    Base58,
    Base62,
    Base64Safe,
}

impl BuiltinAlphabet {
    /// Every built-in, in radix order.
    pub const ALL: [BuiltinAlphabet; 7] = [
        BuiltinAlphabet::Base32,
        BuiltinAlphabet::Base32Hex,
        BuiltinAlphabet::Base36,
        BuiltinAlphabet::Base36LettersFirst,
        BuiltinAlphabet::Base58,
        BuiltinAlphabet::Base62,
        BuiltinAlphabet::Base64Safe,
    ];

    /// The symbol string.
    pub const fn symbols(&self) -> &'static str {
        match self {
            BuiltinAlphabet::Base32 => BASE32,
            BuiltinAlphabet::Base32Hex => BASE32_HEX,
            BuiltinAlphabet::Base36 => BASE36,
            BuiltinAlphabet::Base36LettersFirst => BASE36_LETTERS_FIRST,
            BuiltinAlphabet::Base58 => BASE58,
            BuiltinAlphabet::Base62 => BASE62,
            BuiltinAlphabet::Base64Safe => BASE64_SAFE,
        }
    }
}

impl fmt::Display for BuiltinAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinAlphabet::Base32 => "base32",
            BuiltinAlphabet::Base32Hex => "base32hex",
            BuiltinAlphabet::Base36 => "base36",
            BuiltinAlphabet::Base36LettersFirst => "base36-letters-first",
            BuiltinAlphabet::Base58 => "base58",
            BuiltinAlphabet::Base62 => "base62",
            BuiltinAlphabet::Base64Safe => "base64safe",
        };
        f.write_str(name)
    }
}

impl FromStr for BuiltinAlphabet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(|c: char| c == '-' || c == '_', "").as_str() {
            "base32" => Ok(BuiltinAlphabet::Base32),
            "base32hex" => Ok(BuiltinAlphabet::Base32Hex),
            "base36" => Ok(BuiltinAlphabet::Base36),
            "base36lettersfirst" | "base36legacy" => Ok(BuiltinAlphabet::Base36LettersFirst),
            "base58" | "bitcoin" => Ok(BuiltinAlphabet::Base58),
            "base62" => Ok(BuiltinAlphabet::Base62),
            "base64safe" | "base64url" => Ok(BuiltinAlphabet::Base64Safe),
            _ => Err(CoreError::invalid_format(
                s,
                "unknown alphabet name, expected one of: base32, base32hex, base36, \
                 base36-letters-first, base58, base62, base64safe",
            )),
        }
    }
}

// =============================================================================
// Alphabet
// =============================================================================

/// A validated symbol alphabet: radix = number of symbols, digit `i` is
/// written as symbol `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    positions: HashMap<char, u32>,
}

impl Alphabet {
    /// Builds an alphabet from a symbol string.
    ///
    /// Fails with `InvalidConfiguration` on fewer than 2 symbols or a
    /// repeated symbol.
    pub fn new(symbols: &str) -> CoreResult<Self> {
        let symbols = validate_alphabet(symbols)?;
        let positions = symbols
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i as u32))
            .collect();

        Ok(Alphabet { symbols, positions })
    }

    /// One of the built-in alphabets.
    pub fn builtin(alphabet: BuiltinAlphabet) -> Self {
        let symbols: Vec<char> = alphabet.symbols().chars().collect();
        let positions = symbols
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i as u32))
            .collect();

        Alphabet { symbols, positions }
    }

    /// Number of symbols.
    pub fn radix(&self) -> u32 {
        self.symbols.len() as u32
    }

    /// Symbol for digit `digit`.
    pub fn symbol(&self, digit: u32) -> Option<char> {
        self.symbols.get(digit as usize).copied()
    }

    /// Digit value of `symbol`.
    pub fn position(&self, symbol: char) -> Option<u32> {
        self.positions.get(&symbol).copied()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::builtin(BuiltinAlphabet::default())
    }
}

impl From<BuiltinAlphabet> for Alphabet {
    fn from(alphabet: BuiltinAlphabet) -> Self {
        Alphabet::builtin(alphabet)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// Accepts a built-in name (`"base58"`) or a literal symbol string.
///
/// Names win: a literal alphabet that happens to spell a built-in name
/// must go through [`Alphabet::new`].
impl FromStr for Alphabet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<BuiltinAlphabet>() {
            Ok(builtin) => Ok(Alphabet::builtin(builtin)),
            Err(_) => Alphabet::new(s),
        }
    }
}

// =============================================================================
// Base Converter
// =============================================================================

/// Encoder/decoder for one alphabet and offset.
///
/// Stateless apart from its configuration: every call is independent, and
/// the `with_*`/`use_*` methods return new converters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BaseConverter {
    alphabet: Alphabet,
    offset: BigInt,
}

impl BaseConverter {
    /// Creates a converter with offset 0.
    pub fn new(alphabet: Alphabet) -> Self {
        BaseConverter {
            alphabet,
            offset: BigInt::zero(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn offset(&self) -> &BigInt {
        &self.offset
    }

    pub fn with_alphabet(&self, alphabet: Alphabet) -> Self {
        BaseConverter {
            alphabet,
            offset: self.offset.clone(),
        }
    }

    pub fn with_builtin(&self, alphabet: BuiltinAlphabet) -> Self {
        self.with_alphabet(Alphabet::builtin(alphabet))
    }

    pub fn with_offset(&self, offset: impl Into<BigInt>) -> Self {
        BaseConverter {
            alphabet: self.alphabet.clone(),
            offset: offset.into(),
        }
    }

    pub fn use_base32(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base32)
    }

    pub fn use_base32_hex(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base32Hex)
    }

    pub fn use_base36(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base36)
    }

    pub fn use_base58(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base58)
    }

    pub fn use_base62(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base62)
    }

    pub fn use_base64_safe(&self) -> Self {
        self.with_builtin(BuiltinAlphabet::Base64Safe)
    }

    /// Encodes `value + offset`, most significant symbol first.
    ///
    /// Fails with `OutOfRange` if `value + offset` is negative.
    pub fn encode(&self, value: &BigInt) -> CoreResult<String> {
        let mut n = value + &self.offset;
        if n.is_negative() {
            return Err(CoreError::out_of_range(
                value,
                format!("value plus offset {} is negative", self.offset),
            ));
        }

        let radix = BigInt::from(self.alphabet.radix());
        let mut digits = Vec::new();
        loop {
            let (quotient, remainder) = n.div_mod_floor(&radix);
            digits.push(self.digit_symbol(&remainder)?);
            n = quotient;
            if n.is_zero() {
                break;
            }
        }
        digits.reverse();

        let encoded: String = digits.into_iter().collect();
        trace!(radix = self.alphabet.radix(), %encoded, "encoded integer");
        Ok(encoded)
    }

    /// Encodes a decimal integer given as text (`"12345"`).
    pub fn encode_str(&self, value: &str) -> CoreResult<String> {
        let value: BigInt = value
            .trim()
            .parse()
            .map_err(|_| CoreError::invalid_format(value, "not a decimal integer"))?;
        self.encode(&value)
    }

    /// Decodes `text` and subtracts the offset.
    ///
    /// The result is negative when the offset exceeds the decoded magnitude;
    /// that is a legitimate outcome, not an error.
    pub fn decode(&self, text: &str) -> CoreResult<BigInt> {
        if text.is_empty() {
            return Err(CoreError::invalid_format(text, "empty string"));
        }

        let radix = BigInt::from(self.alphabet.radix());
        let mut result = BigInt::zero();
        for (i, symbol) in text.chars().enumerate() {
            let digit = self.alphabet.position(symbol).ok_or_else(|| {
                CoreError::invalid_format(
                    text,
                    format!("symbol '{}' at position {} is not in the alphabet", symbol, i),
                )
            })?;
            result = result * &radix + digit;
        }

        trace!(radix = self.alphabet.radix(), len = text.len(), "decoded string");
        Ok(result - &self.offset)
    }

    fn digit_symbol(&self, digit: &BigInt) -> CoreResult<char> {
        digit
            .to_u32()
            .and_then(|d| self.alphabet.symbol(d))
            .ok_or_else(|| CoreError::out_of_range(digit, "digit outside the alphabet"))
    }
}

// =============================================================================
// One-shot Helpers
// =============================================================================

/// Encodes `value` with a literal alphabet and offset.
///
/// ```rust
/// use numkit_core::base::{encode, BASE36};
/// use numkit_core::BigInt;
///
/// assert_eq!(encode(&BigInt::from(12345), BASE36, &BigInt::from(0)).unwrap(), "9IX");
/// ```
pub fn encode(value: &BigInt, alphabet: &str, offset: &BigInt) -> CoreResult<String> {
    BaseConverter::new(Alphabet::new(alphabet)?)
        .with_offset(offset.clone())
        .encode(value)
}

/// Decodes `text` with a literal alphabet and offset.
pub fn decode(text: &str, alphabet: &str, offset: &BigInt) -> CoreResult<BigInt> {
    BaseConverter::new(Alphabet::new(alphabet)?)
        .with_offset(offset.clone())
        .decode(text)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic spread of values below 10^30.
    fn sample_values() -> Vec<BigInt> {
        let modulus: BigInt = "1000000000000000000000000000000".parse().unwrap();
        let multiplier = BigInt::from(6364136223846793005u64);
        let increment = BigInt::from(1442695040888963407u64);

        let mut values: Vec<BigInt> = (0..100).map(BigInt::from).collect();
        let mut x = BigInt::from(12345);
        for _ in 0..300 {
            x = (&x * &multiplier + &increment) % &modulus;
            values.push(x.clone());
        }
        values.push(&modulus - BigInt::from(1));
        values
    }

    #[test]
    fn test_known_encoding() {
        let converter = BaseConverter::default();
        assert_eq!(converter.encode(&BigInt::from(12345)).unwrap(), "9IX");
        assert_eq!(converter.decode("9IX").unwrap(), BigInt::from(12345));

        let legacy = converter.with_builtin(BuiltinAlphabet::Base36LettersFirst);
        assert_eq!(legacy.encode(&BigInt::from(12345)).unwrap(), "JS7");
        assert_eq!(legacy.decode("JS7").unwrap(), BigInt::from(12345));
    }

    #[test]
    fn test_zero_is_first_symbol() {
        for builtin in BuiltinAlphabet::ALL {
            let converter = BaseConverter::new(builtin.into());
            let first = builtin.symbols().chars().next().unwrap();
            assert_eq!(converter.encode(&BigInt::zero()).unwrap(), first.to_string());
        }
    }

    #[test]
    fn test_round_trip_every_builtin() {
        let values = sample_values();
        for builtin in BuiltinAlphabet::ALL {
            let converter = BaseConverter::new(builtin.into());
            for n in &values {
                let encoded = converter.encode(n).unwrap();
                assert_eq!(&converter.decode(&encoded).unwrap(), n, "{} via {}", n, builtin);
            }
        }
    }

    #[test]
    fn test_round_trip_with_offset() {
        let converter = BaseConverter::default().use_base62().with_offset(987_654_321);
        for n in sample_values() {
            let encoded = converter.encode(&n).unwrap();
            assert_eq!(converter.decode(&encoded).unwrap(), n);
        }
    }

    #[test]
    fn test_length_is_monotonic() {
        let mut values = sample_values();
        values.sort();
        for builtin in BuiltinAlphabet::ALL {
            let converter = BaseConverter::new(builtin.into());
            for pair in values.windows(2) {
                let a = converter.encode(&pair[0]).unwrap();
                let b = converter.encode(&pair[1]).unwrap();
                assert!(a.chars().count() <= b.chars().count());
            }
        }
    }

    #[test]
    fn test_offset_is_a_shift() {
        let plain = BaseConverter::default().use_base58();
        let shifted = plain.with_offset(500);
        for n in sample_values() {
            assert_eq!(
                shifted.encode(&n).unwrap(),
                plain.encode(&(&n + BigInt::from(500))).unwrap()
            );
        }
    }

    #[test]
    fn test_negative_after_offset_is_out_of_range() {
        let converter = BaseConverter::default();
        let err = converter.encode(&BigInt::from(-1)).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange { .. }));

        let converter = converter.with_offset(-10);
        assert!(converter.encode(&BigInt::from(5)).is_err());
        assert_eq!(converter.encode(&BigInt::from(10)).unwrap(), "0");
    }

    #[test]
    fn test_decode_may_go_negative() {
        let converter = BaseConverter::default().with_offset(100);
        assert_eq!(converter.decode("1").unwrap(), BigInt::from(-99));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let converter = BaseConverter::default().use_base58();
        assert!(matches!(
            converter.decode("").unwrap_err(),
            CoreError::InvalidFormat { .. }
        ));
        // '0' is excluded from the bitcoin alphabet
        assert!(matches!(
            converter.decode("10").unwrap_err(),
            CoreError::InvalidFormat { .. }
        ));
        // Case matters
        assert!(BaseConverter::default().decode("9ix").is_err());
    }

    #[test]
    fn test_encode_str() {
        let converter = BaseConverter::default();
        assert_eq!(converter.encode_str(" 12345 ").unwrap(), "9IX");
        assert_eq!(
            converter.encode_str("1000000000000000000000000000000").unwrap(),
            converter
                .encode(&"1000000000000000000000000000000".parse().unwrap())
                .unwrap()
        );
        assert!(converter.encode_str("12.5").is_err());
        assert!(converter.encode_str("abc").is_err());
    }

    #[test]
    fn test_custom_alphabet() {
        let binary = BaseConverter::new(Alphabet::new("01").unwrap());
        assert_eq!(binary.encode(&BigInt::from(10)).unwrap(), "1010");

        let greek = BaseConverter::new(Alphabet::new("αβγ").unwrap());
        assert_eq!(greek.encode(&BigInt::from(5)).unwrap(), "βγ");
        assert_eq!(greek.decode("βγ").unwrap(), BigInt::from(5));

        assert!(matches!(
            Alphabet::new("0123401").unwrap_err(),
            CoreError::InvalidConfiguration(_)
        ));
        assert!(Alphabet::new("x").is_err());
    }

    #[test]
    fn test_builtin_alphabets_are_valid() {
        for builtin in BuiltinAlphabet::ALL {
            let validated = Alphabet::new(builtin.symbols()).unwrap();
            assert_eq!(validated, Alphabet::builtin(builtin));
        }
        assert_eq!(Alphabet::builtin(BuiltinAlphabet::Base32).radix(), 32);
        assert_eq!(Alphabet::builtin(BuiltinAlphabet::Base58).radix(), 58);
        assert_eq!(Alphabet::builtin(BuiltinAlphabet::Base64Safe).radix(), 64);
    }

    #[test]
    fn test_alphabet_parsing() {
        assert_eq!(
            "base58".parse::<Alphabet>().unwrap(),
            Alphabet::builtin(BuiltinAlphabet::Base58)
        );
        assert_eq!(
            "BASE36_LETTERS_FIRST".parse::<BuiltinAlphabet>().unwrap(),
            BuiltinAlphabet::Base36LettersFirst
        );
        assert_eq!("xyz".parse::<Alphabet>().unwrap().to_string(), "xyz");
        assert!("xx".parse::<Alphabet>().is_err());
    }

    #[test]
    fn test_one_shot_helpers() {
        let zero = BigInt::zero();
        assert_eq!(encode(&BigInt::from(12345), BASE36, &zero).unwrap(), "9IX");
        assert_eq!(decode("9IX", BASE36, &zero).unwrap(), BigInt::from(12345));
        assert!(encode(&BigInt::from(1), "aa", &zero).is_err());
    }
}
