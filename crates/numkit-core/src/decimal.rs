//! # Decimal Module
//!
//! Provides the `Decimal` type: an arbitrary-precision decimal number with
//! explicit, caller-chosen rounding.
//!
//! ## Why Not f64?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  1 nanosecond as f64 seconds:                                           │
//! │    1e-9 = 0.000000001000000000000000062...  ❌ NOT EXACT                │
//! │                                                                         │
//! │  1 yottabyte in bits:                                                   │
//! │    9671406556917033397649408 > 2^53        ❌ NOT REPRESENTABLE         │
//! │                                                                         │
//! │  OUR SOLUTION: unscaled BigInt + decimal scale                          │
//! │    0.000000001 = 1 × 10^-9                  ✅ EXACT                    │
//! │    Division rounds ONLY where the caller says so                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use numkit_core::decimal::{Decimal, RoundingMode};
//!
//! let ten: Decimal = "10".parse().unwrap();
//! let three = Decimal::from(3);
//!
//! // Exact when the quotient terminates
//! let half = Decimal::from(1).div(&Decimal::from(2), None, RoundingMode::HalfUp).unwrap();
//! assert_eq!(half.to_string(), "0.5");
//!
//! // Rounded at an explicit scale otherwise
//! let third = ten.div(&three, Some(2), RoundingMode::HalfUp).unwrap();
//! assert_eq!(third.to_string(), "3.33");
//! ```

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_DIVISION_SCALE, MAX_DECIMAL_SCALE};

// =============================================================================
// Rounding Mode
// =============================================================================

/// How to discard digits when a result does not fit the requested scale.
///
/// ## Cheat Sheet (to scale 0)
/// ```text
/// ┌────────────┬──────┬──────┬──────┬──────┬──────┐
/// │ Mode       │  2.5 │  1.6 │  1.1 │ -1.1 │ -2.5 │
/// ├────────────┼──────┼──────┼──────┼──────┼──────┤
/// │ Up         │   3  │   2  │   2  │  -2  │  -3  │
/// │ Down       │   2  │   1  │   1  │  -1  │  -2  │
/// │ Ceiling    │   3  │   2  │   2  │  -1  │  -2  │
/// │ Floor      │   2  │   1  │   1  │  -2  │  -3  │
/// │ HalfUp     │   3  │   2  │   1  │  -1  │  -3  │
/// │ HalfDown   │   2  │   2  │   1  │  -1  │  -2  │
/// │ HalfEven   │   2  │   2  │   1  │  -1  │  -2  │
/// │ Unnecessary│  err │  err │  err │  err │  err │
/// └────────────┴──────┴──────┴──────┴──────┴──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero (truncation).
    Down,
    /// Towards positive infinity.
    Ceiling,
    /// Towards negative infinity.
    Floor,
    /// Nearest neighbour, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbour, ties towards zero.
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour (Bankers Rounding).
    HalfEven,
    /// Refuse to round: inexact results are an error.
    Unnecessary,
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "half_up",
            RoundingMode::HalfDown => "half_down",
            RoundingMode::HalfEven => "half_even",
            RoundingMode::Unnecessary => "unnecessary",
        };
        f.write_str(name)
    }
}

impl FromStr for RoundingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "up" => Ok(RoundingMode::Up),
            "down" | "truncate" => Ok(RoundingMode::Down),
            "ceiling" | "ceil" => Ok(RoundingMode::Ceiling),
            "floor" => Ok(RoundingMode::Floor),
            "half_up" => Ok(RoundingMode::HalfUp),
            "half_down" => Ok(RoundingMode::HalfDown),
            "half_even" | "bankers" => Ok(RoundingMode::HalfEven),
            "unnecessary" | "exact" => Ok(RoundingMode::Unnecessary),
            _ => Err(CoreError::invalid_format(
                s,
                "expected one of: up, down, ceiling, floor, half_up, half_down, half_even, unnecessary",
            )),
        }
    }
}

// =============================================================================
// Decimal Type
// =============================================================================

/// Arbitrary-precision decimal: `unscaled × 10^-scale`.
///
/// ## Design Decisions
/// - **BigInt unscaled value**: no upper bound, yottabytes in bits fit easily
/// - **u32 scale**: number of fractional digits, never negative
/// - **Numeric equality**: `1.0 == 1.00`, the scale is not part of identity
/// - **Immutable**: every operation returns a new value
#[derive(Clone, Debug)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

/// `10^exp` as a BigInt.
fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

impl Decimal {
    /// Creates a decimal from an unscaled integer and a scale.
    ///
    /// ```rust
    /// use numkit_core::decimal::Decimal;
    /// use numkit_core::BigInt;
    ///
    /// let d = Decimal::new(BigInt::from(12345), 2);
    /// assert_eq!(d.to_string(), "123.45");
    /// ```
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        Decimal { unscaled, scale }
    }

    /// Zero at scale 0.
    pub fn zero() -> Self {
        Decimal::new(BigInt::zero(), 0)
    }

    /// One at scale 0.
    pub fn one() -> Self {
        Decimal::new(BigInt::one(), 0)
    }

    /// The unscaled integer.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// True for zero at any scale.
    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    /// Strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.unscaled.is_negative()
    }

    /// Strictly above zero.
    pub fn is_positive(&self) -> bool {
        self.unscaled.is_positive()
    }

    /// Absolute value, same scale.
    pub fn abs(&self) -> Self {
        Decimal::new(self.unscaled.abs(), self.scale)
    }

    /// Returns an equal value whose unscaled integer has no trailing zeros.
    ///
    /// ```rust
    /// use numkit_core::decimal::Decimal;
    ///
    /// let d: Decimal = "1.500".parse().unwrap();
    /// assert_eq!(d.strip_trailing_zeros().to_string(), "1.5");
    /// ```
    pub fn strip_trailing_zeros(&self) -> Self {
        if self.unscaled.is_zero() {
            return Decimal::zero();
        }

        let ten = BigInt::from(10u32);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while scale > 0 {
            let (quotient, remainder) = unscaled.div_rem(&ten);
            if !remainder.is_zero() {
                break;
            }
            unscaled = quotient;
            scale -= 1;
        }

        Decimal::new(unscaled, scale)
    }

    /// Rescales to exactly `scale` fractional digits.
    ///
    /// Growing the scale is always exact. Shrinking it rounds with `mode`.
    /// Scales above `MAX_DECIMAL_SCALE` fail with `OutOfRange`.
    pub fn with_scale(&self, scale: u32, mode: RoundingMode) -> CoreResult<Self> {
        check_scale(scale)?;
        match scale.cmp(&self.scale) {
            Ordering::Equal => Ok(self.clone()),
            Ordering::Greater => Ok(Decimal::new(
                &self.unscaled * pow10(scale - self.scale),
                scale,
            )),
            Ordering::Less => {
                let unscaled = round_div(&self.unscaled, &pow10(self.scale - scale), mode, scale)?;
                Ok(Decimal::new(unscaled, scale))
            }
        }
    }

    /// Rounds to an integer with `mode`.
    pub fn to_integer(&self, mode: RoundingMode) -> CoreResult<BigInt> {
        round_div(&self.unscaled, &pow10(self.scale), mode, 0)
    }

    /// Exact `i64` value, if this is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer(RoundingMode::Unnecessary).ok()?.to_i64()
    }

    /// Divides by `divisor`.
    ///
    /// ## Scale Semantics
    /// ```text
    /// scale = Some(n)  → quotient rounded with `mode` at n fractional digits
    /// scale = None     → exact quotient when it terminates (1/8 = 0.125)
    ///                  → otherwise rounded at DEFAULT_DIVISION_SCALE digits,
    ///                    trailing zeros stripped (1/3 = 0.333…3)
    /// ```
    pub fn div(&self, divisor: &Decimal, scale: Option<u32>, mode: RoundingMode) -> CoreResult<Self> {
        if divisor.is_zero() {
            return Err(CoreError::DivisionByZero);
        }

        match scale {
            Some(scale) => {
                check_scale(scale)?;
                // a/b × 10^scale = A × 10^(sb + scale) / (B × 10^sa)
                let shift = divisor
                    .scale
                    .checked_add(scale)
                    .ok_or_else(|| CoreError::out_of_range(scale, "scale overflows u32"))?;
                let numerator = &self.unscaled * pow10(shift);
                let denominator = &divisor.unscaled * pow10(self.scale);
                let unscaled = round_div(&numerator, &denominator, mode, scale)?;
                Ok(Decimal::new(unscaled, scale))
            }
            None => match self.exact_div(divisor) {
                Some(quotient) => Ok(quotient),
                None => Ok(self
                    .div(divisor, Some(DEFAULT_DIVISION_SCALE), mode)?
                    .strip_trailing_zeros()),
            },
        }
    }

    /// Product with an overflow-checked scale.
    ///
    /// The `*` operator panics where this returns `OutOfRange`.
    pub fn checked_mul(&self, other: &Decimal) -> CoreResult<Self> {
        let scale = self
            .scale
            .checked_add(other.scale)
            .ok_or_else(|| {
                let product = format!("10^-{} × 10^-{}", self.scale, other.scale);
                CoreError::out_of_range(product, "scale overflows u32")
            })?;
        Ok(Decimal::new(&self.unscaled * &other.unscaled, scale))
    }

    /// Exact quotient, or `None` when the decimal expansion never terminates.
    fn exact_div(&self, divisor: &Decimal) -> Option<Self> {
        let mut numerator = &self.unscaled * pow10(divisor.scale);
        let mut denominator = &divisor.unscaled * pow10(self.scale);
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }

        let gcd = numerator.gcd(&denominator);
        numerator /= &gcd;
        denominator /= &gcd;

        // Terminates iff the reduced denominator is 2^a × 5^b.
        let two = BigInt::from(2u32);
        let five = BigInt::from(5u32);
        let mut rest = denominator.clone();
        let (mut twos, mut fives) = (0u32, 0u32);
        while rest.is_even() {
            rest /= &two;
            twos += 1;
        }
        while (&rest % &five).is_zero() {
            rest /= &five;
            fives += 1;
        }
        if !rest.is_one() {
            return None;
        }

        let scale = twos.max(fives);
        Some(Decimal::new(numerator * pow10(scale) / denominator, scale))
    }

    /// Brings two decimals to a common scale.
    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, u32) {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.unscaled.clone(), other.unscaled.clone(), self.scale),
            Ordering::Less => (
                &self.unscaled * pow10(other.scale - self.scale),
                other.unscaled.clone(),
                other.scale,
            ),
            Ordering::Greater => (
                self.unscaled.clone(),
                &other.unscaled * pow10(self.scale - other.scale),
                self.scale,
            ),
        }
    }
}

fn check_scale(scale: u32) -> CoreResult<()> {
    if scale > MAX_DECIMAL_SCALE {
        return Err(CoreError::out_of_range(
            scale,
            format!("scale exceeds {} fractional digits", MAX_DECIMAL_SCALE),
        ));
    }
    Ok(())
}

/// Divides `numerator` by `denominator`, rounding the integer quotient.
///
/// `scale` is only reported back in `RoundingNecessary`.
fn round_div(
    numerator: &BigInt,
    denominator: &BigInt,
    mode: RoundingMode,
    scale: u32,
) -> CoreResult<BigInt> {
    if denominator.is_zero() {
        return Err(CoreError::DivisionByZero);
    }

    let (numerator, denominator) = if denominator.is_negative() {
        (-numerator, -denominator)
    } else {
        (numerator.clone(), denominator.clone())
    };

    // Truncated division: quotient rounds towards zero.
    let (quotient, remainder) = numerator.div_rem(&denominator);
    if remainder.is_zero() {
        return Ok(quotient);
    }

    let positive = numerator.is_positive();
    let away = if positive {
        &quotient + BigInt::one()
    } else {
        &quotient - BigInt::one()
    };
    let doubled = remainder.abs() * BigInt::from(2u32);

    let rounded = match mode {
        RoundingMode::Unnecessary => return Err(CoreError::RoundingNecessary { scale }),
        RoundingMode::Down => quotient,
        RoundingMode::Up => away,
        RoundingMode::Ceiling => {
            if positive {
                away
            } else {
                quotient
            }
        }
        RoundingMode::Floor => {
            if positive {
                quotient
            } else {
                away
            }
        }
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            match doubled.cmp(&denominator) {
                Ordering::Less => quotient,
                Ordering::Greater => away,
                Ordering::Equal => match mode {
                    RoundingMode::HalfUp => away,
                    RoundingMode::HalfDown => quotient,
                    _ if quotient.is_even() => quotient,
                    _ => away,
                },
            }
        }
    };

    Ok(rounded)
}

// =============================================================================
// Parsing & Display
// =============================================================================

impl FromStr for Decimal {
    type Err = CoreError;

    /// Parses plain (`-12.50`, `.5`) and exponent (`1e-9`, `2.5E3`) notation.
    ///
    /// The resulting scale, and any exponent growth, is limited to
    /// `MAX_DECIMAL_SCALE` digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        let (mantissa, exponent) = match text.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&text[..i], Some(&text[i + 1..])),
            None => (text, None),
        };
        let exponent: i64 = match exponent {
            Some(e) => e
                .parse()
                .map_err(|_| CoreError::invalid_format(s, "invalid exponent"))?,
            None => 0,
        };

        let (negative, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoreError::invalid_format(s, "no digits"));
        }
        if !int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit())
        {
            return Err(CoreError::invalid_format(s, "not a decimal number"));
        }

        let mut unscaled: BigInt = format!("{int_part}{frac_part}")
            .parse()
            .map_err(|_| CoreError::invalid_format(s, "not a decimal number"))?;

        let limit = i64::from(MAX_DECIMAL_SCALE);
        let scale = (frac_part.len() as i64)
            .checked_sub(exponent)
            .ok_or_else(|| CoreError::invalid_format(s, "exponent too large"))?;
        if scale > limit {
            return Err(CoreError::invalid_format(
                s,
                format!("more than {} fractional digits", MAX_DECIMAL_SCALE),
            ));
        }
        if scale < -limit {
            return Err(CoreError::invalid_format(s, "exponent too large"));
        }

        let scale = if scale < 0 {
            unscaled *= pow10(scale.unsigned_abs() as u32);
            0
        } else {
            scale as u32
        };

        if negative {
            unscaled = -unscaled;
        }

        Ok(Decimal::new(unscaled, scale))
    }
}

/// Plain notation, never exponent form: `0.000000001`, `-12.50`.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.unscaled.abs().to_string();
        let scale = self.scale as usize;

        if scale == 0 {
            write!(f, "{}{}", sign, digits)
        } else if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Decimal::zero()
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<u128> for Decimal {
    fn from(value: u128) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

// =============================================================================
// Comparison
// =============================================================================

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, other: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(other);
        Decimal::new(a + b, scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, other: Decimal) -> Decimal {
        &self + &other
    }
}

impl Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, other: &Decimal) -> Decimal {
        let (a, b, scale) = self.aligned(other);
        Decimal::new(a - b, scale)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, other: Decimal) -> Decimal {
        &self - &other
    }
}

/// # Panics
/// When the combined scale overflows `u32`, like integer overflow.
/// Use [`Decimal::checked_mul`] on untrusted scales.
impl Mul<&Decimal> for &Decimal {
    type Output = Decimal;

    fn mul(self, other: &Decimal) -> Decimal {
        match self.checked_mul(other) {
            Ok(product) => product,
            Err(err) => panic!("{}", err),
        }
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, other: Decimal) -> Decimal {
        &self * &other
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-self.unscaled, self.scale)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| &acc + &d)
    }
}

// =============================================================================
// Serde
// =============================================================================

/// Serialized as a string so no precision is lost in JSON/TOML.
impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
