//! # Unit Converter
//!
//! A magnitude tagged with a unit, plus the exchange table it converts with.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  UnitConverter<D>                                                  │
//! │                                                                    │
//! │  magnitude: Decimal   ── 1.5                                       │
//! │  unit:      String    ── "hours"                                   │
//! │  table:     Arc<UnitTable> ── shared with every value built from   │
//! │                              the same system, copied on write      │
//! │                                                                    │
//! │  convert_to("minutes")  → 90 minutes   (new value)                 │
//! │  with_added_unit_exchange_rate("fortnights", 1209600)              │
//! │                          → new value with its own table copy       │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method returns a new value. Nothing is mutated in place.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};
use ts_rs::TS;

use super::humanize::Suffix;
use super::table::UnitTable;
use super::tokens;
use super::{CustomUnits, UnitSystem};
use crate::decimal::{Decimal, RoundingMode};
use crate::error::{CoreError, CoreResult};

/// A quantity in one unit of a unit system.
pub struct UnitConverter<D: UnitSystem = CustomUnits> {
    magnitude: Decimal,
    unit: String,
    table: Arc<UnitTable>,
    system: PhantomData<fn() -> D>,
}

// =============================================================================
// Construction
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    /// Creates a quantity. The unit is resolved through the alias table.
    ///
    /// ## Example
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::new(90, "min").unwrap();
    /// assert_eq!(d.unit(), "minutes");
    /// assert_eq!(d.to("h").unwrap().to_string(), "1.5");
    /// ```
    pub fn new(magnitude: impl Into<Decimal>, unit: &str) -> CoreResult<Self> {
        Self::with_table(D::unit_table(), magnitude, unit)
    }

    /// Creates a quantity over an explicit exchange table.
    ///
    /// ```rust
    /// use numkit_core::decimal::Decimal;
    /// use numkit_core::unit::{UnitConverter, UnitTable};
    ///
    /// let table = UnitTable::new(
    ///     vec![("grams", Decimal::from(1)), ("kilograms", Decimal::from(1000))],
    ///     "grams",
    /// )
    /// .unwrap();
    ///
    /// let weight: UnitConverter = UnitConverter::with_table(table, 2500, "grams").unwrap();
    /// assert_eq!(weight.to("kilograms").unwrap().to_string(), "2.5");
    /// ```
    pub fn with_table(
        table: impl Into<Arc<UnitTable>>,
        magnitude: impl Into<Decimal>,
        unit: &str,
    ) -> CoreResult<Self> {
        let table = table.into();
        let unit = table.normalize(unit);
        if !table.contains(&unit) {
            return Err(CoreError::UnknownUnit(unit));
        }

        Ok(UnitConverter {
            magnitude: magnitude.into(),
            unit,
            table,
            system: PhantomData,
        })
    }

    /// Numeric text becomes the magnitude directly; anything else is
    /// parsed as a composite quantity.
    ///
    /// ```text
    /// from_text("90", Some("min"))     → 90 minutes
    /// from_text("1h 30m", Some("min")) → 90 minutes
    /// from_text("1h 30m", None)        → 5400 seconds (default unit)
    /// ```
    pub fn from_text(value: &str, unit: Option<&str>) -> CoreResult<Self> {
        match value.parse::<Decimal>() {
            Ok(magnitude) => {
                let table = D::unit_table();
                let unit = unit.unwrap_or(table.default_unit()).to_string();
                Self::with_table(table, magnitude, &unit)
            }
            Err(_) => Self::parse(value, unit),
        }
    }

    /// Parses a composite quantity such as `"1h 30m 15s"`.
    ///
    /// Every token is converted to the atom unit and summed, then the total
    /// is converted to `as_unit` (default unit when `None`).
    ///
    /// ## Example
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::parse("1h 30m", None).unwrap();
    /// assert_eq!(d.unit(), "seconds");
    /// assert_eq!(d.magnitude().to_string(), "5400");
    /// ```
    pub fn parse(text: &str, as_unit: Option<&str>) -> CoreResult<Self> {
        Self::default().with_parse(text, as_unit, None, RoundingMode::HalfUp)
    }

    /// Parses straight to a magnitude.
    pub fn parse_to_value(text: &str, as_unit: Option<&str>) -> CoreResult<Decimal> {
        Ok(Self::parse(text, as_unit)?.magnitude)
    }

    /// One-shot conversion of a magnitude.
    ///
    /// ```rust
    /// use numkit_core::FileSize;
    /// use numkit_core::decimal::{Decimal, RoundingMode};
    ///
    /// let bytes = FileSize::convert(1, "megabytes", "bytes", None, RoundingMode::HalfUp).unwrap();
    /// assert_eq!(bytes, Decimal::from(1_048_576));
    /// ```
    pub fn convert(
        value: impl Into<Decimal>,
        from: &str,
        to: &str,
        scale: Option<u32>,
        mode: RoundingMode,
    ) -> CoreResult<Decimal> {
        Ok(Self::new(value, from)?.convert_to(to, scale, mode)?.magnitude)
    }
}

// =============================================================================
// Accessors
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    pub fn magnitude(&self) -> &Decimal {
        &self.magnitude
    }

    /// Canonical name of the current unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn table(&self) -> &UnitTable {
        &self.table
    }

    pub fn atom_unit(&self) -> &str {
        self.table.atom_unit()
    }

    pub fn default_unit(&self) -> &str {
        self.table.default_unit()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.magnitude.is_negative()
    }

    /// Rate of a unit relative to the table's rate-1 reference unit.
    /// Aliases are accepted.
    pub fn exchange_rate(&self, unit: &str) -> Option<Decimal> {
        self.table.rate(&self.table.normalize(unit)).cloned()
    }

    /// `(unit, rate)` pairs, largest rate first.
    pub fn sorted_units(&self) -> Vec<(String, Decimal)> {
        self.table.sorted_units()
    }

    fn rate_of(&self, unit: &str) -> CoreResult<&Decimal> {
        self.table
            .rate(unit)
            .ok_or_else(|| CoreError::UnknownUnit(unit.to_string()))
    }

    fn retag(&self, magnitude: Decimal, unit: String) -> Self {
        UnitConverter {
            magnitude,
            unit,
            table: Arc::clone(&self.table),
            system: PhantomData,
        }
    }
}

// =============================================================================
// Conversion
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    /// Converts to another unit of the same table.
    ///
    /// ## Algorithm
    /// ```text
    /// same unit       → unchanged copy
    /// zero magnitude  → retag only
    /// otherwise       → magnitude × rate(from) / rate(to)
    ///                   exact when the quotient terminates and scale is None
    /// ```
    pub fn convert_to(&self, unit: &str, scale: Option<u32>, mode: RoundingMode) -> CoreResult<Self> {
        let target = self.table.normalize(unit);
        let to_rate = self.rate_of(&target)?;

        if target == self.unit {
            return Ok(self.clone());
        }
        if self.magnitude.is_zero() {
            return Ok(self.retag(self.magnitude.clone(), target));
        }

        let from_rate = self.rate_of(&self.unit)?;
        let magnitude = self.magnitude.checked_mul(from_rate)?.div(to_rate, scale, mode)?;

        trace!(from = %self.unit, to = %target, %magnitude, "Converted quantity");
        Ok(self.retag(magnitude, target))
    }

    /// Converted magnitude in `unit`.
    pub fn to(&self, unit: &str) -> CoreResult<Decimal> {
        self.to_scaled(unit, None, RoundingMode::HalfUp)
    }

    pub fn to_scaled(&self, unit: &str, scale: Option<u32>, mode: RoundingMode) -> CoreResult<Decimal> {
        Ok(self.convert_to(unit, scale, mode)?.magnitude)
    }

    /// Sets a value given in `from_unit`, converted into the current unit.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    /// use numkit_core::decimal::RoundingMode;
    ///
    /// let d = Duration::new(0, "minutes").unwrap();
    /// let d = d.with_value(2, Some("h"), None, RoundingMode::HalfUp).unwrap();
    /// assert_eq!((d.magnitude().to_string(), d.unit()), ("120".to_string(), "minutes"));
    /// ```
    pub fn with_value(
        &self,
        value: impl Into<Decimal>,
        from_unit: Option<&str>,
        scale: Option<u32>,
        mode: RoundingMode,
    ) -> CoreResult<Self> {
        let from_unit = from_unit.unwrap_or(&self.unit);
        self.with_magnitude(value, Some(from_unit))?
            .convert_to(&self.unit, scale, mode)
    }

    /// Replaces the magnitude without converting. `unit` retags as well.
    pub fn with_magnitude(&self, value: impl Into<Decimal>, unit: Option<&str>) -> CoreResult<Self> {
        let unit = match unit {
            Some(unit) => self.table.normalize(unit),
            None => self.unit.clone(),
        };
        self.rate_of(&unit)?;
        Ok(self.retag(value.into(), unit))
    }

    /// Retags the magnitude with another unit, without converting.
    pub fn with_unit(&self, unit: &str) -> CoreResult<Self> {
        self.with_magnitude(self.magnitude.clone(), Some(unit))
    }

    /// Parses `text` using this value's table and normalizer.
    ///
    /// Each token is brought to the atom unit at `scale` before summing,
    /// then the sum is converted to `as_unit` at `scale`.
    pub fn with_parse(
        &self,
        text: &str,
        as_unit: Option<&str>,
        scale: Option<u32>,
        mode: RoundingMode,
    ) -> CoreResult<Self> {
        let atoms = self.with_magnitude(Decimal::zero(), Some(self.atom_unit()))?;

        let mut total = Decimal::zero();
        for (value, unit) in tokens::scan(text)? {
            total = &total + atoms.with_value(value, Some(unit.as_str()), scale, mode)?.magnitude();
        }

        let target = as_unit.unwrap_or(&self.unit).to_string();
        let parsed = atoms.retag(total, atoms.unit.clone()).convert_to(&target, scale, mode)?;

        debug!(input = text, magnitude = %parsed.magnitude, unit = %parsed.unit, "Parsed quantity");
        Ok(parsed)
    }

    /// Splits off the whole number of `unit`s, returning `(part, remainder)`.
    ///
    /// The part is truncated toward zero; the remainder stays in the current
    /// unit.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::new(150, "seconds").unwrap();
    /// let (minutes, rest) = d.extract("minutes").unwrap();
    /// assert_eq!(minutes.to_string(), "2minutes");
    /// assert_eq!(rest.to_string(), "30seconds");
    /// ```
    pub fn extract(&self, unit: &str) -> CoreResult<(Self, Self)> {
        let target = self.table.normalize(unit);
        let to_rate = self.rate_of(&target)?;
        let from_rate = self.rate_of(&self.unit)?;

        let part = self.magnitude.checked_mul(from_rate)?.div(to_rate, Some(0), RoundingMode::Down)?;
        let taken = part.checked_mul(to_rate)?.div(from_rate, None, RoundingMode::HalfUp)?;
        let remainder = &self.magnitude - &taken;

        Ok((self.retag(part, target), self.retag(remainder, self.unit.clone())))
    }
}

// =============================================================================
// Formatting
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    /// Renders the quantity, optionally in another unit.
    ///
    /// ## Steps
    /// ```text
    /// 1. unit is Some   → convert_to(unit, scale, mode)
    /// 2. scale is Some  → round to scale digits
    ///    scale is None  → strip trailing zeros
    /// 3. suffix is None → append the unit name
    ///    suffix is Some → Suffix::render (append, "{}" template, closure)
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use numkit_core::{Duration, Suffix};
    /// use numkit_core::decimal::RoundingMode;
    ///
    /// let d = Duration::new(5400, "seconds").unwrap();
    /// assert_eq!(d.format(None, Some("h"), None, RoundingMode::HalfUp).unwrap(), "1.5hours");
    ///
    /// let suffix = Suffix::from("{} hrs");
    /// assert_eq!(d.format(Some(&suffix), Some("h"), Some(2), RoundingMode::HalfUp).unwrap(), "1.50 hrs");
    /// ```
    pub fn format(
        &self,
        suffix: Option<&Suffix>,
        unit: Option<&str>,
        scale: Option<u32>,
        mode: RoundingMode,
    ) -> CoreResult<String> {
        let converted = match unit {
            Some(unit) => self.convert_to(unit, scale, mode)?,
            None => self.clone(),
        };

        let value = match scale {
            Some(scale) => converted.magnitude.with_scale(scale, mode)?,
            None => converted.magnitude.strip_trailing_zeros(),
        };

        Ok(match suffix {
            Some(suffix) => suffix.render(&value, &converted.unit),
            None => format!("{}{}", value, converted.unit),
        })
    }
}

// =============================================================================
// Exchange Table Changes
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    /// Adds or replaces a unit rate on this value's own copy of the table.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    /// use numkit_core::decimal::Decimal;
    ///
    /// let d = Duration::new(3, "weeks").unwrap()
    ///     .with_added_unit_exchange_rate("fortnights", Decimal::from(1_209_600), false)
    ///     .unwrap();
    /// assert_eq!(d.to("fortnights").unwrap().to_string(), "1.5");
    ///
    /// // Other durations keep the built-in table
    /// assert!(Duration::new(1, "fortnights").is_err());
    /// ```
    pub fn with_added_unit_exchange_rate(&self, unit: &str, rate: Decimal, prepend: bool) -> CoreResult<Self> {
        let mut new = self.clone();
        Arc::make_mut(&mut new.table).insert(unit, rate, prepend)?;
        Ok(new)
    }

    /// Drops a unit from this value's copy of the table.
    pub fn without_unit_exchange_rate(&self, unit: &str) -> Self {
        let mut new = self.clone();
        let unit = new.table.normalize(unit);
        Arc::make_mut(&mut new.table).remove(&unit);
        new
    }

    /// Replaces every rate. The atom unit becomes the smallest rate.
    ///
    /// When the current unit disappears from the table, the magnitude is
    /// retagged with the new default unit.
    pub fn with_unit_exchanges<I, S>(&self, rates: I, default_unit: &str) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let mut new = self.clone();
        let rates = rates.into_iter().map(|(unit, rate)| (unit.into(), rate)).collect();
        Arc::make_mut(&mut new.table).replace_rates(rates, default_unit)?;

        if !new.table.contains(&new.unit) {
            new.unit = new.table.default_unit().to_string();
        }
        Ok(new)
    }

    /// Extra alias hook, run after the built-in aliases.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::default().with_unit_normalizer(|unit| match unit {
    ///     "jiffies" => "milliseconds".to_string(),
    ///     other => other.to_string(),
    /// });
    /// assert_eq!(d.to("jiffies").unwrap().to_string(), "0");
    /// assert_eq!(d.with_unit("jiffies").unwrap().unit(), "milliseconds");
    /// ```
    pub fn with_unit_normalizer<F>(&self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let mut new = self.clone();
        Arc::make_mut(&mut new.table).set_normalizer(Arc::new(normalizer));
        new
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<D: UnitSystem> Clone for UnitConverter<D> {
    fn clone(&self) -> Self {
        self.retag(self.magnitude.clone(), self.unit.clone())
    }
}

/// Zero in the default unit.
impl<D: UnitSystem> Default for UnitConverter<D> {
    fn default() -> Self {
        let table = D::unit_table();
        UnitConverter {
            magnitude: Decimal::zero(),
            unit: table.default_unit().to_string(),
            table,
            system: PhantomData,
        }
    }
}

/// Same magnitude and same unit. Tables are not compared.
impl<D: UnitSystem> PartialEq for UnitConverter<D> {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude == other.magnitude && self.unit == other.unit
    }
}

impl<D: UnitSystem> fmt::Debug for UnitConverter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitConverter")
            .field("magnitude", &self.magnitude)
            .field("unit", &self.unit)
            .finish()
    }
}

/// `"1.5hours"`: trailing zeros stripped, unit appended.
impl<D: UnitSystem> fmt::Display for UnitConverter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude.strip_trailing_zeros(), self.unit)
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Wire form of a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity {
    #[ts(type = "string")]
    pub magnitude: Decimal,
    pub unit: String,
}

impl<D: UnitSystem> Serialize for UnitConverter<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Quantity {
            magnitude: self.magnitude.clone(),
            unit: self.unit.clone(),
        }
        .serialize(serializer)
    }
}

/// The unit must exist in the system's built-in table.
impl<'de, D: UnitSystem> Deserialize<'de> for UnitConverter<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let quantity = Quantity::deserialize(deserializer)?;
        Self::new(quantity.magnitude, &quantity.unit).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
