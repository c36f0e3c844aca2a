//! # Humanize
//!
//! Greedy multi-unit breakdown of a quantity.
//!
//! ```text
//! 3723 seconds, units [hours, minutes, seconds]
//!
//!   remainder (atom unit) ──► extract(hours)   → 1h   rem 723s
//!                         ──► extract(minutes) → 2m   rem 3s
//!                         ──► extract(seconds) → 3s   rem 0
//!
//!   non-zero parts joined with the divider: "1h 2m 3s"
//!   nothing left to show: zero in the last unit, "0s"
//! ```

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::converter::UnitConverter;
use super::UnitSystem;
use crate::decimal::{Decimal, RoundingMode};
use crate::error::{CoreError, CoreResult};

/// Closure form of a suffix: receives the formatted value and the unit name.
pub type SuffixFn = Arc<dyn Fn(&Decimal, &str) -> String + Send + Sync>;

/// How a value is rendered next to its unit.
///
/// ```text
/// Text("h")          3   → "3h"
/// Text("{} hours")   3   → "3 hours"
/// Custom(f)          3   → f(3, "hours")
/// ```
#[derive(Clone)]
pub enum Suffix {
    /// Appended to the value, or used as a template when it contains `{}`.
    Text(String),
    Custom(SuffixFn),
}

impl Suffix {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Decimal, &str) -> String + Send + Sync + 'static,
    {
        Suffix::Custom(Arc::new(f))
    }

    pub(crate) fn render(&self, value: &Decimal, unit: &str) -> String {
        match self {
            Suffix::Text(text) if text.contains("{}") => text.replace("{}", &value.to_string()),
            Suffix::Text(text) => format!("{}{}", value, text),
            Suffix::Custom(f) => f(value, unit),
        }
    }
}

impl From<&str> for Suffix {
    fn from(text: &str) -> Self {
        Suffix::Text(text.to_string())
    }
}

impl From<String> for Suffix {
    fn from(text: String) -> Self {
        Suffix::Text(text)
    }
}

impl fmt::Debug for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suffix::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Suffix::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options for [`UnitConverter::humanize`].
///
/// ## Example
/// ```rust
/// use numkit_core::{Duration, HumanizeOptions};
///
/// let options = HumanizeOptions::new()
///     .unit_suffixes([("hours", "h"), ("minutes", "m"), ("seconds", "s")]);
///
/// let uptime = Duration::new(3723, "seconds").unwrap();
/// assert_eq!(uptime.humanize(&options).unwrap(), "1h 2m 3s");
/// ```
#[derive(Debug, Clone)]
pub struct HumanizeOptions {
    units: Vec<(String, Option<Suffix>)>,
    divider: String,
    formatter: Option<Suffix>,
    keep_zero: bool,
    without_fallback: bool,
}

impl Default for HumanizeOptions {
    fn default() -> Self {
        HumanizeOptions {
            units: Vec::new(),
            divider: " ".to_string(),
            formatter: None,
            keep_zero: false,
            without_fallback: false,
        }
    }
}

impl HumanizeOptions {
    /// Every unit of the table, unit names as suffixes, `" "` divider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the breakdown to these units. Each unit is also its own
    /// suffix, exactly as written (`"h"` renders `1h`).
    pub fn units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.units
            .extend(units.into_iter().map(|unit| (unit.into(), None)));
        self
    }

    /// Adds one unit with its own suffix.
    pub fn unit_with_suffix(mut self, unit: impl Into<String>, suffix: impl Into<Suffix>) -> Self {
        self.units.push((unit.into(), Some(suffix.into())));
        self
    }

    /// Restricts the breakdown to these units, each with its suffix.
    pub fn unit_suffixes<I, U, S>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<String>,
        S: Into<Suffix>,
    {
        pairs
            .into_iter()
            .fold(self, |options, (unit, suffix)| options.unit_with_suffix(unit, suffix))
    }

    pub fn divider(mut self, divider: impl Into<String>) -> Self {
        self.divider = divider.into();
        self
    }

    /// Suffix for every part. Takes precedence over per-unit suffixes.
    pub fn formatter(mut self, formatter: impl Into<Suffix>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Keep zero parts (`"0h 2m 3s"`).
    pub fn keep_zero(mut self, keep_zero: bool) -> Self {
        self.keep_zero = keep_zero;
        self
    }

    /// Return an empty string instead of the zero fallback.
    pub fn without_fallback(mut self, without_fallback: bool) -> Self {
        self.without_fallback = without_fallback;
        self
    }
}

// =============================================================================
// Humanize
// =============================================================================

impl<D: UnitSystem> UnitConverter<D> {
    /// Greedy breakdown from the largest selected unit to the smallest.
    ///
    /// Selected units are ordered by descending exchange rate whatever order
    /// they were given in; ties keep the given order.
    pub fn humanize(&self, options: &HumanizeOptions) -> CoreResult<String> {
        let parts = self.humanize_parts(options)?;
        let Some((_, last_unit, last_suffix)) = parts.last().cloned() else {
            return Ok(String::new());
        };

        let text: Vec<String> = parts
            .into_iter()
            .filter(|(part, _, _)| options.keep_zero || !part.is_zero())
            .map(|(part, unit, suffix)| suffix.render(&part.strip_trailing_zeros(), &unit))
            .collect();
        let formatted = text.join(&options.divider).trim().to_string();

        if formatted.is_empty() && !options.without_fallback {
            return Ok(last_suffix.render(&Decimal::zero(), &last_unit));
        }

        debug!(magnitude = %self.magnitude(), unit = self.unit(), humanized = %formatted, "Humanized quantity");
        Ok(formatted)
    }

    /// Hands the atom-unit remainder and the rate-sorted table to `f`.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let two_minutes = Duration::new(120, "seconds").unwrap();
    /// let text = two_minutes
    ///     .humanize_with(|atoms, units| format!("{} {} across {} units", atoms.magnitude(), atoms.unit(), units.len()))
    ///     .unwrap();
    /// assert_eq!(text, "120000000000 nanoseconds across 10 units");
    /// ```
    pub fn humanize_with<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&UnitConverter<D>, &[(String, Decimal)]) -> R,
    {
        let remainder = self.convert_to(self.atom_unit(), None, RoundingMode::HalfUp)?;
        Ok(f(&remainder, &self.sorted_units()))
    }

    /// `(part, canonical unit, suffix)` for every selected unit, largest first.
    fn humanize_parts(&self, options: &HumanizeOptions) -> CoreResult<Vec<(Decimal, String, Suffix)>> {
        let selected = self.selected_units(options)?;
        let mut remainder = self.convert_to(self.atom_unit(), None, RoundingMode::HalfUp)?;

        selected
            .into_iter()
            .map(|(unit, suffix)| -> CoreResult<(Decimal, String, Suffix)> {
                let (part, rest) = remainder.extract(&unit)?;
                remainder = rest;
                Ok((part.magnitude().clone(), unit, suffix))
            })
            .collect()
    }

    fn selected_units(&self, options: &HumanizeOptions) -> CoreResult<Vec<(String, Suffix)>> {
        if options.units.is_empty() {
            return Ok(self
                .sorted_units()
                .into_iter()
                .map(|(unit, _)| {
                    let suffix = options
                        .formatter
                        .clone()
                        .unwrap_or_else(|| Suffix::Text(unit.clone()));
                    (unit, suffix)
                })
                .collect());
        }

        let mut selected = options
            .units
            .iter()
            .map(|(written, suffix)| -> CoreResult<(String, Decimal, Suffix)> {
                let unit = self.table().normalize(written);
                let rate = self
                    .table()
                    .rate(&unit)
                    .cloned()
                    .ok_or_else(|| CoreError::UnknownUnit(written.clone()))?;
                let suffix = options
                    .formatter
                    .clone()
                    .or_else(|| suffix.clone())
                    .unwrap_or_else(|| Suffix::Text(written.clone()));
                Ok((unit, rate, suffix))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        selected.sort_by(|(_, a, _), (_, b, _)| b.cmp(a));
        Ok(selected
            .into_iter()
            .map(|(unit, _, suffix)| (unit, suffix))
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Duration, FileSize};

    fn hms() -> HumanizeOptions {
        HumanizeOptions::new().unit_suffixes([("hours", "h"), ("minutes", "m"), ("seconds", "s")])
    }

    #[test]
    fn test_humanize_greedy() {
        let d = Duration::new(3723, "seconds").unwrap();
        assert_eq!(d.humanize(&hms()).unwrap(), "1h 2m 3s");
    }

    #[test]
    fn test_humanize_zero_falls_back_to_smallest_unit() {
        let d = Duration::default();
        assert_eq!(d.humanize(&hms()).unwrap(), "0s");
        assert_eq!(d.humanize(&hms().without_fallback(true)).unwrap(), "");
    }

    #[test]
    fn test_humanize_keep_zero() {
        let d = Duration::new(3603, "seconds").unwrap();
        assert_eq!(d.humanize(&hms()).unwrap(), "1h 3s");
        assert_eq!(d.humanize(&hms().keep_zero(true)).unwrap(), "1h 0m 3s");
    }

    #[test]
    fn test_humanize_unit_order_does_not_matter() {
        let d = Duration::new(3723, "seconds").unwrap();
        let shuffled =
            HumanizeOptions::new().unit_suffixes([("seconds", "s"), ("hours", "h"), ("minutes", "m")]);
        assert_eq!(d.humanize(&shuffled).unwrap(), "1h 2m 3s");
    }

    #[test]
    fn test_humanize_written_units_are_suffixes() {
        let d = Duration::new(5400, "seconds").unwrap();
        let options = HumanizeOptions::new().units(["h", "m"]).divider(", ");
        assert_eq!(d.humanize(&options).unwrap(), "1h, 30m");
    }

    #[test]
    fn test_humanize_default_uses_every_unit() {
        let d = Duration::new(90, "seconds").unwrap();
        assert_eq!(d.humanize(&HumanizeOptions::new()).unwrap(), "1minutes 30seconds");
    }

    #[test]
    fn test_humanize_formatter_overrides_suffixes() {
        let d = Duration::new(3723, "seconds").unwrap();
        let options = hms().formatter(Suffix::custom(|value, unit| format!("{value} {unit}")));
        assert_eq!(d.humanize(&options).unwrap(), "1 hours 2 minutes 3 seconds");

        let options = hms().formatter("{}|");
        assert_eq!(d.humanize(&options).unwrap(), "1| 2| 3|");
    }

    #[test]
    fn test_humanize_template_suffix() {
        let size = FileSize::new(1536, "kilobytes").unwrap();
        let options = HumanizeOptions::new()
            .unit_with_suffix("megabytes", "{} MiB")
            .unit_with_suffix("kilobytes", "{} KiB");
        assert_eq!(size.humanize(&options).unwrap(), "1 MiB 512 KiB");
    }

    #[test]
    fn test_humanize_unknown_unit() {
        let d = Duration::new(1, "seconds").unwrap();
        let options = HumanizeOptions::new().units(["fortnights"]);
        assert!(matches!(d.humanize(&options), Err(CoreError::UnknownUnit(_))));
    }

    #[test]
    fn test_humanize_with_closure() {
        let d = Duration::new(2, "milliseconds").unwrap();
        let largest = d.humanize_with(|_, units| units[0].0.clone()).unwrap();
        assert_eq!(largest, "years");

        let atoms = d.humanize_with(|atoms, _| atoms.magnitude().clone()).unwrap();
        assert_eq!(atoms, Decimal::from(2_000_000));
    }

    #[test]
    fn test_suffix_render() {
        let value = Decimal::from(3);
        assert_eq!(Suffix::from("h").render(&value, "hours"), "3h");
        assert_eq!(Suffix::from("{} hours").render(&value, "hours"), "3 hours");
        assert_eq!(Suffix::custom(|v, u| format!("{u}={v}")).render(&value, "hours"), "hours=3");
    }
}
