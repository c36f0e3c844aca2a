//! # Duration
//!
//! Time quantities from nanoseconds to (average) years.
//!
//! ```text
//! ┌──────────────┬────────────────┬──────────────────────┐
//! │ Unit         │ Seconds        │ Aliases              │
//! ├──────────────┼────────────────┼──────────────────────┤
//! │ nanoseconds  │ 0.000000001    │ ns, nanosecond       │  ← atom
//! │ microseconds │ 0.000001       │ us, µs, microsecond  │
//! │ milliseconds │ 0.001          │ ms, millisecond      │
//! │ seconds      │ 1              │ s, sec, second       │  ← default
//! │ minutes      │ 60             │ m, min, minute       │
//! │ hours        │ 3600           │ h, hour              │
//! │ days         │ 86400          │ d, day               │
//! │ weeks        │ 604800         │ w, week              │
//! │ months       │ 2629800        │ mo, month            │  average month
//! │ years        │ 31557600       │ y, year              │  365.25 days
//! └──────────────┴────────────────┴──────────────────────┘
//! ```

use iso8601_duration::Duration as IsoDuration;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::converter::UnitConverter;
use super::table::{StaticRate, UnitTable};
use super::UnitSystem;
use crate::decimal::{Decimal, RoundingMode};
use crate::error::{CoreError, CoreResult};

pub const UNIT_NANOSECONDS: &str = "nanoseconds";
pub const UNIT_MICROSECONDS: &str = "microseconds";
pub const UNIT_MILLISECONDS: &str = "milliseconds";
pub const UNIT_SECONDS: &str = "seconds";
pub const UNIT_MINUTES: &str = "minutes";
pub const UNIT_HOURS: &str = "hours";
pub const UNIT_DAYS: &str = "days";
pub const UNIT_WEEKS: &str = "weeks";
pub const UNIT_MONTHS: &str = "months";
pub const UNIT_YEARS: &str = "years";

const RATES: &[StaticRate] = &[
    (UNIT_NANOSECONDS, 1, 9),
    (UNIT_MICROSECONDS, 1, 6),
    (UNIT_MILLISECONDS, 1, 3),
    (UNIT_SECONDS, 1, 0),
    (UNIT_MINUTES, 60, 0),
    (UNIT_HOURS, 3_600, 0),
    (UNIT_DAYS, 86_400, 0),
    (UNIT_WEEKS, 604_800, 0),
    (UNIT_MONTHS, 2_629_800, 0),
    (UNIT_YEARS, 31_557_600, 0),
];

const ALIASES: &[(&str, &str)] = &[
    ("ns", UNIT_NANOSECONDS),
    ("nanosecond", UNIT_NANOSECONDS),
    ("us", UNIT_MICROSECONDS),
    ("µs", UNIT_MICROSECONDS),
    ("μs", UNIT_MICROSECONDS),
    ("microsecond", UNIT_MICROSECONDS),
    ("ms", UNIT_MILLISECONDS),
    ("millisecond", UNIT_MILLISECONDS),
    ("s", UNIT_SECONDS),
    ("sec", UNIT_SECONDS),
    ("second", UNIT_SECONDS),
    ("m", UNIT_MINUTES),
    ("min", UNIT_MINUTES),
    ("minute", UNIT_MINUTES),
    ("h", UNIT_HOURS),
    ("hour", UNIT_HOURS),
    ("d", UNIT_DAYS),
    ("day", UNIT_DAYS),
    ("w", UNIT_WEEKS),
    ("week", UNIT_WEEKS),
    ("mo", UNIT_MONTHS),
    ("month", UNIT_MONTHS),
    ("y", UNIT_YEARS),
    ("year", UNIT_YEARS),
];

/// Built-in time units.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationUnits;

impl UnitSystem for DurationUnits {
    fn unit_table() -> Arc<UnitTable> {
        static TABLE: OnceLock<Arc<UnitTable>> = OnceLock::new();
        Arc::clone(TABLE.get_or_init(|| {
            Arc::new(UnitTable::builtin(RATES, ALIASES, UNIT_NANOSECONDS, UNIT_SECONDS))
        }))
    }
}

/// A time quantity.
///
/// ## Example
/// ```rust
/// use numkit_core::Duration;
///
/// let timeout = Duration::parse("1m 30s", Some("ms")).unwrap();
/// assert_eq!(timeout.to_string(), "90000milliseconds");
/// assert_eq!(timeout.to_seconds().unwrap().to_string(), "90");
/// ```
pub type Duration = UnitConverter<DurationUnits>;

super::unit_shortcuts!(DurationUnits {
    to_nanoseconds => "nanoseconds",
    to_microseconds => "microseconds",
    to_milliseconds => "milliseconds",
    to_seconds => "seconds",
    to_minutes => "minutes",
    to_hours => "hours",
    to_days => "days",
    to_weeks => "weeks",
    to_months => "months",
    to_years => "years",
});

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Designators in the order ISO-8601 requires them.
const ISO_COMPONENTS: [(&str, &str); 7] = [
    ("years", UNIT_YEARS),
    ("months", UNIT_MONTHS),
    ("weeks", UNIT_WEEKS),
    ("days", UNIT_DAYS),
    ("hours", UNIT_HOURS),
    ("minutes", UNIT_MINUTES),
    ("seconds", UNIT_SECONDS),
];

fn iso_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^P(?:(?P<years>[0-9]+(?:[.,][0-9]+)?)Y)?",
            r"(?:(?P<months>[0-9]+(?:[.,][0-9]+)?)M)?",
            r"(?:(?P<weeks>[0-9]+(?:[.,][0-9]+)?)W)?",
            r"(?:(?P<days>[0-9]+(?:[.,][0-9]+)?)D)?",
            r"(?:T(?:(?P<hours>[0-9]+(?:[.,][0-9]+)?)H)?",
            r"(?:(?P<minutes>[0-9]+(?:[.,][0-9]+)?)M)?",
            r"(?:(?P<seconds>[0-9]+(?:[.,][0-9]+)?)S)?)?$",
        ))
        .expect("Hardcode regex pattern")
    })
}

impl UnitConverter<DurationUnits> {
    /// Parses an ISO-8601 duration (`PT1H30M`, `P1DT2H`, `P1Y2M`).
    ///
    /// Years and months use the table's average rates. Component digits
    /// are read exactly, so `PT16777217S` stays 16777217 seconds.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::parse_iso8601("PT1H30M", Some("min")).unwrap();
    /// assert_eq!(d.to_string(), "90minutes");
    /// ```
    pub fn parse_iso8601(text: &str, as_unit: Option<&str>) -> CoreResult<Self> {
        let trimmed = text.trim();
        // The crate validates the grammar; its f32 fields are too lossy to keep.
        trimmed
            .parse::<IsoDuration>()
            .map_err(|_| CoreError::invalid_format(text, "not an ISO-8601 duration"))?;
        let caps = iso_pattern()
            .captures(trimmed)
            .ok_or_else(|| CoreError::invalid_format(text, "not an ISO-8601 duration"))?;

        let atoms = Self::new(Decimal::zero(), UNIT_NANOSECONDS)?;
        let mut total = Decimal::zero();
        for (group, unit) in ISO_COMPONENTS {
            let Some(amount) = caps.name(group) else {
                continue;
            };
            let amount = amount
                .as_str()
                .replace(',', ".")
                .parse::<Decimal>()
                .map_err(|_| CoreError::invalid_format(text, format!("bad {} component", unit)))?;
            total = &total + atoms.with_value(amount, Some(unit), None, RoundingMode::HalfUp)?.magnitude();
        }

        let parsed = atoms
            .with_magnitude(total, None)?
            .convert_to(as_unit.unwrap_or(UNIT_SECONDS), None, RoundingMode::HalfUp)?;

        debug!(input = text, magnitude = %parsed.magnitude(), unit = parsed.unit(), "Parsed ISO-8601 duration");
        Ok(parsed)
    }

    /// Builds a duration in seconds from a `chrono::TimeDelta`.
    pub fn from_time_delta(delta: chrono::TimeDelta) -> CoreResult<Self> {
        let nanos = BigInt::from(delta.num_seconds()) * BigInt::from(NANOS_PER_SECOND)
            + BigInt::from(delta.subsec_nanos());
        Self::from_nanos(nanos)
    }

    /// Converts to a `chrono::TimeDelta`, truncating below one nanosecond.
    ///
    /// ```rust
    /// use numkit_core::Duration;
    ///
    /// let d = Duration::parse("1h 30m", None).unwrap();
    /// assert_eq!(d.to_time_delta().unwrap(), chrono::TimeDelta::minutes(90));
    /// ```
    pub fn to_time_delta(&self) -> CoreResult<chrono::TimeDelta> {
        let nanos = self.whole_nanos()?;
        let (secs, subsec) = nanos.div_mod_floor(&BigInt::from(NANOS_PER_SECOND));

        let secs = secs
            .to_i64()
            .ok_or_else(|| CoreError::out_of_range(self, "exceeds chrono::TimeDelta"))?;
        let subsec = subsec
            .to_u32()
            .ok_or_else(|| CoreError::out_of_range(self, "exceeds chrono::TimeDelta"))?;

        chrono::TimeDelta::new(secs, subsec)
            .ok_or_else(|| CoreError::out_of_range(self, "exceeds chrono::TimeDelta"))
    }

    /// Builds a duration in seconds from a `std::time::Duration`.
    pub fn from_std(duration: std::time::Duration) -> CoreResult<Self> {
        Self::from_nanos(BigInt::from(duration.as_nanos()))
    }

    /// Converts to a `std::time::Duration`, truncating below one nanosecond.
    /// Negative durations are out of range.
    pub fn to_std(&self) -> CoreResult<std::time::Duration> {
        let nanos = self.whole_nanos()?;
        if nanos < BigInt::from(0) {
            return Err(CoreError::out_of_range(self, "std::time::Duration cannot be negative"));
        }

        let (secs, subsec) = nanos.div_mod_floor(&BigInt::from(NANOS_PER_SECOND));
        let secs = secs
            .to_u64()
            .ok_or_else(|| CoreError::out_of_range(self, "exceeds std::time::Duration"))?;
        let subsec = subsec
            .to_u32()
            .ok_or_else(|| CoreError::out_of_range(self, "exceeds std::time::Duration"))?;

        Ok(std::time::Duration::new(secs, subsec))
    }

    fn from_nanos(nanos: BigInt) -> CoreResult<Self> {
        // 10^-9 seconds per nanosecond
        let seconds = Decimal::new(nanos, 9).strip_trailing_zeros();
        Self::new(seconds, UNIT_SECONDS)
    }

    fn whole_nanos(&self) -> CoreResult<BigInt> {
        self.to(UNIT_NANOSECONDS)?.to_integer(RoundingMode::Down)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_table() {
        let d = Duration::default();
        assert_eq!(d.atom_unit(), UNIT_NANOSECONDS);
        assert_eq!(d.default_unit(), UNIT_SECONDS);
        assert_eq!(d.exchange_rate("mo"), Some(Decimal::from(2_629_800)));
        assert_eq!(d.exchange_rate("ns"), Some("0.000000001".parse().unwrap()));

        let names: Vec<String> = d.sorted_units().into_iter().map(|(u, _)| u).collect();
        assert_eq!(names.first().map(String::as_str), Some(UNIT_YEARS));
        assert_eq!(names.last().map(String::as_str), Some(UNIT_NANOSECONDS));
    }

    #[test]
    fn test_aliases() {
        for (alias, unit) in ALIASES {
            assert_eq!(Duration::new(1, alias).unwrap().unit(), *unit, "alias {alias}");
        }
        assert_eq!(Duration::new(1, "HOURS").unwrap().unit(), UNIT_HOURS);
        assert_eq!(Duration::new(1, "Min").unwrap().unit(), UNIT_MINUTES);
    }

    #[test]
    fn test_shortcuts() {
        let d = Duration::new(1, "day").unwrap();
        assert_eq!(d.to_hours().unwrap(), Decimal::from(24));
        assert_eq!(d.to_minutes().unwrap(), Decimal::from(1440));
        assert_eq!(d.to_milliseconds().unwrap(), Decimal::from(86_400_000));
        assert_eq!(d.to_weeks().unwrap().to_string(), "0.14285714285714285714285714285714");

        let year = Duration::new(1, "y").unwrap();
        assert_eq!(year.to_months().unwrap(), Decimal::from(12));
        assert_eq!(year.to_days().unwrap(), "365.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_parse_iso8601() {
        let d = Duration::parse_iso8601("P1DT2H", None).unwrap();
        assert_eq!(d.magnitude(), &Decimal::from(93_600));

        let d = Duration::parse_iso8601("PT1.5S", Some("ms")).unwrap();
        assert_eq!(d.magnitude(), &Decimal::from(1500));

        let d = Duration::parse_iso8601("P1Y", Some("days")).unwrap();
        assert_eq!(d.magnitude(), &"365.25".parse::<Decimal>().unwrap());

        assert!(matches!(
            Duration::parse_iso8601("one hour", None),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_iso8601_keeps_every_digit() {
        for (text, seconds) in [
            ("PT123456789S", "123456789"),
            ("PT16777217S", "16777217"),
            ("PT0.000000001S", "0.000000001"),
            ("P1DT0.1S", "86400.1"),
        ] {
            let d = Duration::parse_iso8601(text, None).unwrap();
            assert_eq!(d.magnitude(), &seconds.parse::<Decimal>().unwrap(), "{text}");
            assert_eq!(d.unit(), UNIT_SECONDS);
        }

        let d = Duration::parse_iso8601("PT16777217S", Some("ms")).unwrap();
        assert_eq!(d.magnitude(), &Decimal::from(16_777_217_000u64));
    }

    #[test]
    fn test_chrono_round_trip() {
        let delta = chrono::TimeDelta::milliseconds(5_400_250);
        let d = Duration::from_time_delta(delta).unwrap();
        assert_eq!(d.unit(), UNIT_SECONDS);
        assert_eq!(d.magnitude(), &"5400.25".parse::<Decimal>().unwrap());
        assert_eq!(d.to_time_delta().unwrap(), delta);

        let negative = chrono::TimeDelta::milliseconds(-1500);
        let d = Duration::from_time_delta(negative).unwrap();
        assert_eq!(d.magnitude(), &"-1.5".parse::<Decimal>().unwrap());
        assert_eq!(d.to_time_delta().unwrap(), negative);
    }

    #[test]
    fn test_chrono_out_of_range() {
        let d = Duration::new(Decimal::from(10u128.pow(30)), "years").unwrap();
        assert!(matches!(d.to_time_delta(), Err(CoreError::OutOfRange { .. })));
    }

    #[test]
    fn test_std_round_trip() {
        let std = std::time::Duration::new(90, 500);
        let d = Duration::from_std(std).unwrap();
        assert_eq!(d.magnitude(), &"90.0000005".parse::<Decimal>().unwrap());
        assert_eq!(d.to_std().unwrap(), std);

        let sub_nano = Duration::new("0.0000000015".parse::<Decimal>().unwrap(), "s").unwrap();
        assert_eq!(sub_nano.to_std().unwrap(), std::time::Duration::from_nanos(1));
    }

    #[test]
    fn test_std_rejects_negative() {
        let d = Duration::new(-1, "seconds").unwrap();
        assert!(matches!(d.to_std(), Err(CoreError::OutOfRange { .. })));
    }
}
