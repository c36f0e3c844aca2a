//! # Unit Exchange Table
//!
//! Rates of every unit in one domain, relative to a rate-1 reference unit,
//! plus the alias map used to normalize unit names.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Duration table (reference: seconds = 1)                     │
//! │                                                              │
//! │  nanoseconds   0.000000001   ← atom unit (smallest rate)     │
//! │  seconds       1             ← default unit                  │
//! │  hours         3600                                          │
//! │  years         31557600                                      │
//! │                                                              │
//! │  convert(m, from, to) = m × rate(from) / rate(to)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tables are shared between quantities through an `Arc` and copied on
//! write, so changing one quantity's table never leaks into another.

use num_bigint::BigInt;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::decimal::Decimal;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_exchange_rate, validate_unit_name};

/// Extra alias hook, applied after the built-in alias map.
pub type UnitNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A built-in rate: `(unit, unscaled, scale)`, i.e. `unscaled × 10^-scale`.
pub(crate) type StaticRate = (&'static str, u128, u32);

/// Exchange rates, aliases, atom unit and default unit of one domain.
#[derive(Clone)]
pub struct UnitTable {
    rates: Vec<(String, Decimal)>,
    aliases: HashMap<String, String>,
    atom_unit: String,
    default_unit: String,
    normalizer: Option<UnitNormalizer>,
}

impl UnitTable {
    /// Builds a table from `(unit, rate)` pairs.
    ///
    /// ## Rules
    /// - At least one unit
    /// - Every rate strictly positive
    /// - `default_unit` must be one of the units
    /// - The atom unit is the unit with the smallest rate (first one on ties)
    ///
    /// ## Example
    /// ```rust
    /// use numkit_core::decimal::Decimal;
    /// use numkit_core::unit::UnitTable;
    ///
    /// let table = UnitTable::new(
    ///     vec![("grams", Decimal::from(1)), ("kilograms", Decimal::from(1000))],
    ///     "kilograms",
    /// )
    /// .unwrap();
    /// assert_eq!(table.atom_unit(), "grams");
    /// ```
    pub fn new<I, S>(rates: I, default_unit: &str) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let mut table = UnitTable {
            rates: Vec::new(),
            aliases: HashMap::new(),
            atom_unit: String::new(),
            default_unit: default_unit.trim().to_string(),
            normalizer: None,
        };

        for (unit, rate) in rates {
            let unit: String = unit.into();
            table.insert(&unit, rate, false)?;
        }

        if table.rates.is_empty() {
            return Err(ValidationError::Required {
                field: "exchange table".to_string(),
            }
            .into());
        }
        if table.rate(&table.default_unit).is_none() {
            return Err(CoreError::UnknownUnit(table.default_unit.clone()));
        }

        table.refresh_atom_unit();
        Ok(table)
    }

    /// Table with no units. Only useful as a starting point for
    /// `with_unit_exchanges`.
    pub fn empty() -> Self {
        UnitTable {
            rates: Vec::new(),
            aliases: HashMap::new(),
            atom_unit: String::new(),
            default_unit: String::new(),
            normalizer: None,
        }
    }

    /// Built-in tables are compile-time constants and skip validation.
    pub(crate) fn builtin(
        rates: &[StaticRate],
        aliases: &[(&str, &str)],
        atom_unit: &str,
        default_unit: &str,
    ) -> Self {
        UnitTable {
            rates: rates
                .iter()
                .map(|(unit, unscaled, scale)| {
                    (unit.to_string(), Decimal::new(BigInt::from(*unscaled), *scale))
                })
                .collect(),
            aliases: aliases
                .iter()
                .map(|(alias, unit)| (alias.to_string(), unit.to_string()))
                .collect(),
            atom_unit: atom_unit.to_string(),
            default_unit: default_unit.to_string(),
            normalizer: None,
        }
    }

    /// Adds aliases (`"h" → "hours"`). Exact-case aliases win over
    /// lower-cased lookups.
    pub fn with_aliases<I, A, U>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (A, U)>,
        A: Into<String>,
        U: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(a, u)| (a.into(), u.into())));
        self
    }

    pub fn atom_unit(&self) -> &str {
        &self.atom_unit
    }

    pub fn default_unit(&self) -> &str {
        &self.default_unit
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Unit names in table order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.rates.iter().map(|(unit, _)| unit.as_str())
    }

    /// Rate of a canonical unit name (no alias resolution).
    pub fn rate(&self, unit: &str) -> Option<&Decimal> {
        self.rates
            .iter()
            .find(|(name, _)| name == unit)
            .map(|(_, rate)| rate)
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.rate(unit).is_some()
    }

    /// Resolves a user-supplied unit name to its canonical form.
    ///
    /// ## Resolution Order
    /// ```text
    /// "B"      → exact alias          → "bytes"
    /// "KB"     → lower-cased alias    → "kilobytes"
    /// "Hours"  → lower-cased unit     → "hours"
    /// other    → unchanged
    /// …then the custom normalizer, if any
    /// ```
    pub fn normalize(&self, unit: &str) -> String {
        let unit = unit.trim();
        let lower = unit.to_lowercase();

        let canonical = if let Some(canonical) = self.aliases.get(unit) {
            canonical.clone()
        } else if let Some(canonical) = self.aliases.get(&lower) {
            canonical.clone()
        } else if self.contains(&lower) {
            lower
        } else {
            unit.to_string()
        };

        match &self.normalizer {
            Some(normalizer) => normalizer(&canonical),
            None => canonical,
        }
    }

    /// Units ordered by descending rate, largest first. Ties keep table
    /// order.
    pub fn sorted_units(&self) -> Vec<(String, Decimal)> {
        let mut units = self.rates.clone();
        units.sort_by(|(_, a), (_, b)| b.cmp(a));
        units
    }

    /// Adds or replaces a unit. `prepend` moves it to the front of the
    /// table order.
    pub(crate) fn insert(&mut self, unit: &str, rate: Decimal, prepend: bool) -> CoreResult<()> {
        let unit = unit.trim();
        validate_exchange_rate(unit, &rate)?;

        match self.rates.iter().position(|(name, _)| name == unit) {
            Some(index) if !prepend => self.rates[index].1 = rate,
            Some(index) => {
                self.rates.remove(index);
                self.rates.insert(0, (unit.to_string(), rate));
            }
            None if prepend => self.rates.insert(0, (unit.to_string(), rate)),
            None => self.rates.push((unit.to_string(), rate)),
        }

        if self.atom_unit.is_empty() {
            self.refresh_atom_unit();
        }
        Ok(())
    }

    /// Removes a unit. Removing the atom unit promotes the next smallest.
    pub(crate) fn remove(&mut self, unit: &str) {
        self.rates.retain(|(name, _)| name != unit);
        if self.atom_unit == unit {
            self.refresh_atom_unit();
        }
    }

    /// Replaces every rate, keeping aliases and the normalizer.
    pub(crate) fn replace_rates(
        &mut self,
        rates: Vec<(String, Decimal)>,
        default_unit: &str,
    ) -> CoreResult<()> {
        validate_unit_name(default_unit)?;

        let mut replacement = UnitTable::new(rates, default_unit)?;
        replacement.aliases = std::mem::take(&mut self.aliases);
        replacement.normalizer = self.normalizer.take();
        *self = replacement;
        Ok(())
    }

    pub(crate) fn set_normalizer(&mut self, normalizer: UnitNormalizer) {
        self.normalizer = Some(normalizer);
    }

    fn refresh_atom_unit(&mut self) {
        self.atom_unit = self
            .rates
            .iter()
            .fold(None::<&(String, Decimal)>, |smallest, entry| match smallest {
                Some(current) if current.1 <= entry.1 => Some(current),
                _ => Some(entry),
            })
            .map(|(unit, _)| unit.clone())
            .unwrap_or_default();
    }
}

impl fmt::Debug for UnitTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitTable")
            .field("rates", &self.rates)
            .field("aliases", &self.aliases.len())
            .field("atom_unit", &self.atom_unit)
            .field("default_unit", &self.default_unit)
            .field("normalizer", &self.normalizer.is_some())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> UnitTable {
        UnitTable::new(
            vec![
                ("grams", Decimal::from(1)),
                ("kilograms", Decimal::from(1000)),
                ("tonnes", Decimal::from(1_000_000)),
            ],
            "kilograms",
        )
        .unwrap()
        .with_aliases(vec![("g", "grams"), ("kg", "kilograms"), ("t", "tonnes")])
    }

    #[test]
    fn test_new_validates() {
        assert!(UnitTable::new(Vec::<(String, Decimal)>::new(), "x").is_err());
        assert!(matches!(
            UnitTable::new(vec![("a", Decimal::from(1))], "b").unwrap_err(),
            CoreError::UnknownUnit(_)
        ));
        assert!(matches!(
            UnitTable::new(vec![("a", Decimal::zero())], "a").unwrap_err(),
            CoreError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_atom_unit_is_smallest_rate() {
        let table = weights();
        assert_eq!(table.atom_unit(), "grams");
        assert_eq!(table.default_unit(), "kilograms");
    }

    #[test]
    fn test_normalize() {
        let table = weights();
        assert_eq!(table.normalize("kg"), "kilograms");
        assert_eq!(table.normalize("KG"), "kilograms");
        assert_eq!(table.normalize(" Tonnes "), "tonnes");
        assert_eq!(table.normalize("stone"), "stone");
    }

    #[test]
    fn test_custom_normalizer_runs_last() {
        let mut table = weights();
        table.set_normalizer(Arc::new(|unit: &str| {
            if unit == "lb" {
                "grams".to_string()
            } else {
                unit.to_string()
            }
        }));
        assert_eq!(table.normalize("lb"), "grams");
        assert_eq!(table.normalize("kg"), "kilograms");
    }

    #[test]
    fn test_sorted_units_descending_and_stable() {
        let mut table = weights();
        table.insert("megagrams", Decimal::from(1_000_000), false).unwrap();

        let names: Vec<String> = table.sorted_units().into_iter().map(|(u, _)| u).collect();
        assert_eq!(names, vec!["tonnes", "megagrams", "kilograms", "grams"]);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut table = weights();
        table.insert("milligrams", "0.001".parse().unwrap(), true).unwrap();
        assert_eq!(table.units().next(), Some("milligrams"));
        // Atom unit is fixed by construction, not by later inserts
        assert_eq!(table.atom_unit(), "grams");

        table.insert("grams", Decimal::from(2), false).unwrap();
        assert_eq!(table.rate("grams"), Some(&Decimal::from(2)));

        assert!(table.insert("broken", Decimal::from(-5), false).is_err());

        table.remove("grams");
        assert!(!table.contains("grams"));
        assert_eq!(table.atom_unit(), "milligrams");
    }

    #[test]
    fn test_replace_rates_keeps_aliases() {
        let mut table = weights();
        table
            .replace_rates(
                vec![
                    ("grams".to_string(), Decimal::from(1)),
                    ("pounds".to_string(), "453.59237".parse().unwrap()),
                ],
                "pounds",
            )
            .unwrap();

        assert_eq!(table.default_unit(), "pounds");
        assert_eq!(table.normalize("g"), "grams");
        assert!(!table.contains("kilograms"));
    }
}
