//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (highest priority, applied by each command)     │
//! │     --alphabet base58 --scale 4                                        │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     NUMKIT_ALPHABET=base62  NUMKIT_OFFSET=1000                         │
//! │     NUMKIT_ROUNDING=half_even  NUMKIT_SCALE=4  NUMKIT_DIVIDER=", "     │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, otherwise                                         │
//! │     ~/.config/numkit/numkit.toml (Linux)                               │
//! │     ~/Library/Application Support/dev.numkit.numkit/numkit.toml (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     base36, offset 0, half_up, no fixed scale, " " divider             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [base]
//! alphabet = "base36"   # built-in name or a literal alphabet
//! offset = "0"
//!
//! [units]
//! rounding = "half_up"
//! scale = 10            # optional
//! divider = " "
//! ```

use numkit_core::{Alphabet, BaseConverter, BigInt, RoundingMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

const CONFIG_FILE_NAME: &str = "numkit.toml";

// =============================================================================
// Base Settings
// =============================================================================

/// Defaults for `encode` / `decode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSettings {
    /// Built-in alphabet name (`base58`) or a literal symbol string.
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Added before encoding, subtracted after decoding. A string so that
    /// offsets beyond 64 bits survive TOML.
    #[serde(default = "default_offset")]
    pub offset: String,
}

fn default_alphabet() -> String {
    "base36".to_string()
}

fn default_offset() -> String {
    "0".to_string()
}

impl Default for BaseSettings {
    fn default() -> Self {
        BaseSettings {
            alphabet: default_alphabet(),
            offset: default_offset(),
        }
    }
}

// =============================================================================
// Unit Settings
// =============================================================================

/// Defaults for `convert`, `parse` and `humanize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSettings {
    #[serde(default)]
    pub rounding: RoundingMode,

    /// Fractional digits of converted values. Exact when absent.
    #[serde(default)]
    pub scale: Option<u32>,

    /// Separator between humanized parts.
    #[serde(default = "default_divider")]
    pub divider: String,
}

fn default_divider() -> String {
    " ".to_string()
}

impl Default for UnitSettings {
    fn default() -> Self {
        UnitSettings {
            rounding: RoundingMode::default(),
            scale: None,
            divider: default_divider(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumkitConfig {
    #[serde(default)]
    pub base: BaseSettings,

    #[serde(default)]
    pub units: UnitSettings,
}

impl NumkitConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (numkit.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(CliError::InvalidConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Reads a config file without applying environment overrides.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that every value is usable before any command runs.
    pub fn validate(&self) -> CliResult<()> {
        self.alphabet()?;
        self.offset()?;
        Ok(())
    }

    /// Applies `NUMKIT_*` overrides from `lookup` (the process environment
    /// in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(alphabet) = lookup("NUMKIT_ALPHABET") {
            debug!(alphabet = %alphabet, "Overriding alphabet from environment");
            self.base.alphabet = alphabet;
        }

        if let Some(offset) = lookup("NUMKIT_OFFSET") {
            debug!(offset = %offset, "Overriding offset from environment");
            self.base.offset = offset;
        }

        if let Some(rounding) = lookup("NUMKIT_ROUNDING") {
            match rounding.parse() {
                Ok(mode) => self.units.rounding = mode,
                Err(_) => warn!(rounding = %rounding, "Unknown rounding mode in environment"),
            }
        }

        if let Some(scale) = lookup("NUMKIT_SCALE") {
            match scale.parse::<u32>() {
                Ok(scale) => self.units.scale = Some(scale),
                Err(_) => warn!(scale = %scale, "Invalid scale in environment"),
            }
        }

        if let Some(divider) = lookup("NUMKIT_DIVIDER") {
            self.units.divider = divider;
        }
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn alphabet(&self) -> CliResult<Alphabet> {
        self.base.alphabet.parse::<Alphabet>().map_err(|e| {
            CliError::InvalidConfig(format!("alphabet '{}': {}", self.base.alphabet, e))
        })
    }

    pub fn offset(&self) -> CliResult<BigInt> {
        self.base
            .offset
            .trim()
            .parse::<BigInt>()
            .map_err(|_| CliError::InvalidConfig(format!("offset '{}' is not an integer", self.base.offset)))
    }

    /// Converter for the configured alphabet and offset.
    pub fn base_converter(&self) -> CliResult<BaseConverter> {
        Ok(BaseConverter::new(self.alphabet()?).with_offset(self.offset()?))
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "numkit", "numkit")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = NumkitConfig::default();
        assert_eq!(config.base.alphabet, "base36");
        assert_eq!(config.units.rounding, RoundingMode::HalfUp);
        assert_eq!(config.units.scale, None);
        assert_eq!(config.units.divider, " ");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[base]
alphabet = "base58"
offset = "100000000000000000000"

[units]
rounding = "half_even"
scale = 4
"#
        )
        .unwrap();

        let config = NumkitConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base.alphabet, "base58");
        assert_eq!(config.units.rounding, RoundingMode::HalfEven);
        assert_eq!(config.units.scale, Some(4));
        // Missing keys keep their defaults
        assert_eq!(config.units.divider, " ");
        assert_eq!(config.offset().unwrap().to_string(), "100000000000000000000");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            NumkitConfig::load(Some(missing)),
            Err(CliError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[units]\nrounding = \"sideways\"").unwrap();
        assert!(matches!(
            NumkitConfig::from_file(file.path()),
            Err(CliError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NumkitConfig::default();
        config.apply_overrides(env(&[
            ("NUMKIT_ALPHABET", "01"),
            ("NUMKIT_OFFSET", "-5"),
            ("NUMKIT_ROUNDING", "floor"),
            ("NUMKIT_SCALE", "2"),
            ("NUMKIT_DIVIDER", ", "),
        ]));

        assert_eq!(config.base.alphabet, "01");
        assert_eq!(config.offset().unwrap(), BigInt::from(-5));
        assert_eq!(config.units.rounding, RoundingMode::Floor);
        assert_eq!(config.units.scale, Some(2));
        assert_eq!(config.units.divider, ", ");
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = NumkitConfig::default();
        config.apply_overrides(env(&[("NUMKIT_ROUNDING", "sideways"), ("NUMKIT_SCALE", "-1")]));
        assert_eq!(config.units, UnitSettings::default());
    }

    #[test]
    fn test_validation() {
        let mut config = NumkitConfig::default();
        config.base.alphabet = "aa".to_string();
        assert!(matches!(config.validate(), Err(CliError::InvalidConfig(_))));

        config.base.alphabet = "base62".to_string();
        config.base.offset = "ten".to_string();
        assert!(matches!(config.validate(), Err(CliError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = NumkitConfig::default();
        config.units.scale = Some(3);
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[base]"));
        assert!(rendered.contains("[units]"));
        assert_eq!(toml::from_str::<NumkitConfig>(&rendered).unwrap(), config);
    }
}
