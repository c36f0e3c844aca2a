//! # Command Handlers
//!
//! Every handler takes its arguments plus the loaded [`NumkitConfig`] and
//! returns the text to print. No handler writes to stdout itself.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┬──────────────────────┐
//! │ Command      │ Core call                    │ Output               │
//! ├──────────────┼──────────────────────────────┼──────────────────────┤
//! │ encode 12345 │ BaseConverter::encode_str    │ 9IX                  │
//! │ decode 9IX   │ BaseConverter::decode        │ 12345                │
//! │ convert      │ UnitConverter::convert_to    │ 1048576 bytes        │
//! │ parse        │ UnitConverter::parse         │ 5400 seconds         │
//! │ humanize     │ UnitConverter::humanize      │ 1h 2m 3s             │
//! │ config       │ NumkitConfig::to_toml        │ [base] ...           │
//! └──────────────┴──────────────────────────────┴──────────────────────┘
//! ```
//!
//! Flags override the config file, which overrides the defaults.

use numkit_core::unit::{DurationUnits, FileSizeUnits, UnitSystem};
use numkit_core::{Alphabet, BaseConverter, BigInt, Duration, HumanizeOptions, RoundingMode, Suffix, UnitConverter};
use tracing::debug;

use crate::cli::{
    AlphabetArgs, Command, ConvertArgs, DecodeArgs, Domain, EncodeArgs, HumanizeArgs, ParseArgs, RoundingArgs,
};
use crate::config::NumkitConfig;
use crate::error::{CliError, CliResult};

/// Runs one command and returns its output.
pub fn execute(command: &Command, config: &NumkitConfig) -> CliResult<String> {
    match command {
        Command::Encode(args) => encode(args, config),
        Command::Decode(args) => decode(args, config),
        Command::Convert(args) => convert(args, config),
        Command::Parse(args) => parse(args, config),
        Command::Humanize(args) => humanize(args, config),
        Command::Config => config.to_toml(),
    }
}

// =============================================================================
// Base Encoding
// =============================================================================

pub fn encode(args: &EncodeArgs, config: &NumkitConfig) -> CliResult<String> {
    let converter = base_converter(&args.alphabet, config)?;
    Ok(converter.encode_str(&args.value)?)
}

pub fn decode(args: &DecodeArgs, config: &NumkitConfig) -> CliResult<String> {
    let converter = base_converter(&args.alphabet, config)?;
    Ok(converter.decode(args.text.trim())?.to_string())
}

fn base_converter(args: &AlphabetArgs, config: &NumkitConfig) -> CliResult<BaseConverter> {
    if args.alphabet.is_none() && args.offset.is_none() {
        return config.base_converter();
    }

    let alphabet = match &args.alphabet {
        Some(alphabet) => alphabet.parse::<Alphabet>()?,
        None => config.alphabet()?,
    };
    let offset = match &args.offset {
        Some(offset) => offset
            .trim()
            .parse::<BigInt>()
            .map_err(|_| CliError::InvalidArgument(format!("offset '{}' is not an integer", offset)))?,
        None => config.offset()?,
    };

    debug!(radix = alphabet.radix(), %offset, "Using base converter");
    Ok(BaseConverter::new(alphabet).with_offset(offset))
}

// =============================================================================
// Units
// =============================================================================

pub fn convert(args: &ConvertArgs, config: &NumkitConfig) -> CliResult<String> {
    match args.domain {
        Domain::Duration => convert_in::<DurationUnits>(args, config),
        Domain::FileSize => convert_in::<FileSizeUnits>(args, config),
    }
}

fn convert_in<D: UnitSystem>(args: &ConvertArgs, config: &NumkitConfig) -> CliResult<String> {
    let (scale, mode) = rounding(&args.rounding, config);
    let quantity = UnitConverter::<D>::from_text(&args.value, Some(args.from.as_str()))?;
    let converted = quantity.convert_to(&args.to, scale, mode)?;
    render(&converted, scale, mode)
}

pub fn parse(args: &ParseArgs, config: &NumkitConfig) -> CliResult<String> {
    let (scale, mode) = rounding(&args.rounding, config);

    match (args.domain, args.iso) {
        (Domain::Duration, true) => {
            let parsed = Duration::parse_iso8601(&args.text, args.as_unit.as_deref())?;
            render(&parsed, scale, mode)
        }
        (Domain::FileSize, true) => Err(CliError::InvalidArgument(
            "--iso only applies to the duration domain".to_string(),
        )),
        (Domain::Duration, false) => parse_in::<DurationUnits>(args, scale, mode),
        (Domain::FileSize, false) => parse_in::<FileSizeUnits>(args, scale, mode),
    }
}

fn parse_in<D: UnitSystem>(args: &ParseArgs, scale: Option<u32>, mode: RoundingMode) -> CliResult<String> {
    let parsed = UnitConverter::<D>::default().with_parse(&args.text, args.as_unit.as_deref(), scale, mode)?;
    render(&parsed, scale, mode)
}

pub fn humanize(args: &HumanizeArgs, config: &NumkitConfig) -> CliResult<String> {
    let options = humanize_options(args, config);
    match args.domain {
        Domain::Duration => {
            Ok(UnitConverter::<DurationUnits>::from_text(&args.value, args.unit.as_deref())?.humanize(&options)?)
        }
        Domain::FileSize => {
            Ok(UnitConverter::<FileSizeUnits>::from_text(&args.value, args.unit.as_deref())?.humanize(&options)?)
        }
    }
}

/// `--units h,m,s` picks the units; `--suffix unit=text` overrides the
/// suffix of a listed unit, or lists the unit itself when `--units` is
/// absent.
fn humanize_options(args: &HumanizeArgs, config: &NumkitConfig) -> HumanizeOptions {
    let divider = args.divider.clone().unwrap_or_else(|| config.units.divider.clone());
    let options = HumanizeOptions::new()
        .divider(divider)
        .keep_zero(args.keep_zero)
        .without_fallback(args.without_fallback);

    if args.units.is_empty() {
        return options.unit_suffixes(args.suffixes.iter().map(|(unit, suffix)| (unit.clone(), suffix.clone())));
    }

    args.units.iter().fold(options, |options, unit| {
        match args.suffixes.iter().find(|(name, _)| name == unit) {
            Some((_, suffix)) => options.unit_with_suffix(unit.clone(), suffix.clone()),
            None => options.units([unit.clone()]),
        }
    })
}

fn rounding(args: &RoundingArgs, config: &NumkitConfig) -> (Option<u32>, RoundingMode) {
    (
        args.scale.or(config.units.scale),
        args.rounding.unwrap_or(config.units.rounding),
    )
}

/// `"<value> <unit>"`, rounded to `scale` when given.
fn render<D: UnitSystem>(quantity: &UnitConverter<D>, scale: Option<u32>, mode: RoundingMode) -> CliResult<String> {
    let spaced = Suffix::custom(|value, unit| format!("{} {}", value, unit));
    Ok(quantity.format(Some(&spaced), None, scale, mode)?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::App;
    use clap::Parser;

    fn run(argv: &[&str]) -> CliResult<String> {
        run_with(argv, &NumkitConfig::default())
    }

    fn run_with(argv: &[&str], config: &NumkitConfig) -> CliResult<String> {
        let app = App::try_parse_from(std::iter::once("numkit").chain(argv.iter().copied())).unwrap();
        execute(&app.command, config)
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(run(&["encode", "12345"]).unwrap(), "9IX");
        assert_eq!(run(&["decode", "9IX"]).unwrap(), "12345");
        assert_eq!(run(&["encode", "5", "--alphabet", "01"]).unwrap(), "101");
        assert_eq!(run(&["encode", "0", "--offset", "12345"]).unwrap(), "9IX");
        assert_eq!(run(&["decode", "9IX", "--offset", "12346"]).unwrap(), "-1");
    }

    #[test]
    fn test_encode_uses_config_defaults() {
        let mut config = NumkitConfig::default();
        config.base.alphabet = "base62".to_string();
        config.base.offset = "1000".to_string();

        let encoded = run_with(&["encode", "1"], &config).unwrap();
        assert_eq!(run_with(&["decode", encoded.as_str()], &config).unwrap(), "1");
        // Flags win over the config
        assert_eq!(run_with(&["encode", "12345", "--alphabet", "base36", "--offset", "0"], &config).unwrap(), "9IX");
    }

    #[test]
    fn test_encode_errors() {
        assert!(matches!(
            run(&["encode", "-1"]),
            Err(CliError::Core(numkit_core::CoreError::OutOfRange { .. }))
        ));
        assert!(matches!(run(&["encode", "12", "--offset", "x"]), Err(CliError::InvalidArgument(_))));
        assert!(matches!(run(&["decode", "!!"]), Err(CliError::Core(_))));
    }

    #[test]
    fn test_convert() {
        assert_eq!(
            run(&["convert", "1", "--from", "megabytes", "--to", "bytes", "--domain", "file-size"]).unwrap(),
            "1048576 bytes"
        );
        assert_eq!(run(&["convert", "90", "--from", "min", "--to", "h"]).unwrap(), "1.5 hours");
        assert_eq!(
            run(&["convert", "1", "--from", "s", "--to", "min", "--scale", "3", "--rounding", "down"]).unwrap(),
            "0.016 minutes"
        );
        assert_eq!(run(&["convert", "1h 30m", "--from", "s", "--to", "min"]).unwrap(), "90 minutes");
    }

    #[test]
    fn test_convert_uses_config_scale() {
        let mut config = NumkitConfig::default();
        config.units.scale = Some(2);
        assert_eq!(
            run_with(&["convert", "1", "--from", "s", "--to", "min"], &config).unwrap(),
            "0.02 minutes"
        );
    }

    #[test]
    fn test_convert_unknown_unit() {
        assert!(matches!(
            run(&["convert", "1", "--from", "s", "--to", "parsecs"]),
            Err(CliError::Core(numkit_core::CoreError::UnknownUnit(_)))
        ));
    }

    #[test]
    fn test_convert_rejects_extreme_scales() {
        assert!(run(&["convert", "1e-4294967290", "--from", "ns", "--to", "s"]).is_err());
        assert!(run(&["convert", "1e20000000", "--from", "ns", "--to", "s"]).is_err());
        assert!(matches!(
            run(&["convert", "1", "--from", "s", "--to", "min", "--scale", "4294967295"]),
            Err(CliError::Core(numkit_core::CoreError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(run(&["parse", "1h 30m"]).unwrap(), "5400 seconds");
        assert_eq!(run(&["parse", "30m 1h", "--as", "h"]).unwrap(), "1.5 hours");
        assert_eq!(run(&["parse", "1 KB 512 B", "--domain", "file-size"]).unwrap(), "1536 bytes");
        assert_eq!(run(&["parse", "PT1H30M", "--iso", "--as", "min"]).unwrap(), "90 minutes");
        assert!(matches!(
            run(&["parse", "PT1H", "--iso", "--domain", "file-size"]),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(run(&["parse", "later"]).is_err());
    }

    #[test]
    fn test_humanize() {
        assert_eq!(run(&["humanize", "3723", "--units", "h,m,s"]).unwrap(), "1h 2m 3s");
        assert_eq!(run(&["humanize", "0", "--units", "h,m,s"]).unwrap(), "0s");
        assert_eq!(run(&["humanize", "0", "--units", "h,m,s", "--without-fallback"]).unwrap(), "");
        assert_eq!(run(&["humanize", "3603", "--units", "h,m,s", "--keep-zero"]).unwrap(), "1h 0m 3s");
        assert_eq!(
            run(&["humanize", "1h 2m", "--units", "h,m", "--suffix", "h={} hours", "--divider", ", "]).unwrap(),
            "1 hours, 2m"
        );
        assert_eq!(
            run(&["humanize", "1536", "--unit", "kb", "--domain", "file-size", "--suffix", "mb=MB", "--suffix", "kb=KB"])
                .unwrap(),
            "1MB 512KB"
        );
    }

    #[test]
    fn test_humanize_config_divider() {
        let mut config = NumkitConfig::default();
        config.units.divider = "|".to_string();
        assert_eq!(run_with(&["humanize", "3723", "--units", "h,m,s"], &config).unwrap(), "1h|2m|3s");
    }

    #[test]
    fn test_config_command() {
        let output = run(&["config"]).unwrap();
        assert!(output.contains("alphabet = \"base36\""));
        assert!(output.contains("rounding = \"half_up\""));
    }
}
