//! Command line definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use numkit_core::RoundingMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "numkit",
    author,
    version,
    about = "Short ids from big integers, unit conversion and humanized quantities"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,

    #[clap(flatten)]
    pub global: Global,
}

#[derive(Debug, Clone, Args)]
pub struct Global {
    /// Config file (default: numkit.toml in the platform config directory)
    #[clap(long, env = "NUMKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log conversion steps to stderr
    #[clap(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode a non-negative integer as a short string
    Encode(EncodeArgs),

    /// Decode a string back to its integer
    Decode(DecodeArgs),

    /// Convert a quantity to another unit
    Convert(ConvertArgs),

    /// Parse a composite quantity such as "1h 30m"
    Parse(ParseArgs),

    /// Break a quantity down into several units, largest first
    Humanize(HumanizeArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Unit domain of a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Domain {
    #[default]
    Duration,
    FileSize,
}

#[derive(Debug, Clone, Args)]
pub struct AlphabetArgs {
    /// Built-in alphabet name (base32, base36, base58, base62, ...) or literal symbols
    #[arg(short, long)]
    pub alphabet: Option<String>,

    /// Integer added before encoding and subtracted after decoding
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct EncodeArgs {
    /// Decimal integer
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    #[clap(flatten)]
    pub alphabet: AlphabetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    pub text: String,

    #[clap(flatten)]
    pub alphabet: AlphabetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RoundingArgs {
    /// Fractional digits of the result (exact when omitted)
    #[arg(long)]
    pub scale: Option<u32>,

    /// up, down, ceiling, floor, half_up, half_down, half_even, unnecessary
    #[arg(long)]
    pub rounding: Option<RoundingMode>,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Number, or a composite quantity such as "1h 30m"
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Unit of a plain number
    #[arg(long)]
    pub from: String,

    #[arg(long)]
    pub to: String,

    #[arg(short, long, value_enum, default_value_t = Domain::Duration)]
    pub domain: Domain,

    #[clap(flatten)]
    pub rounding: RoundingArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    pub text: String,

    /// Unit of the result (default: seconds / bytes)
    #[arg(long = "as")]
    pub as_unit: Option<String>,

    /// Read the text as an ISO-8601 duration (PT1H30M)
    #[arg(long)]
    pub iso: bool,

    #[arg(short, long, value_enum, default_value_t = Domain::Duration)]
    pub domain: Domain,

    #[clap(flatten)]
    pub rounding: RoundingArgs,
}

#[derive(Debug, Clone, Args)]
pub struct HumanizeArgs {
    /// Number, or a composite quantity such as "3723s"
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Unit of a plain number (default: seconds / bytes)
    #[arg(long)]
    pub unit: Option<String>,

    /// Units to break down into, each written as its own suffix (h,m,s)
    #[arg(long, value_delimiter = ',')]
    pub units: Vec<String>,

    /// Suffix for one unit, as unit=text; "{}" in the text marks the value
    #[arg(long = "suffix", value_parser = parse_suffix)]
    pub suffixes: Vec<(String, String)>,

    /// Separator between parts
    #[arg(long)]
    pub divider: Option<String>,

    /// Show zero parts
    #[arg(long)]
    pub keep_zero: bool,

    /// Print nothing instead of a zero fallback
    #[arg(long)]
    pub without_fallback: bool,

    #[arg(short, long, value_enum, default_value_t = Domain::Duration)]
    pub domain: Domain,
}

fn parse_suffix(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .filter(|(unit, _)| !unit.trim().is_empty())
        .map(|(unit, suffix)| (unit.trim().to_string(), suffix.to_string()))
        .ok_or_else(|| format!("expected unit=text, got '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_args() {
        let app = App::try_parse_from(["numkit", "encode", "12345", "--alphabet", "base58"]).unwrap();
        match app.command {
            Command::Encode(args) => {
                assert_eq!(args.value, "12345");
                assert_eq!(args.alphabet.alphabet.as_deref(), Some("base58"));
                assert_eq!(args.alphabet.offset, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_offset() {
        let app = App::try_parse_from(["numkit", "decode", "9IX", "--offset", "-100"]).unwrap();
        match app.command {
            Command::Decode(args) => assert_eq!(args.alphabet.offset.as_deref(), Some("-100")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_convert_args() {
        let app = App::try_parse_from([
            "numkit", "convert", "1", "--from", "MB", "--to", "B", "--domain", "file-size", "--scale", "2",
            "--rounding", "half_even",
        ])
        .unwrap();
        match app.command {
            Command::Convert(args) => {
                assert_eq!(args.domain, Domain::FileSize);
                assert_eq!(args.rounding.scale, Some(2));
                assert_eq!(args.rounding.rounding, Some(RoundingMode::HalfEven));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_humanize_args() {
        let app = App::try_parse_from([
            "numkit", "humanize", "3723", "--units", "h,m,s", "--suffix", "h= hours", "--keep-zero", "-v",
        ])
        .unwrap();
        assert!(app.global.verbose);
        match app.command {
            Command::Humanize(args) => {
                assert_eq!(args.units, vec!["h", "m", "s"]);
                assert_eq!(args.suffixes, vec![("h".to_string(), " hours".to_string())]);
                assert!(args.keep_zero);
                assert!(!args.without_fallback);
                assert_eq!(args.domain, Domain::Duration);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(App::try_parse_from(["numkit", "convert", "1", "--to", "s"]).is_err());
        assert!(App::try_parse_from(["numkit", "humanize", "1", "--suffix", "nonsense"]).is_err());
        assert!(App::try_parse_from(["numkit", "convert", "1", "--from", "s", "--to", "m", "--rounding", "sideways"]).is_err());
        assert!(App::try_parse_from(["numkit", "parse", "1h", "--domain", "weight"]).is_err());
    }

    #[test]
    fn test_parse_suffix() {
        assert_eq!(parse_suffix("h=h"), Ok(("h".to_string(), "h".to_string())));
        assert_eq!(parse_suffix("hours={} hrs"), Ok(("hours".to_string(), "{} hrs".to_string())));
        assert!(parse_suffix("=x").is_err());
        assert!(parse_suffix("hours").is_err());
    }

    #[test]
    fn test_verify_app() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }
}
