//! Scanner for composite quantities such as `"1h 30m 15s"`.

use regex::Regex;
use std::sync::OnceLock;

use crate::decimal::Decimal;
use crate::error::{CoreError, CoreResult};

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<value>[0-9.]+)\s*(?P<unit>[A-Za-zµμ]+)").expect("Hardcode regex pattern")
    })
}

/// Splits `text` into `(value, unit suffix)` pairs in order of appearance.
///
/// Text between tokens is ignored. Unit suffixes are returned as written;
/// alias resolution belongs to the exchange table.
pub(crate) fn scan(text: &str) -> CoreResult<Vec<(Decimal, String)>> {
    let tokens = token_pattern()
        .captures_iter(text)
        .map(|caps| -> CoreResult<(Decimal, String)> {
            let value = &caps["value"];
            let unit = &caps["unit"];
            let value = value
                .parse::<Decimal>()
                .map_err(|_| CoreError::invalid_format(text, format!("'{}' is not a number", value)))?;
            Ok((value, unit.to_string()))
        })
        .collect::<CoreResult<Vec<_>>>()?;

    if tokens.is_empty() {
        return Err(CoreError::invalid_format(
            text,
            "expected one or more <number><unit> tokens",
        ));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_tokens() {
        let tokens = scan("1h 30m 15.5s").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], (Decimal::from(1), "h".to_string()));
        assert_eq!(tokens[1], (Decimal::from(30), "m".to_string()));
        assert_eq!(tokens[2], ("15.5".parse().unwrap(), "s".to_string()));
    }

    #[test]
    fn test_scan_whitespace_and_separators() {
        let tokens = scan("2 hours, 5 min and 10 µs").unwrap();
        let units: Vec<&str> = tokens.iter().map(|(_, u)| u.as_str()).collect();
        assert_eq!(units, vec!["hours", "min", "µs"]);
    }

    #[test]
    fn test_scan_without_tokens() {
        assert!(matches!(scan(""), Err(CoreError::InvalidFormat { .. })));
        assert!(matches!(scan("hours"), Err(CoreError::InvalidFormat { .. })));
        assert!(matches!(scan("42"), Err(CoreError::InvalidFormat { .. })));
    }

    #[test]
    fn test_scan_bad_number() {
        assert!(matches!(scan("1.2.3h"), Err(CoreError::InvalidFormat { .. })));
        assert!(matches!(scan(". s"), Err(CoreError::InvalidFormat { .. })));
    }
}
