//! Compact duration strings such as `30s`, `5m`, `1h` or `7d`

use std::time::Duration;

use crate::error::{DurationReason, Error, Result};

/// Parse a unit-suffixed duration into whole seconds
///
/// Accepted units are `s`, `m`, `h` and `d`. The magnitude must be a
/// non-negative integer; `1.5h`, `-5m`, `h` and `10` are all rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let fail = |reason| Error::DurationParse {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let unit = trimmed.chars().last().ok_or(fail(DurationReason::MissingUnit))?;

    let multiplier: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        c if c.is_ascii_digit() => return Err(fail(DurationReason::MissingUnit)),
        c => return Err(fail(DurationReason::UnknownUnit(c))),
    };

    let magnitude = &trimmed[..trimmed.len() - unit.len_utf8()];
    // u64::from_str tolerates a leading '+', the compact form does not
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(fail(DurationReason::BadMagnitude));
    }

    let count: u64 = magnitude
        .parse()
        .map_err(|_| fail(DurationReason::Overflow))?;
    let seconds = count
        .checked_mul(multiplier)
        .ok_or(fail(DurationReason::Overflow))?;

    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(parse_duration("45s").unwrap().as_secs(), 45);
        assert_eq!(parse_duration("30m").unwrap().as_secs(), 30 * 60);
        assert_eq!(parse_duration("24h").unwrap().as_secs(), 24 * 3600);
        assert_eq!(parse_duration("7d").unwrap().as_secs(), 7 * 86400);
    }

    #[test]
    fn test_multipliers_hold_across_magnitudes() {
        for n in [0u64, 1, 2, 15, 60, 1000] {
            for (unit, factor) in [("s", 1), ("m", 60), ("h", 3600), ("d", 86400)] {
                let parsed = parse_duration(&format!("{}{}", n, unit)).unwrap();
                assert_eq!(parsed.as_secs(), n * factor, "{}{}", n, unit);
            }
        }
    }

    #[test]
    fn test_unknown_unit() {
        let err = parse_duration("5w").unwrap_err();
        assert!(matches!(
            err,
            Error::DurationParse {
                reason: DurationReason::UnknownUnit('w'),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_unit() {
        for input in ["", "10", "   "] {
            let err = parse_duration(input).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::DurationParse {
                        reason: DurationReason::MissingUnit,
                        ..
                    }
                ),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_non_integer_magnitude() {
        for input in ["1.5h", "-5m", "+5m", "h", "abcs", "1 h"] {
            let err = parse_duration(input).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::DurationParse {
                        reason: DurationReason::BadMagnitude,
                        ..
                    }
                ),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_overflow() {
        let err = parse_duration("99999999999999999999d").unwrap_err();
        assert!(matches!(
            err,
            Error::DurationParse {
                reason: DurationReason::Overflow,
                ..
            }
        ));

        let err = parse_duration(&format!("{}d", u64::MAX / 2)).unwrap_err();
        assert!(matches!(
            err,
            Error::DurationParse {
                reason: DurationReason::Overflow,
                ..
            }
        ));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_duration(" 1h ").unwrap().as_secs(), 3600);
    }
}
