//! Report interval parsing and millisecond rounding.

use std::time::Duration;

use crate::error::{FilstatError, Result};

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Shortest interval the reporting loop accepts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Parse a human-readable duration such as `"10s"`, `"500ms"`, `".5s"` or
/// `"1m 30s"`.
///
/// Intervals under [`MIN_INTERVAL`] are rejected.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(FilstatError::InvalidInterval("empty interval".into()));
    }
    let d = humantime::parse_duration(&pad_bare_fractions(trimmed))
        .map_err(|e| FilstatError::InvalidInterval(format!("{trimmed:?}: {e}")))?;
    if d < MIN_INTERVAL {
        return Err(FilstatError::InvalidInterval(format!(
            "{trimmed:?}: must be at least {}ms",
            MIN_INTERVAL.as_millis()
        )));
    }
    Ok(d)
}

/// `.5s` -> `0.5s`, `1m.5s` -> `1m0.5s`.
fn pad_bare_fractions(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    let mut prev_digit = false;
    for c in s.chars() {
        if c == '.' && !prev_digit {
            out.push('0');
        }
        prev_digit = c.is_ascii_digit();
        out.push(c);
    }
    out
}

/// Round to the nearest whole millisecond (halves away from zero) and return
/// the result as fractional milliseconds, e.g. 1.5004s -> 1500.0.
pub fn round_to_millis(d: Duration) -> f64 {
    let millis = (d.as_nanos() + NANOS_PER_MILLI / 2) / NANOS_PER_MILLI;
    millis as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_milli() {
        assert_eq!(round_to_millis(Duration::from_millis(1500)), 1500.0);
        assert_eq!(round_to_millis(Duration::from_micros(1_500_499)), 1500.0);
        assert_eq!(round_to_millis(Duration::from_micros(1_500_500)), 1501.0);
        assert_eq!(round_to_millis(Duration::from_micros(499)), 0.0);
        assert_eq!(round_to_millis(Duration::ZERO), 0.0);
    }

    #[test]
    fn zero_interval_rejected() {
        let err = parse_interval("0s").err();
        assert!(matches!(err, Some(FilstatError::InvalidInterval(_))));
    }

    #[test]
    fn sub_millisecond_interval_rejected() {
        for s in ["1ns", "999us"] {
            let err = parse_interval(s).err();
            assert!(matches!(err, Some(FilstatError::InvalidInterval(_))), "{s}");
        }
        assert_eq!(parse_interval("1ms").ok(), Some(MIN_INTERVAL));
    }

    #[test]
    fn bare_fraction_is_padded() {
        assert_eq!(pad_bare_fractions(".5s"), "0.5s");
        assert_eq!(pad_bare_fractions("1m .5s"), "1m 0.5s");
        assert_eq!(pad_bare_fractions("1.5s"), "1.5s");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_interval(" 10s ").ok(), Some(Duration::from_secs(10)));
    }
}
