//! Time-string parsing for user-supplied positions and ranges.
//!
//! Accepted forms: plain seconds (`12.5`), `MM:SS(.fff)` and `HH:MM:SS(.fff)`.
//! Ranges are written `START-END`, speed ranges `START-END@SPEED` where the
//! speed may carry a trailing `x` (`2x`).

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::types::{SpeedRange, TimeRange};

static SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

static HH_MM_SS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):([0-5]?\d):([0-5]?\d(?:\.\d+)?)$").expect("valid regex")
});

static MM_SS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-5]?\d):([0-5]?\d(?:\.\d+)?)$").expect("valid regex"));

/// Parse a time value into seconds.
pub fn parse_time(value: &str) -> Result<f64> {
    let text = value.trim();
    if text.is_empty() {
        return Err(Error::invalid_input("empty time value"));
    }

    if SECONDS.is_match(text) {
        return number(text);
    }

    if let Some(caps) = HH_MM_SS.captures(text) {
        let hours = number(&caps[1])?;
        let minutes = number(&caps[2])?;
        let seconds = number(&caps[3])?;
        return Ok(hours * 3600.0 + minutes * 60.0 + seconds);
    }

    if let Some(caps) = MM_SS.captures(text) {
        let minutes = number(&caps[1])?;
        let seconds = number(&caps[2])?;
        return Ok(minutes * 60.0 + seconds);
    }

    Err(Error::invalid_input(format!("unsupported time format: {value}")))
}

/// Parse `START-END` into a raw (not yet normalized) range.
pub fn parse_range(value: &str) -> Result<TimeRange> {
    let (start, end) = value
        .split_once('-')
        .ok_or_else(|| Error::invalid_input(format!("expected START-END, got {value}")))?;
    Ok(TimeRange::new(parse_time(start)?, parse_time(end)?))
}

/// Parse `START-END@SPEED` into a raw speed range.
pub fn parse_speed_range(value: &str) -> Result<SpeedRange> {
    let (range, speed) = value
        .split_once('@')
        .ok_or_else(|| Error::invalid_input(format!("expected START-END@SPEED, got {value}")))?;
    let range = parse_range(range)?;
    let speed = parse_speed(speed)?;
    Ok(SpeedRange::new(range.start, range.end, speed))
}

/// Parse a speed multiplier such as `2`, `1.5` or `2x`.
pub fn parse_speed(value: &str) -> Result<f64> {
    let text = value.trim().to_lowercase();
    let text = text.strip_suffix('x').unwrap_or(&text);
    text.parse::<f64>()
        .map_err(|_| Error::invalid_input(format!("invalid speed value: {value}")))
}

fn number(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|e| Error::invalid_input(format!("invalid number {text}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_time("12").unwrap(), 12.0);
        assert_eq!(parse_time(" 2.75 ").unwrap(), 2.75);
    }

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(parse_time("1:05").unwrap(), 65.0);
        assert_eq!(parse_time("0:02.5").unwrap(), 2.5);
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(parse_time("01:02:03").unwrap(), 3723.0);
        assert_eq!(parse_time("0:00:01.25").unwrap(), 1.25);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_time("").is_err());
        assert!(parse_time("abc").is_err());
        assert!(parse_time("1:75").is_err());
        assert!(matches!(parse_time("-1"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("1-3").unwrap(), TimeRange::new(1.0, 3.0));
        assert_eq!(parse_range("0:04-0:02").unwrap(), TimeRange::new(4.0, 2.0));
        assert!(parse_range("3").is_err());
    }

    #[test]
    fn test_parse_speed_range() {
        assert_eq!(
            parse_speed_range("3-1@2x").unwrap(),
            SpeedRange::new(3.0, 1.0, 2.0)
        );
        assert_eq!(
            parse_speed_range("0-2@0.1").unwrap(),
            SpeedRange::new(0.0, 2.0, 0.1)
        );
        assert!(parse_speed_range("0-2").is_err());
        assert!(parse_speed_range("0-2@fast").is_err());
    }
}
