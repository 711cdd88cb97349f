//! Human-written durations
//!
//! Token lifetimes are configured the way operators type them: `90`, `15m`,
//! `1h`, `7d`. This module turns those strings into [`Duration`]s and back
//! into a short display form for startup logging.

use std::time::Duration;

use crate::{Error, Result};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Parse a human-written duration.
///
/// Accepts a bare number of seconds or a number followed by one unit suffix:
/// `s`, `m`, `h`, `d` or `w`. Surrounding whitespace is ignored. Zero is
/// rejected because a token that expires on issue is never useful.
///
/// # Examples
///
/// ```
/// use songrate_common::human_time::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
/// assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
/// assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604800));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("Duration must not be empty".to_string()));
    }

    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split_at);

    let amount: u64 = digits
        .parse()
        .map_err(|_| Error::Config(format!("Invalid duration: {:?}", input)))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => WEEK,
        other => {
            return Err(Error::Config(format!(
                "Invalid duration unit {:?} in {:?} (expected s, m, h, d or w)",
                other, input
            )))
        }
    };

    let seconds = amount
        .checked_mul(multiplier)
        .ok_or_else(|| Error::Config(format!("Duration too large: {:?}", input)))?;

    if seconds == 0 {
        return Err(Error::Config("Duration must be greater than zero".to_string()));
    }

    Ok(Duration::from_secs(seconds))
}

/// Format a duration using the largest unit that divides it evenly.
///
/// ```
/// use songrate_common::human_time::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "90m");
/// assert_eq!(format_duration(Duration::from_secs(61)), "61s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let units = [(WEEK, "w"), (DAY, "d"), (HOUR, "h"), (MINUTE, "m")];

    for (size, suffix) in units {
        if secs >= size && secs % size == 0 {
            return format!("{}{}", secs / size, suffix);
        }
    }

    format!("{}s", secs)
}
