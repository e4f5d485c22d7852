//! Scheduled publish dates.
//!
//! Users type dates by hand, so a handful of layouts are accepted. Values
//! without an offset are read in the local time zone; the wire format is
//! always UTC ISO-8601 with millisecond precision.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use micropress_core::prelude::*;

/// Message shown next to an unparseable date
pub const INVALID_DATE_TEXT: &str = "Invalid date format";

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a scheduled date; `None` for blank or unrecognized text
pub fn parse_scheduled_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Blank text or a parseable date
pub fn is_valid_scheduled_date(text: &str) -> bool {
    text.trim().is_empty() || parse_scheduled_date(text).is_some()
}

/// Check a scheduled date before submission.
///
/// Blank text means "publish now" and is `Ok(None)`.
pub fn validate_scheduled_date(text: &str) -> Result<Option<DateTime<Utc>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_scheduled_date(text)
        .map(Some)
        .ok_or_else(|| Error::validation_error(format!("{}: {}", INVALID_DATE_TEXT, text.trim())))
}

/// ISO-8601 form sent to the server, or an empty string
pub fn format_scheduled_date(text: &str) -> String {
    parse_scheduled_date(text)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
