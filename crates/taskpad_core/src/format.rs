//! Due date rendering.
//!
//! Dates are shown as `dd/mm/yyyy` in a fixed UTC+05:30 offset
//! (`Asia/Kolkata`, which has no DST), so the same timestamp renders the same
//! string on every device regardless of its locale or timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Offset of the display timezone, in seconds east of UTC.
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

static DISPLAY_OFFSET: Lazy<FixedOffset> = Lazy::new(|| {
    FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).expect("valid display offset")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    InvalidTimestamp(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp(raw) => write!(f, "invalid timestamp `{raw}`"),
        }
    }
}

impl Error for FormatError {}

pub fn format_due_date(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&*DISPLAY_OFFSET)
        .format(DISPLAY_DATE_FORMAT)
        .to_string()
}

/// Parses then formats a raw persisted timestamp.
pub fn format_due_date_iso(raw: &str) -> Result<String, FormatError> {
    parse_timestamp(raw).map(|timestamp| format_due_date(&timestamp))
}

/// Accepts RFC 3339 (`2025-03-01T10:00:00.000Z`), a zone-less date-time
/// (read as UTC) or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FormatError> {
    let trimmed = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(value.with_timezone(&Utc));
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(value.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
        .ok_or_else(|| FormatError::InvalidTimestamp(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{format_due_date, format_due_date_iso, parse_timestamp, FormatError};
    use chrono::{DateTime, Utc};

    #[test]
    fn renders_day_month_year() {
        assert_eq!(
            format_due_date_iso("2025-03-01T10:00:00.000Z").unwrap(),
            "01/03/2025"
        );
    }

    #[test]
    fn uses_fixed_offset_not_utc_day() {
        // 20:00Z is already 01:30 the next day at UTC+05:30.
        assert_eq!(
            format_due_date_iso("2025-03-01T20:00:00.000Z").unwrap(),
            "02/03/2025"
        );
        assert_eq!(
            format_due_date_iso("2025-12-31T18:29:59Z").unwrap(),
            "31/12/2025"
        );
        assert_eq!(
            format_due_date_iso("2025-12-31T18:30:00Z").unwrap(),
            "01/01/2026"
        );
    }

    #[test]
    fn offset_in_input_does_not_change_instant() {
        let utc = "2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let shifted = parse_timestamp("2025-03-01T02:00:00-08:00").unwrap();
        assert_eq!(utc, shifted);
        assert_eq!(format_due_date(&utc), format_due_date(&shifted));
    }

    #[test]
    fn parses_zone_less_and_date_only_inputs_as_utc() {
        assert_eq!(
            parse_timestamp("2025-01-10T00:00:00.000").unwrap(),
            parse_timestamp("2025-01-10").unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            format_due_date_iso("tomorrow").unwrap_err(),
            FormatError::InvalidTimestamp("tomorrow".to_string())
        );
    }
}
