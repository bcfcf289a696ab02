//! Timestamps written into metadata records.
//!
//! Records use ISO-8601 without a timezone suffix, microsecond precision
//! (`2025-01-31T14:05:09.123456`).

use chrono::{Local, NaiveDateTime, Utc};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time as a naive ISO-8601 string.
pub fn now_local_iso() -> String {
    format_iso(Local::now().naive_local())
}

/// Current UTC time as a naive ISO-8601 string.
pub fn now_utc_iso() -> String {
    format_iso(Utc::now().naive_utc())
}

fn format_iso(dt: NaiveDateTime) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Parse a naive ISO-8601 timestamp as written by this crate (fractional
/// seconds optional).
pub fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Render a stored timestamp for humans (`2025-01-31 14:05:09`). Unparsable
/// input is returned unchanged.
pub fn display_timestamp(s: &str) -> String {
    parse_iso(s).map_or_else(
        || s.to_owned(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}
