//! Shared helpers for comma-delimited record lines

use chrono::{Local, NaiveDateTime, Timelike};

/// Every record line in both files has exactly this many fields
pub const FIELD_COUNT: usize = 5;

/// Field separator (no escaping, fields must not contain it)
pub const SEPARATOR: char = ',';

/// Timestamp format used in both files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Split a record line into exactly five trimmed fields
///
/// Returns `None` for blank lines or lines with any other field count.
pub fn split_fields(line: &str) -> Option<[&str; FIELD_COUNT]> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = [""; FIELD_COUNT];
    let mut parts = line.split(SEPARATOR);
    for slot in fields.iter_mut() {
        *slot = parts.next()?.trim();
    }
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// True if `value` can be stored as a single field
pub fn is_storable_field(value: &str) -> bool {
    !value.contains(SEPARATOR) && !value.contains('\n') && !value.contains('\r')
}
