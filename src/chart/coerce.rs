/// Fail-soft conversion of backend fields into plottable numbers
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::types::FieldValue;

/// Epoch values above this are taken to be milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Numeric value of a field, or `None` when it would plot as NaN
pub fn coerce_number(value: &FieldValue) -> Option<f64> {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        FieldValue::Other(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer seconds since the epoch.
/// Naive datetimes and bare dates are read as UTC.
pub fn coerce_timestamp(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => {
            let secs = if n.abs() >= EPOCH_MILLIS_THRESHOLD { n / 1000.0 } else { *n };
            Some(secs.floor() as i64)
        }
        FieldValue::Text(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).timestamp());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
}
