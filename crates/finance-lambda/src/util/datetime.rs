//! UTC timestamp and calendar date formatting.
//!
//! Instants are microseconds since the Unix epoch; they render as RFC 3339
//! UTC timestamps or `YYYY-MM-DD` dates.

use std::time::{SystemTime, UNIX_EPOCH};

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

/// Current time as microseconds since the Unix epoch.
pub fn now_epoch_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Civil date for days since Unix epoch (Howard Hinnant's algorithm).
fn days_to_date(days: i32) -> (i32, u32, u32) {
    let z = days as i64 + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    let year = if m <= 2 { y + 1 } else { y } as i32;
    (year, m, d)
}

fn split_epoch_micros(epoch_micros: i64) -> (i32, i64) {
    let days = epoch_micros.div_euclid(MICROSECONDS_PER_DAY) as i32;
    let time_micros = epoch_micros.rem_euclid(MICROSECONDS_PER_DAY);
    (days, time_micros)
}

/// The UTC calendar date (`YYYY-MM-DD`) containing the given instant.
pub fn utc_date(epoch_micros: i64) -> String {
    let (year, month, day) = days_to_date(split_epoch_micros(epoch_micros).0);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Formats microseconds since the Unix epoch as an RFC 3339 UTC timestamp
/// with microsecond precision (`2024-03-15T14:30:00.000000Z`).
pub fn format_timestamp(epoch_micros: i64) -> String {
    let (days, time_micros) = split_epoch_micros(epoch_micros);
    let (year, month, day) = days_to_date(days);

    let hours = time_micros / MICROSECONDS_PER_HOUR;
    let minutes = time_micros % MICROSECONDS_PER_HOUR / MICROSECONDS_PER_MINUTE;
    let seconds = time_micros % MICROSECONDS_PER_MINUTE / MICROSECONDS_PER_SECOND;
    let micros = time_micros % MICROSECONDS_PER_SECOND;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        year, month, day, hours, minutes, seconds, micros
    )
}
