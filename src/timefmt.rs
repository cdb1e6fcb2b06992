//! Wall-clock timestamp formatting for transaction records.
//!
//! The record store speaks RFC 3339 strings; this module produces them
//! from [`SystemTime`] without pulling in a calendar dependency.

use std::time::{SystemTime, UNIX_EPOCH};

/// Produces an ISO 8601 timestamp string from the current system time.
pub fn iso_timestamp() -> String {
    format_epoch(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64,
    )
}

/// Formats microseconds since the UNIX epoch as an ISO 8601 string.
pub fn format_epoch(epoch_micros: u64) -> String {
    let secs = epoch_micros / 1_000_000;
    let micros = epoch_micros % 1_000_000;

    let time_secs = secs % 86400;
    let hours = time_secs / 3600;
    let minutes = (time_secs % 3600) / 60;
    let seconds = time_secs % 60;

    // Civil date from days since epoch (algorithm from Howard Hinnant)
    let z = (secs / 86400) as i64 + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        y, m, d, hours, minutes, seconds, micros
    )
}
