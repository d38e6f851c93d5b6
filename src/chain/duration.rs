use crate::error::{TimelineError, TimelineResult};
use crate::hasher::validate_digest;

/// Leading hex characters of the digest consumed by the duration scaling (64 bits).
const DURATION_PREFIX_HEX: usize = 16;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Scale a digest into a bounded duration.
///
/// The leading 64 bits of the digest are parsed as an unsigned integer `h` and
/// scaled as `floor(h * max_interval_ms / (2^64 - 1))`. The intermediate
/// product is carried in 128-bit arithmetic; the entire system's
/// reproducibility guarantee rests on this being bit-exact, so no floating
/// point is allowed anywhere on this path.
pub fn hash_to_duration(digest: &str, max_interval_ms: u64) -> TimelineResult<u64> {
    validate_digest(digest)?;
    let prefix = &digest[..DURATION_PREFIX_HEX];
    let h = u64::from_str_radix(prefix, 16).map_err(|err| {
        TimelineError::hash_failure(format!("unparseable digest prefix {prefix:?}: {err}"))
    })?;
    let scaled = (h as u128 * max_interval_ms as u128) / (u64::MAX as u128);
    Ok(scaled as u64)
}

/// Compact `"Xd Xh Xm Xs"` rendering. Zero components are omitted; a duration
/// below one second collapses to `"0s"`.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / MS_PER_SECOND;
    let days = total_secs / 86_400;
    let hours = total_secs % 86_400 / 3_600;
    let minutes = total_secs % 3_600 / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}s"));
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

/// Inverse of [`format_duration`]: sums `<number><unit>` tokens with units
/// d/h/m/s, case-insensitive. Anything that does not match contributes
/// nothing; junk input is ignored rather than rejected.
pub fn parse_duration(input: &str) -> u64 {
    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit_ms = match ch.to_ascii_lowercase() {
            'd' => MS_PER_DAY,
            'h' => MS_PER_HOUR,
            'm' => MS_PER_MINUTE,
            's' => MS_PER_SECOND,
            _ => {
                digits.clear();
                continue;
            }
        };
        if let Ok(value) = digits.parse::<u64>() {
            total = total.saturating_add(value.saturating_mul(unit_ms));
        }
        digits.clear();
    }
    total
}
