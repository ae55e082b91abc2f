//! `HH:MM:SS,mmm` caption timestamps <-> seconds.

use crate::error::{Result, SubtitleError};

/// Parses `HH:MM:SS,mmm`. A `.` is accepted in place of the comma.
pub fn parse(ts: &str) -> Result<f64> {
    let ts = ts.trim();
    let mut parts = ts.splitn(3, ':');
    let (Some(h), Some(m), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SubtitleError::timestamp(ts, "expected HH:MM:SS,mmm"));
    };
    let (s, ms) = rest
        .split_once([',', '.'])
        .ok_or_else(|| SubtitleError::timestamp(ts, "missing milliseconds"))?;

    let h = field(ts, h, "hours are not a number")?;
    let m = field(ts, m, "minutes are not a number")?;
    let s = field(ts, s, "seconds are not a number")?;
    if m >= 60 || s >= 60 {
        return Err(SubtitleError::timestamp(ts, "minutes/seconds out of range"));
    }
    if ms.is_empty() || ms.len() > 3 {
        return Err(SubtitleError::timestamp(ts, "milliseconds must have 1-3 digits"));
    }
    let ms_value = field(ts, ms, "milliseconds are not a number")?;
    // "5" after the comma is 500ms, same as "500"
    let ms_value = ms_value * 10u64.pow(3 - ms.len() as u32);

    let total_ms = h
        .checked_mul(3600)
        .and_then(|v| v.checked_add(m * 60 + s))
        .and_then(|v| v.checked_mul(1000))
        .and_then(|v| v.checked_add(ms_value))
        .ok_or_else(|| SubtitleError::timestamp(ts, "timestamp out of range"))?;
    Ok(total_ms as f64 / 1000.0)
}

fn field(ts: &str, raw: &str, reason: &'static str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SubtitleError::timestamp(ts, reason));
    }
    raw.parse::<u64>()
        .map_err(|_| SubtitleError::timestamp(ts, reason))
}

/// Formats seconds as `HH:MM:SS,mmm`, rounded to the millisecond.
/// Negative and non-finite inputs clamp to zero.
pub fn format(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let (h, m, s) = (total_s / 3600, (total_s % 3600) / 60, total_s % 60);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
