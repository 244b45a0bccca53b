//! "M:SS" duration strings

use crate::error::{ClientError, Result};

/// Parse a wire duration into seconds.
///
/// Minutes are unbounded, seconds must be exactly two digits below 60.
/// Anything else is rejected rather than clamped.
pub fn parse_duration(raw: &str) -> Result<u32> {
    let malformed = || ClientError::MalformedDuration(raw.to_string());

    let (minutes, seconds) = raw.trim().split_once(':').ok_or_else(malformed)?;
    if minutes.is_empty()
        || seconds.len() != 2
        || !minutes.bytes().all(|b| b.is_ascii_digit())
        || !seconds.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
    let seconds: u32 = seconds.parse().map_err(|_| malformed())?;
    if seconds >= 60 {
        return Err(malformed());
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(malformed)
}

/// Render seconds as "M:SS"
pub fn format_time(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
