//! Timer text parsing.
//!
//! Timers are typed as hour, minute and second components, each a decimal
//! number followed by its unit, e.g. `1h30m`, `2m7s` or `0h2m7s`. Components
//! are optional but must appear in that order, and at least one is needed.

use std::time::Duration;

use crate::error::ValidationError;

/// Parse timer text into a duration.
///
/// Units are case-insensitive. Surrounding whitespace is ignored.
pub fn parse_timer(text: &str) -> Result<Duration, ValidationError> {
    let malformed = || ValidationError::MalformedTimer { text: text.to_string() };

    let mut rest = text.trim();
    if rest.is_empty() {
        return Err(malformed());
    }

    let mut total: u64 = 0;
    let mut last_rank = 0;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(malformed)?;
        if digits_end == 0 {
            return Err(malformed());
        }

        let value: u64 = rest[..digits_end].parse().map_err(|_| malformed())?;
        let unit = rest[digits_end..].chars().next().ok_or_else(malformed)?;
        let (rank, scale) = match unit.to_ascii_lowercase() {
            'h' => (1, 3600),
            'm' => (2, 60),
            's' => (3, 1),
            _ => return Err(malformed()),
        };

        // h before m before s, each at most once
        if rank <= last_rank {
            return Err(malformed());
        }
        last_rank = rank;

        total = value
            .checked_mul(scale)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(malformed)?;
        rest = &rest[digits_end + unit.len_utf8()..];
    }

    if total == 0 {
        return Err(ValidationError::ZeroTimer);
    }
    Ok(Duration::from_secs(total))
}

/// Render a duration in the same notation [`parse_timer`] accepts.
///
/// Zero components are omitted; sub-second precision is dropped.
pub fn format_timer(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = String::new();
    for (value, unit) in [(hours, 'h'), (minutes, 'm'), (seconds, 's')] {
        if value > 0 {
            out.push_str(&value.to_string());
            out.push(unit);
        }
    }
    if out.is_empty() {
        out.push_str("0s");
    }
    out
}
