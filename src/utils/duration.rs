// ABOUTME: Parses human duration strings such as "15m" or "7d" into seconds
// ABOUTME: Used to resolve token lifetimes at issuance time
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Resolve a duration string to whole seconds, rounding down
///
/// Bare digits are seconds (`"90"`). Anything else goes through `humantime`:
/// `"15m"`, `"7d"`, `"2 hours"`, `"1h 30m"`, `"500ms"`. Units are case-sensitive
/// (`M` is months, `m` minutes) and amounts are whole numbers.
/// Returns `None` for anything else.
#[must_use]
pub fn parse_duration_secs(input: &str) -> Option<i64> {
    let trimmed = input.trim();

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse().ok();
    }

    let duration = humantime::parse_duration(trimmed).ok()?;
    i64::try_from(duration.as_secs()).ok()
}
