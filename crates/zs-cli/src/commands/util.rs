//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day)s?\s+ago$").expect("valid regex")
});

/// Upper bound for relative offsets (~100 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Parse a timestamp relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - "now"
/// - Relative: "30 seconds ago", "2 hours ago", "1 day ago"
pub fn parse_timestamp(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s == "now" {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "invalid timestamp: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z), 'now', or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 24 * 60 * 60,
        unit => anyhow::bail!("unknown time unit: {unit}"),
    };

    let seconds = n
        .checked_mul(seconds_per_unit)
        .filter(|&secs| secs <= MAX_RELATIVE_SECONDS)
        .with_context(|| format!("relative time too large: {s}"))?;

    Ok(now - Duration::seconds(seconds))
}

/// Formats a timestamp for text output, e.g. `2025-01-15T09:00:00Z`.
///
/// Sub-second precision is shown only when present.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Formats milliseconds as a compact duration.
///
/// Returns "Xh Ym", "Xm Ys", "Xs" or "Xms" depending on magnitude.
/// Negative durations are treated as 0s.
pub fn format_duration(ms: i64) -> String {
    if ms <= 0 {
        return "0s".to_string();
    }
    if ms < 1_000 {
        return format!("{ms}ms");
    }

    let total_secs = ms / 1_000;
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
