//! Seed command for printing the synthetic demo sequence.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use zs_core::seed::seed_sequence;

use super::util::parse_timestamp;

/// Runs the seed command, writing records as JSONL.
pub fn run<W: Write>(
    writer: &mut W,
    count: usize,
    start: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let start = start.map_or(Ok(now), |s| parse_timestamp(s, now))?;
    let records = seed_sequence(start, count);
    tracing::debug!(count = records.len(), %start, "generated seed sequence");

    for record in &records {
        let line = serde_json::to_string(record).context("failed to serialize record")?;
        match writeln!(writer, "{line}") {
            Ok(()) => {}
            // Reader went away (e.g., piped to `head`)
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
            Err(e) => return Err(e).context("failed to write seed record"),
        }
    }

    Ok(())
}
