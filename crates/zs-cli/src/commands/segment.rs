//! Segment command for classifying record files.
//!
//! Reads JSONL records from files (or stdin), segments each input
//! independently and prints matches and overhead as text or JSON.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use zs_core::{
    InputRecord, MatchGroups, OverheadGroups, SegmentableRecord, SegmenterConfig, Segmentation,
    Summary, segment, summarize,
};

use super::util::{format_duration, format_timestamp};

/// Where a record sequence is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Maps CLI inputs to sources. No inputs means stdin; `-` is stdin.
    ///
    /// Stdin can only be read once, so `-` may appear at most once.
    pub fn from_inputs(inputs: &[PathBuf]) -> Result<Vec<Self>> {
        if inputs.is_empty() {
            return Ok(vec![Self::Stdin]);
        }
        let sources: Vec<Self> = inputs
            .iter()
            .map(|p| {
                if p.as_os_str() == "-" {
                    Self::Stdin
                } else {
                    Self::File(p.clone())
                }
            })
            .collect();
        let stdin_count = sources.iter().filter(|s| matches!(s, Self::Stdin)).count();
        if stdin_count > 1 {
            anyhow::bail!("stdin (`-`) given {stdin_count} times; it can only be read once");
        }
        Ok(sources)
    }

    fn load(&self) -> Result<Vec<InputRecord>> {
        match self {
            Self::Stdin => read_records(io::stdin().lock(), &self.to_string()),
            Self::File(path) => load_file(path),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn load_file(path: &Path) -> Result<Vec<InputRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_records(BufReader::new(file), &path.display().to_string())
}

/// Parse JSONL records. Blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R, label: &str) -> Result<Vec<InputRecord>> {
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {label}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: InputRecord = serde_json::from_str(line)
            .with_context(|| format!("{label}:{}: invalid record", n + 1))?;
        records.push(record);
    }
    tracing::debug!(source = label, records = records.len(), "loaded records");
    Ok(records)
}

/// Segmentation of a single source.
#[derive(Debug)]
pub struct SourceResult {
    pub source: Source,
    pub segmentation: Segmentation<InputRecord>,
    pub summary: Summary,
}

/// JSON output document for one source.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    source: String,
    matches: &'a MatchGroups<InputRecord>,
    overhead: &'a OverheadGroups<InputRecord>,
    discarded: &'a [InputRecord],
    dropped: usize,
    summary: &'a Summary,
}

impl<'a> From<&'a SourceResult> for JsonOutput<'a> {
    fn from(result: &'a SourceResult) -> Self {
        Self {
            source: result.source.to_string(),
            matches: &result.segmentation.matches,
            overhead: &result.segmentation.overhead,
            discarded: &result.segmentation.discarded,
            dropped: result.segmentation.dropped,
            summary: &result.summary,
        }
    }
}

/// Load and segment every source. Sources are processed in parallel; each
/// sequence is walked by a single thread. Results keep input order.
pub fn segment_sources(sources: &[Source], config: &SegmenterConfig) -> Result<Vec<SourceResult>> {
    sources
        .par_iter()
        .map(|source| -> Result<SourceResult> {
            let records = source.load()?;
            let segmentation =
                segment(&records, config).with_context(|| format!("failed to segment {source}"))?;
            let summary = summarize(&segmentation);
            Ok(SourceResult {
                source: source.clone(),
                segmentation,
                summary,
            })
        })
        .collect()
}

/// Runs the segment command.
pub fn run<W: Write>(
    writer: &mut W,
    inputs: &[PathBuf],
    config: &SegmenterConfig,
    json: bool,
) -> Result<()> {
    let sources = Source::from_inputs(inputs)?;
    let results = segment_sources(&sources, config)?;

    if json {
        for result in &results {
            serde_json::to_writer(&mut *writer, &JsonOutput::from(result))
                .context("failed to serialize segmentation")?;
            writeln!(writer)?;
        }
        return Ok(());
    }

    let show_source = results.len() > 1;
    for (i, result) in results.iter().enumerate() {
        if show_source {
            if i > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "== {}", result.source)?;
        }
        write!(
            writer,
            "{}",
            format_text(&result.segmentation, &result.summary)
        )?;
    }

    Ok(())
}

// ========== Text Formatting ==========

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn display_identifier(identifier: &str) -> &str {
    if identifier.is_empty() {
        "(empty)"
    } else {
        identifier
    }
}

fn write_record<R: SegmentableRecord>(output: &mut String, record: &R) {
    let state = if record.is_active() { "active" } else { "idle" };
    let line = format!(
        "    {} {state:<6} {}",
        format_timestamp(record.timestamp()),
        record.identifier()
    );
    writeln!(output, "{}", line.trim_end()).unwrap();
}

/// Formats a segmentation as human-readable text.
pub fn format_text(segmentation: &Segmentation<InputRecord>, summary: &Summary) -> String {
    let mut output = String::new();

    writeln!(output, "Matches:").unwrap();
    if segmentation.matches.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for (group, span) in segmentation.matches.iter().zip(&summary.matches) {
        writeln!(
            output,
            "  {} ({}, {})",
            display_identifier(&group.identifier),
            plural(span.records, "record"),
            format_duration(span.duration_ms)
        )
        .unwrap();
        for record in &group.records {
            write_record(&mut output, record);
        }
    }

    writeln!(output, "Overhead:").unwrap();
    if segmentation.overhead.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for (records, span) in segmentation.overhead.values().zip(&summary.overhead) {
        writeln!(
            output,
            "  #{} ({}, {})",
            span.key,
            plural(span.records, "record"),
            format_duration(span.duration_ms)
        )
        .unwrap();
        for record in records {
            write_record(&mut output, record);
        }
    }

    if !segmentation.discarded.is_empty() {
        writeln!(output, "Discarded:").unwrap();
        for record in &segmentation.discarded {
            write_record(&mut output, record);
        }
    }

    writeln!(
        output,
        "Totals: {}, {} matched ({}), {} overhead ({}), {} discarded, {} dropped",
        plural(summary.total_records, "record"),
        summary.matched_records,
        format_duration(summary.match_ms),
        summary.overhead_records,
        format_duration(summary.overhead_ms),
        summary.discarded_records,
        summary.dropped_records
    )
    .unwrap();

    output
}
