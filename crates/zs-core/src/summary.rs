//! Per-group spans and totals for a segmentation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::groups::Segmentation;
use crate::record::SegmentableRecord;

/// Time span covered by one output group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSpan<K> {
    /// Identifier (matches) or sequence number (overhead).
    pub key: K,

    /// Number of records in the group.
    pub records: usize,

    /// Timestamp of the first record.
    pub first_at: DateTime<Utc>,

    /// Timestamp of the last record.
    pub last_at: DateTime<Utc>,

    /// `last_at - first_at` in milliseconds.
    pub duration_ms: i64,
}

impl<K> GroupSpan<K> {
    fn from_records<R: SegmentableRecord>(key: K, records: &[R]) -> Option<Self> {
        let first_at = records.first()?.timestamp();
        let last_at = records.last()?.timestamp();
        Some(Self {
            key,
            records: records.len(),
            first_at,
            last_at,
            duration_ms: (last_at - first_at).num_milliseconds(),
        })
    }
}

/// Aggregate view of a segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub matches: Vec<GroupSpan<String>>,
    pub overhead: Vec<GroupSpan<u32>>,
    pub total_records: usize,
    pub matched_records: usize,
    pub overhead_records: usize,
    pub discarded_records: usize,
    pub dropped_records: usize,
    /// Sum of match group durations.
    pub match_ms: i64,
    /// Sum of overhead group durations.
    pub overhead_ms: i64,
}

/// Summarize a segmentation.
///
/// Groups are never empty when produced by [`segment`](crate::segment), so
/// every group yields a span.
pub fn summarize<R: SegmentableRecord>(segmentation: &Segmentation<R>) -> Summary {
    let matches: Vec<_> = segmentation
        .matches
        .iter()
        .filter_map(|g| GroupSpan::from_records(g.identifier.clone(), &g.records))
        .collect();
    let overhead: Vec<_> = segmentation
        .overhead
        .iter()
        .filter_map(|(&key, records)| GroupSpan::from_records(key, records))
        .collect();

    let matched_records = segmentation.matches.record_count();
    let overhead_records = segmentation.overhead_record_count();
    let discarded_records = segmentation.discarded.len();
    let dropped_records = segmentation.dropped;

    Summary {
        match_ms: matches.iter().map(|s| s.duration_ms).sum(),
        overhead_ms: overhead.iter().map(|s| s.duration_ms).sum(),
        matches,
        overhead,
        total_records: matched_records + overhead_records + discarded_records + dropped_records,
        matched_records,
        overhead_records,
        discarded_records,
        dropped_records,
    }
}
