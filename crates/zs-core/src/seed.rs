//! Synthetic demo sequence.
//!
//! Alternating blocks of ten one-second records: even blocks are active
//! (`zone0`, `zone2`, ...), odd blocks inactive. Record 6 is overwritten as an
//! inactive `removed` record so the first match contains a one-record gap.

use chrono::{DateTime, Duration, Utc};

use crate::record::InputRecord;

/// Number of records in the default demo sequence.
pub const DEFAULT_SEED_COUNT: usize = 100;

const BLOCK_SIZE: usize = 10;
const REMOVED_INDEX: usize = 6;

/// Generate `count` records starting at `start`, one per second.
pub fn seed_sequence(start: DateTime<Utc>, count: usize) -> Vec<InputRecord> {
    let mut records: Vec<_> = (0..count)
        .zip(0_i64..)
        .map(|(i, offset)| {
            let block = i / BLOCK_SIZE;
            InputRecord {
                timestamp: start + Duration::seconds(offset),
                active: block % 2 == 0,
                identifier: format!("zone{block}"),
            }
        })
        .collect();

    if let Some(record) = records.get_mut(REMOVED_INDEX) {
        record.active = false;
        "removed".clone_into(&mut record.identifier);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::segment::segment;
    use crate::types::SegmenterConfig;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_seed_layout() {
        let records = seed_sequence(start(), DEFAULT_SEED_COUNT);

        assert_eq!(records.len(), 100);
        assert_eq!(records[0].identifier, "zone0");
        assert!(records[0].active);
        assert_eq!(records[6].identifier, "removed");
        assert!(!records[6].active);
        assert_eq!(records[15].identifier, "zone1");
        assert!(!records[15].active);
        assert_eq!(records[99].timestamp, start() + Duration::seconds(99));
    }

    #[test]
    fn test_short_seed_has_no_removed_record() {
        let records = seed_sequence(start(), 5);
        assert!(records.iter().all(|r| r.active && r.identifier == "zone0"));
    }

    #[test]
    fn test_seed_segments_into_alternating_groups() {
        let records = seed_sequence(start(), DEFAULT_SEED_COUNT);
        let result = segment(&records, &SegmenterConfig::default()).unwrap();

        let ids: Vec<_> = result.matches.identifiers().collect();
        assert_eq!(ids, vec!["zone0", "zone2", "zone4", "zone6", "zone8"]);
        for group in &result.matches {
            assert_eq!(group.records.len(), 10, "group {}", group.identifier);
        }
        // The removed record rejoins zone0.
        assert_eq!(result.matches.get("zone0").unwrap()[6].identifier, "removed");

        let keys: Vec<_> = result.overhead.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);
        assert!(result.overhead.values().all(|g| g.len() == 10));
        assert!(result.discarded.is_empty());
    }
}
