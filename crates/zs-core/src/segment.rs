//! Segmentation state machine.
//!
//! Splits an ordered sequence of records into matches (active spans grouped
//! by identifier) and overhead (idle spans longer than a threshold).
//!
//! # Algorithm Summary
//!
//! 1. Classify each record as `Inside` (active), `Overhead` (inactive while an
//!    overhead span is already open) or `Outside` (inactive otherwise)
//! 2. Buffer `Outside` records until the gap is resolved:
//!    - activity resumes under the same identifier: the gap joins the match
//!    - the gap outlasts the threshold: the gap becomes a new overhead group
//!    - activity resumes under another identifier: the gap is abandoned
//! 3. At end of input, a still-pending gap becomes a final overhead group

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::groups::Segmentation;
use crate::record::SegmentableRecord;
use crate::types::{AbandonedGap, IdentifierSwitch, SegmenterConfig};

/// Errors that abort a segmentation pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The configured threshold was negative.
    #[error("threshold must not be negative, got {ms}ms")]
    InvalidThreshold { ms: i64 },

    /// The identifier changed between two active records and no match group
    /// exists for the new identifier.
    #[error(
        "record {index} switched from `{from}` to `{to}` while active and no match group exists for `{to}`"
    )]
    InvalidState {
        index: usize,
        from: String,
        to: String,
    },
}

/// Working classification of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Inside,
    Outside,
    Overhead,
}

impl State {
    /// Raw state before the transition policy runs.
    ///
    /// An open overhead span keeps absorbing inactive records.
    const fn classify(active: bool, previous: Self) -> Self {
        if active {
            Self::Inside
        } else if matches!(previous, Self::Overhead) {
            Self::Overhead
        } else {
            Self::Outside
        }
    }
}

/// State carried across one pass.
struct Walk<'a, R> {
    config: &'a SegmenterConfig,
    previous_state: State,
    /// Identifier of the last active record.
    previous_identifier: &'a str,
    /// Set at the Inside -> Outside transition. `None` means the gap started
    /// before the first record.
    gap_start: Option<DateTime<Utc>>,
    pending: Vec<R>,
    overhead_key: u32,
    out: Segmentation<R>,
}

impl<'a, R: SegmentableRecord + Clone> Walk<'a, R> {
    fn new(config: &'a SegmenterConfig) -> Self {
        Self {
            config,
            previous_state: State::Outside,
            previous_identifier: "",
            gap_start: None,
            pending: Vec::new(),
            overhead_key: 0,
            out: Segmentation::default(),
        }
    }

    fn step(&mut self, index: usize, record: &'a R) -> Result<(), SegmentError> {
        let mut state = State::classify(record.is_active(), self.previous_state);
        let identifier = record.identifier();

        match (state, self.previous_state) {
            (State::Inside, State::Outside) if identifier == self.previous_identifier => {
                let group = self.out.matches.get_or_create(identifier);
                if !self.pending.is_empty() {
                    tracing::debug!(
                        identifier,
                        records = self.pending.len(),
                        "short gap rejoins match"
                    );
                    group.append(&mut self.pending);
                }
                group.push(record.clone());
                self.previous_identifier = identifier;
            }
            (State::Inside, State::Outside | State::Overhead) => {
                self.abandon_pending(identifier);
                self.out.matches.get_or_create(identifier).push(record.clone());
                self.previous_identifier = identifier;
            }
            (State::Inside, State::Inside) => {
                self.continue_match(index, record)?;
                self.previous_identifier = identifier;
            }
            (State::Outside, State::Inside) => {
                self.gap_start = Some(record.timestamp());
                self.pending.push(record.clone());
            }
            (State::Outside, State::Outside) => {
                self.pending.push(record.clone());
                if self.gap_exceeds_threshold(record.timestamp()) {
                    self.commit_overhead();
                    state = State::Overhead;
                }
            }
            (State::Overhead, State::Overhead) => {
                if let Some(group) = self.out.overhead.get_mut(&self.overhead_key) {
                    group.push(record.clone());
                } else {
                    self.fault(index, state);
                }
            }
            _ => self.fault(index, state),
        }

        self.previous_state = state;
        Ok(())
    }

    /// Appends an active record that directly follows another active record.
    fn continue_match(&mut self, index: usize, record: &R) -> Result<(), SegmentError> {
        let identifier = record.identifier();
        if let Some(group) = self.out.matches.get_mut(identifier) {
            group.push(record.clone());
            return Ok(());
        }

        match self.config.identifier_switch {
            IdentifierSwitch::AutoCreate => {
                tracing::debug!(
                    from = self.previous_identifier,
                    to = identifier,
                    "identifier switched while active"
                );
                self.out
                    .matches
                    .get_or_create(identifier)
                    .push(record.clone());
                Ok(())
            }
            IdentifierSwitch::Reject => Err(SegmentError::InvalidState {
                index,
                from: self.previous_identifier.to_string(),
                to: identifier.to_string(),
            }),
        }
    }

    fn gap_exceeds_threshold(&self, at: DateTime<Utc>) -> bool {
        self.gap_start
            .is_none_or(|start| at - start > self.config.threshold)
    }

    /// Resolves a pending gap that a different identifier interrupted.
    fn abandon_pending(&mut self, resumed: &str) {
        if self.pending.is_empty() {
            return;
        }

        match self.config.abandoned_gap {
            AbandonedGap::Discard => {
                tracing::debug!(
                    from = self.previous_identifier,
                    to = resumed,
                    records = self.pending.len(),
                    "discarding abandoned gap"
                );
                self.out.discarded.append(&mut self.pending);
            }
            AbandonedGap::Overhead => self.commit_overhead(),
        }
    }

    /// Moves the pending buffer into a new overhead group.
    fn commit_overhead(&mut self) {
        self.overhead_key += 1;
        let records = std::mem::take(&mut self.pending);
        tracing::debug!(
            key = self.overhead_key,
            records = records.len(),
            "committing overhead group"
        );
        self.out.overhead.insert(self.overhead_key, records);
    }

    fn fault(&mut self, index: usize, state: State) {
        tracing::warn!(
            index,
            ?state,
            previous = ?self.previous_state,
            "unhandled state transition, dropping record"
        );
        debug_assert!(
            false,
            "unhandled transition {:?} -> {state:?} at record {index}",
            self.previous_state
        );
        self.out.dropped += 1;
    }

    fn finish(mut self) -> Segmentation<R> {
        if !self.pending.is_empty() {
            tracing::debug!("input ended inside a gap");
            self.commit_overhead();
        }
        self.out
    }
}

/// Segment an ordered sequence of records.
///
/// Records must be sorted by timestamp ascending. Unsorted input is not
/// detected and yields unspecified groupings.
///
/// # Arguments
///
/// * `records` - Records to classify (must implement `SegmentableRecord`)
/// * `config` - Threshold and policies
///
/// # Returns
///
/// The match and overhead groups, plus records that were discarded or dropped.
pub fn segment<R>(records: &[R], config: &SegmenterConfig) -> Result<Segmentation<R>, SegmentError>
where
    R: SegmentableRecord + Clone,
{
    if config.threshold < chrono::Duration::zero() {
        return Err(SegmentError::InvalidThreshold {
            ms: config.threshold.num_milliseconds(),
        });
    }

    let mut walk = Walk::new(config);
    for (index, record) in records.iter().enumerate() {
        walk.step(index, record)?;
    }
    let result = walk.finish();

    tracing::debug!(
        records = records.len(),
        matches = result.matches.len(),
        overhead = result.overhead.len(),
        discarded = result.discarded.len(),
        "segmentation complete"
    );
    Ok(result)
}
