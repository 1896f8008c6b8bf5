//! Core segmentation logic for the zone segmenter.
//!
//! This crate contains:
//! - Segmentation: classifying records into matches and overhead
//! - Summary: per-group spans and totals
//! - Seed: the synthetic demo sequence

mod groups;
mod record;
pub mod seed;
mod segment;
mod summary;
mod types;

pub use groups::{MatchGroup, MatchGroups, OverheadGroups, Segmentation};
pub use record::{InputRecord, SegmentableRecord};
pub use segment::{SegmentError, segment};
pub use summary::{GroupSpan, Summary, summarize};
pub use types::{
    AbandonedGap, DEFAULT_THRESHOLD_MS, IdentifierSwitch, ParseError, SegmenterConfig,
};
