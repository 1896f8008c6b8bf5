//! Input records consumed by the segmenter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record suitable for segmentation.
///
/// This trait allows the segmenter to work with different record
/// representations (e.g., [`InputRecord`] parsed from JSONL, or test fixtures).
pub trait SegmentableRecord {
    /// Returns when the record was observed.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Returns whether the record belongs to an active interval.
    fn is_active(&self) -> bool;

    /// Returns the identifier of the active interval.
    ///
    /// Carried on inactive records too, where it has no meaning.
    fn identifier(&self) -> &str;
}

/// One observed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Whether this record is inside an active interval.
    pub active: bool,
    /// The entity the active interval belongs to.
    #[serde(default)]
    pub identifier: String,
}

impl InputRecord {
    /// Creates an active record for `identifier`.
    pub fn active(timestamp: DateTime<Utc>, identifier: impl Into<String>) -> Self {
        Self {
            timestamp,
            active: true,
            identifier: identifier.into(),
        }
    }

    /// Creates an inactive record. The identifier is kept as-is.
    pub fn inactive(timestamp: DateTime<Utc>, identifier: impl Into<String>) -> Self {
        Self {
            timestamp,
            active: false,
            identifier: identifier.into(),
        }
    }
}

impl SegmentableRecord for InputRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
