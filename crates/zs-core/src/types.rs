//! Policy enums and segmenter configuration.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default gap threshold: inactive spans longer than this become overhead.
pub const DEFAULT_THRESHOLD_MS: i64 = 5_000;

/// Errors produced when parsing a policy name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown identifier-switch policy.
    #[error("invalid identifier switch policy: {value} (expected auto_create or reject)")]
    IdentifierSwitch { value: String },

    /// Unknown abandoned-gap policy.
    #[error("invalid abandoned gap policy: {value} (expected discard or overhead)")]
    AbandonedGap { value: String },
}

/// What to do when the identifier changes between two consecutive active
/// records and the new identifier has no match group yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSwitch {
    /// Create the missing group, as if activity had resumed from a gap.
    #[default]
    AutoCreate,
    /// Abort the pass with [`SegmentError::InvalidState`](crate::SegmentError::InvalidState).
    Reject,
}

impl IdentifierSwitch {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoCreate => "auto_create",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for IdentifierSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IdentifierSwitch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto_create" | "auto-create" => Ok(Self::AutoCreate),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseError::IdentifierSwitch {
                value: s.to_string(),
            }),
        }
    }
}

/// What to do with an unresolved gap when activity resumes under a
/// different identifier before the threshold elapses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonedGap {
    /// Drop the gap records from both outputs (they are reported separately).
    #[default]
    Discard,
    /// Commit the gap records as their own overhead group.
    Overhead,
}

impl AbandonedGap {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discard => "discard",
            Self::Overhead => "overhead",
        }
    }
}

impl fmt::Display for AbandonedGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AbandonedGap {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discard" => Ok(Self::Discard),
            "overhead" => Ok(Self::Overhead),
            _ => Err(ParseError::AbandonedGap {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for a segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Gaps strictly longer than this become overhead. Default: 5 seconds.
    pub threshold: Duration,

    /// Policy for an identifier change between two active records.
    pub identifier_switch: IdentifierSwitch,

    /// Policy for a short gap abandoned by a different identifier.
    pub abandoned_gap: AbandonedGap,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::milliseconds(DEFAULT_THRESHOLD_MS),
            identifier_switch: IdentifierSwitch::default(),
            abandoned_gap: AbandonedGap::default(),
        }
    }
}

impl SegmenterConfig {
    /// Creates a config with the given threshold and default policies.
    #[must_use]
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}
