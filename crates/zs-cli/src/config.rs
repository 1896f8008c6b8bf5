//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use zs_core::{AbandonedGap, DEFAULT_THRESHOLD_MS, IdentifierSwitch, SegmenterConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Gaps strictly longer than this many milliseconds become overhead.
    pub threshold_ms: i64,

    /// Policy when the identifier changes while active.
    pub identifier_switch: IdentifierSwitch,

    /// Policy for short gaps abandoned by another identifier.
    pub abandoned_gap: AbandonedGap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_ms: DEFAULT_THRESHOLD_MS,
            identifier_switch: IdentifierSwitch::default(),
            abandoned_gap: AbandonedGap::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ZS_*)
        figment = figment.merge(Env::prefixed("ZS_"));

        figment.extract()
    }

    /// Builds the segmenter configuration.
    pub fn segmenter_config(&self) -> anyhow::Result<SegmenterConfig> {
        Ok(SegmenterConfig {
            threshold: threshold_from_ms(self.threshold_ms)?,
            identifier_switch: self.identifier_switch,
            abandoned_gap: self.abandoned_gap,
        })
    }
}

/// Converts a millisecond threshold, rejecting values chrono cannot represent.
fn threshold_from_ms(ms: i64) -> anyhow::Result<Duration> {
    Duration::try_milliseconds(ms).with_context(|| format!("threshold out of range: {ms}ms"))
}

/// Returns the platform-specific config directory for zs.
///
/// On Linux: `~/.config/zs`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("zs"))
}
