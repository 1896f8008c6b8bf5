//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zs_core::{AbandonedGap, IdentifierSwitch};

/// Zone segmenter.
///
/// Splits a timestamped sequence of active/inactive records into matches
/// per identifier and overhead spans.
#[derive(Debug, Parser)]
#[command(name = "zs", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment JSONL record files into matches and overhead.
    Segment {
        /// Input files. Reads stdin when empty or `-`.
        inputs: Vec<PathBuf>,

        /// Gap threshold in milliseconds (overrides config).
        #[arg(long)]
        threshold_ms: Option<i64>,

        /// Policy when the identifier changes while active (`auto_create`, reject).
        #[arg(long)]
        identifier_switch: Option<IdentifierSwitch>,

        /// Policy for short gaps abandoned by another identifier (discard, overhead).
        #[arg(long)]
        abandoned_gap: Option<AbandonedGap>,

        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Print the synthetic demo sequence as JSONL.
    Seed {
        /// Number of records to generate.
        #[arg(long, default_value_t = zs_core::seed::DEFAULT_SEED_COUNT)]
        count: usize,

        /// First timestamp (ISO 8601 or relative, e.g. '2 hours ago'). Defaults to now.
        #[arg(long)]
        start: Option<String>,
    },

    /// Print the effective configuration.
    Config,
}
