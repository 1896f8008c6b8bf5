use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zs_cli::commands::{seed, segment};
use zs_cli::{Cli, Commands, Config};

/// Load config from default locations, the optional file and `ZS_*` variables.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support. Logs go to stderr so they
    // never mix with JSON output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match &cli.command {
        Some(Commands::Segment {
            inputs,
            threshold_ms,
            identifier_switch,
            abandoned_gap,
            json,
        }) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(ms) = threshold_ms {
                config.threshold_ms = *ms;
            }
            if let Some(policy) = identifier_switch {
                config.identifier_switch = *policy;
            }
            if let Some(policy) = abandoned_gap {
                config.abandoned_gap = *policy;
            }
            let segmenter = config.segmenter_config()?;
            segment::run(&mut writer, inputs, &segmenter, *json)?;
        }
        Some(Commands::Seed { count, start }) => {
            seed::run(&mut writer, *count, start.as_deref(), Utc::now())?;
        }
        Some(Commands::Config) => {
            let config = load_config(cli.config.as_deref())?;
            let json = serde_json::to_string_pretty(&config)?;
            writeln!(writer, "{json}")?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    match writer.flush() {
        // Reader went away (e.g., piped to `head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result.context("failed to flush output"),
    }
}
