//! CLI subcommand implementations.

pub mod seed;
pub mod segment;
pub mod util;
