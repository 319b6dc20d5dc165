//! Command-line parsing for the state metrics tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::MetricField;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cov",
    version,
    about = "COVID-19 state metrics: ranked bars and a keyed state table"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate the feeds, print the summary, rankings, and warnings, then run exports.
    Report(RunArgs),
    /// Print the ranked table only (useful for scripting).
    Rank(RunArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying aggregation pipeline as `cov report`, but
    /// renders both views in a terminal UI using Ratatui.
    Tui(RunArgs),
}

/// Common options for every front end.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// CDC daily case CSV (columns: submission_date, state, new_case, new_death).
    #[arg(long, value_name = "CSV")]
    pub cases: Option<PathBuf>,

    /// Census population CSV (columns: state plus a 4-digit year column).
    #[arg(long, value_name = "CSV")]
    pub population: Option<PathBuf>,

    /// Synthesize both feeds instead of reading files.
    #[arg(long)]
    pub demo: bool,

    /// Random seed for demo synthesis.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of reporting days to synthesize in demo mode.
    #[arg(long, default_value_t = 120)]
    pub days: usize,

    /// Window start (inclusive), YYYY-MM-DD or MM/DD/YYYY.
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<String>,

    /// Window end (inclusive), YYYY-MM-DD or MM/DD/YYYY.
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<String>,

    /// Metric to rank by.
    #[arg(short = 'm', long, value_enum, default_value_t = MetricField::AbsCases)]
    pub metric: MetricField,

    /// Show the top/bottom N states.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Rank ascending (bottom-N) instead of descending (top-N).
    #[arg(long)]
    pub ascending: bool,

    /// Export the full metrics map (keyed by state name) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the full metrics map to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}
