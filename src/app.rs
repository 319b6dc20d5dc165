//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the case and population feeds (or synthesizes them)
//! - runs the aggregation pipeline
//! - prints the report
//! - writes optional exports

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{Command, RunArgs};
use crate::domain::{DateRange, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cov` binary.
pub fn run() -> Result<(), AppError> {
    // We want `cov` and `cov -m rel-cases` to behave like `cov tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_run(args, OutputMode::Full),
        Command::Rank(args) => handle_run(args, OutputMode::RankOnly),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let inputs = pipeline::load_inputs(&config)?;
    let run = pipeline::run_with_inputs(&inputs, &config);

    // Print terminal output.
    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(
                    &inputs.cases,
                    &inputs.populations,
                    &run.output,
                    &config
                )
            );
        }
        OutputMode::RankOnly => {}
    }

    println!(
        "{}",
        crate::report::format_rankings(&run.ranked, config.metric, config.descending)
    );

    if mode == OutputMode::Full {
        print!("{}", crate::report::format_warnings(&run.output.warnings));
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::export::write_metrics_json(path, &run.output.metrics, config.range.as_ref())?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_metrics_csv(path, &run.output.metrics)?;
    }

    Ok(())
}

fn handle_tui(args: RunArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Build the run config from parsed args, validating the date window.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let range = parse_range_args(args.from.as_deref(), args.to.as_deref())?;

    Ok(RunConfig {
        cases_path: args.cases.clone(),
        population_path: args.population.clone(),
        demo: args.demo,
        demo_seed: args.seed,
        demo_days: args.days,
        range,
        metric: args.metric,
        top_n: args.top,
        descending: !args.ascending,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    })
}

/// Both ends or neither; start must not exceed end.
pub fn parse_range_args(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Option<DateRange>, AppError> {
    let (from, to) = match (from, to) {
        (Some(f), Some(t)) => (f, t),
        (None, None) => return Ok(None),
        _ => return Err(AppError::new(2, "--from and --to must be given together.")),
    };

    let start = parse_input_date(from)?;
    let end = parse_input_date(to)?;
    if start > end {
        return Err(AppError::new(
            2,
            format!("Window start {start} is after end {end}."),
        ));
    }
    Ok(Some(DateRange { start, end }))
}

/// Accepts ISO dates and the case feed's own format.
pub fn parse_input_date(s: &str) -> Result<NaiveDate, AppError> {
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }
    Err(AppError::new(
        2,
        format!("Invalid date '{s}'. Expected YYYY-MM-DD or MM/DD/YYYY."),
    ))
}

/// Rewrite argv so `cov` defaults to `cov tui`.
///
/// Rules:
/// - `cov`                      -> `cov tui`
/// - `cov -m rel-cases ...`     -> `cov tui -m rel-cases ...`
/// - `cov --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "rank" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
