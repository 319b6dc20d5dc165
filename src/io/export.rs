//! Export pipeline results to JSON and CSV files.
//!
//! The JSON export is the "portable" representation of one run: the active
//! date range plus the full metrics map keyed by state name, exactly as a
//! map-style consumer would look states up. The CSV export is meant to be
//! easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DateRange, MetricsMap, StateMetrics};
use crate::error::AppError;

#[derive(Serialize)]
struct MetricsFile<'a> {
    tool: &'a str,
    range: Option<RangeBody>,
    states: &'a MetricsMap,
}

#[derive(Serialize)]
struct RangeBody {
    from: NaiveDate,
    to: NaiveDate,
}

/// Write the metrics map as a JSON file keyed by state name.
pub fn write_metrics_json(
    path: &Path,
    metrics: &MetricsMap,
    range: Option<&DateRange>,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create JSON export '{}': {e}", path.display()))
    })?;

    let body = MetricsFile {
        tool: "cov",
        range: range.map(|r| RangeBody {
            from: r.start,
            to: r.end,
        }),
        states: metrics,
    };

    serde_json::to_writer_pretty(file, &body)
        .map_err(|e| AppError::new(2, format!("Failed to write JSON export: {e}")))?;

    Ok(())
}

/// Write one CSV row per state, in map order.
pub fn write_metrics_csv(path: &Path, metrics: &MetricsMap) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create CSV export '{}': {e}", path.display()))
    })?;

    writeln!(file, "state,population,abs_cases,abs_deaths,rel_cases,rel_deaths")
        .map_err(|e| AppError::new(2, format!("Failed to write CSV export header: {e}")))?;

    for m in metrics.entries() {
        writeln!(file, "{}", csv_row(m))
            .map_err(|e| AppError::new(2, format!("Failed to write CSV export row: {e}")))?;
    }

    Ok(())
}

/// Unresolved relative metrics become empty cells, never `NaN` text.
fn csv_row(m: &StateMetrics) -> String {
    format!(
        "{},{},{},{},{},{}",
        csv_field(&m.state_name),
        m.population,
        m.abs_cases,
        m.abs_deaths,
        m.rel_cases.map(|v| format!("{v:.6}")).unwrap_or_default(),
        m.rel_deaths.map(|v| format!("{v:.6}")).unwrap_or_default(),
    )
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
