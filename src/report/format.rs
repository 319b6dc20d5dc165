//! Formatted terminal output: run summary, ranked table, warnings.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{MetricField, RunConfig, StateMetrics};
use crate::io::ingest::{CaseIngest, PopulationIngest};
use crate::pipeline::{DataWarning, PipelineOutput};

/// Format the run summary (feed provenance + dataset stats + selections).
pub fn format_run_summary(
    cases: &CaseIngest,
    populations: &PopulationIngest,
    output: &PipelineOutput,
    config: &RunConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== cov - COVID-19 State Metrics ===\n");
    out.push_str(&format!("Cases: {}\n", describe_case_feed(cases, config)));
    out.push_str(&format!(
        "Population: {}\n",
        describe_population_feed(populations, config)
    ));
    if let (Some(min), Some(max)) = (cases.date_min, cases.date_max) {
        out.push_str(&format!(
            "Feed span: {min} -> {max} | codes={}\n",
            cases.n_codes
        ));
    }
    out.push_str(&format!("Window: {}\n", describe_window(config)));
    out.push_str(&format!(
        "States: {} | warnings: {}\n",
        output.metrics.len(),
        output.warnings.len()
    ));
    out.push_str(&format!(
        "Metric: {} | {} {}\n",
        config.metric.display_name(),
        if config.descending { "top" } else { "bottom" },
        config.top_n
    ));
    out.push('\n');

    out
}

fn describe_case_feed(cases: &CaseIngest, config: &RunConfig) -> String {
    let source = if config.demo {
        format!("demo (seed {}, {} days)", config.demo_seed, config.demo_days)
    } else {
        config
            .cases_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "{source} | rows={} used={} skipped={}",
        cases.rows_read,
        cases.rows_used,
        cases.row_errors.len()
    )
}

fn describe_population_feed(populations: &PopulationIngest, config: &RunConfig) -> String {
    let source = if config.demo {
        "demo".to_string()
    } else {
        config
            .population_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "{source} | rows={} used={} skipped={}",
        populations.rows_read,
        populations.rows_used,
        populations.row_errors.len()
    )
}

fn describe_window(config: &RunConfig) -> String {
    match &config.range {
        Some(r) => format!("{} -> {}", r.start, r.end),
        None => "full span".to_string(),
    }
}

/// Format the ranked table. The active metric column is marked with `*`.
pub fn format_rankings(ranked: &[StateMetrics], metric: MetricField, descending: bool) -> String {
    let mut out = String::new();

    let direction = if descending { "Top" } else { "Bottom" };
    out.push_str(&format!(
        "{direction} {} by {}:\n",
        ranked.len(),
        metric.display_name()
    ));

    if ranked.is_empty() {
        out.push_str("(no states in the selected window)\n");
        return out;
    }

    out.push_str(&format!(
        "{:>4} {:<24} {:>12} {:>10} {:>10} {:>10} {:>10}\n",
        "rank",
        "state",
        "population",
        mark("cases", metric == MetricField::AbsCases),
        mark("deaths", metric == MetricField::AbsDeaths),
        mark("cases %", metric == MetricField::RelCases),
        mark("deaths %", metric == MetricField::RelDeaths),
    ));
    out.push_str(&format!(
        "{:-<4} {:-<24} {:-<12} {:-<10} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", "", "", ""
    ));

    for (i, m) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} {:<24} {:>12} {:>10} {:>10} {:>10} {:>10}\n",
            i + 1,
            truncate(&m.state_name, 24),
            fmt_population(m.population),
            fmt_abs(m.abs_cases),
            fmt_abs(m.abs_deaths),
            fmt_rel(m.rel_cases),
            fmt_rel(m.rel_deaths),
        ));
    }

    out
}

/// Format the warning list, empty string when the run was clean.
pub fn format_warnings(warnings: &[DataWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("\nData warnings ({}):\n", warnings.len()));
    for w in warnings {
        out.push_str(&format!("- {w}\n"));
    }
    out
}

fn mark(label: &str, active: bool) -> String {
    if active {
        format!("{label}*")
    } else {
        label.to_string()
    }
}

pub fn fmt_abs(v: f64) -> String {
    format!("{v:.0}")
}

/// Unresolved relative metrics render as `-`, never as NaN.
pub fn fmt_rel(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    }
}

/// `0` means the population never resolved; show a dash instead of a number.
pub fn fmt_population(population: u64) -> String {
    if population == 0 {
        "-".to_string()
    } else {
        group_digits(population)
    }
}

fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
