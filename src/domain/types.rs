//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to JSON/CSV
//! - rendered by the terminal report and the TUI

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One reporting day for one state, as published in the CDC daily feed.
///
/// `new_cases` / `new_deaths` may be negative (the feed issues corrections as
/// negative rows) and must never be clamped; sums are expected to absorb them.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    /// Short state/territory code as it appears in the feed (e.g. `CA`, `NYC`).
    pub state_code: String,
    pub date: NaiveDate,
    pub new_cases: f64,
    pub new_deaths: f64,
}

/// One census population figure, keyed by the full state name.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub state_name: String,
    pub population: u64,
}

/// Aggregated metrics for one state over the selected window.
///
/// `rel_cases` / `rel_deaths` are the absolute sums expressed as a percentage
/// of the state population. They are `None` (never NaN or infinity) when the
/// population is unresolved or zero; `population` itself stays `0` in that
/// case so absolute metrics can still be reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMetrics {
    pub state_name: String,
    pub population: u64,
    pub abs_cases: f64,
    pub abs_deaths: f64,
    pub rel_cases: Option<f64>,
    pub rel_deaths: Option<f64>,
}

impl StateMetrics {
    /// The value of the chosen metric field, `None` for unresolved relatives.
    pub fn value(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::AbsCases => Some(self.abs_cases),
            MetricField::AbsDeaths => Some(self.abs_deaths),
            MetricField::RelCases => self.rel_cases,
            MetricField::RelDeaths => self.rel_deaths,
        }
    }
}

/// Which metric a ranking or view is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    AbsCases,
    AbsDeaths,
    RelCases,
    RelDeaths,
}

impl MetricField {
    /// Human-readable label for titles and summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            MetricField::AbsCases => "absolute cases",
            MetricField::AbsDeaths => "absolute deaths",
            MetricField::RelCases => "relative cases (% of population)",
            MetricField::RelDeaths => "relative deaths (% of population)",
        }
    }

    /// Short label for table columns and bar-chart captions.
    pub fn short_label(self) -> &'static str {
        match self {
            MetricField::AbsCases => "cases",
            MetricField::AbsDeaths => "deaths",
            MetricField::RelCases => "cases %",
            MetricField::RelDeaths => "deaths %",
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(self, MetricField::RelCases | MetricField::RelDeaths)
    }
}

impl fmt::Display for MetricField {
    /// Writes the CLI value token, so clap can round-trip defaults.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            MetricField::AbsCases => "abs-cases",
            MetricField::AbsDeaths => "abs-deaths",
            MetricField::RelCases => "rel-cases",
            MetricField::RelDeaths => "rel-deaths",
        };
        f.write_str(token)
    }
}

/// Inclusive date window used to filter case records before grouping.
///
/// "No filter" is expressed as `Option<DateRange>::None` at call sites, not as
/// a sentinel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Insertion-ordered `state name -> StateMetrics` map.
///
/// The pipeline emits one entry per resolvable state code in the filtered
/// data, in first-occurrence order; downstream consumers rely on that order
/// being stable (the ranker for tie-breaking, the exports for readable
/// output). Keyed lookup stays O(1) via the name index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsMap {
    entries: Vec<StateMetrics>,
    index: HashMap<String, usize>,
}

impl MetricsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keyed by `state_name`.
    ///
    /// A duplicate name replaces the existing entry in place, keeping its
    /// original position (two codes aliasing to one name is possible only
    /// with a custom name table).
    pub fn insert(&mut self, metrics: StateMetrics) {
        match self.index.get(&metrics.state_name) {
            Some(&i) => self.entries[i] = metrics,
            None => {
                self.index
                    .insert(metrics.state_name.clone(), self.entries.len());
                self.entries.push(metrics);
            }
        }
    }

    pub fn get(&self, state_name: &str) -> Option<&StateMetrics> {
        self.index.get(state_name).map(|&i| &self.entries[i])
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[StateMetrics] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateMetrics> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetricsMap {
    /// Serializes as a JSON object keyed by state name, in entry order. This
    /// is the shape a map renderer consumes by feature-name lookup.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for metrics in &self.entries {
            map.serialize_entry(&metrics.state_name, metrics)?;
        }
        map.end()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults). All selections are
/// snapshotted here at trigger time; the pipeline never reads ambient
/// mutable state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cases_path: Option<PathBuf>,
    pub population_path: Option<PathBuf>,

    /// Synthesize both feeds instead of reading files.
    pub demo: bool,
    pub demo_seed: u64,
    pub demo_days: usize,

    /// `None` means "no filter, use all records".
    pub range: Option<DateRange>,
    pub metric: MetricField,
    pub top_n: usize,
    /// `true` ranks top-N (descending), `false` bottom-N.
    pub descending: bool,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
