//! The state-metrics aggregation pipeline.
//!
//! One `compute` pass is the single source of truth for both views: the
//! ranked bar chart consumes it through [`top_n`], the keyed map view reads
//! the returned [`MetricsMap`] directly by state name. The stages are:
//!
//! 1. filter case records by the selected date window (`filter`)
//! 2. group the survivors into per-code buckets (`group`)
//! 3. resolve each code to a census name and population (`names` + `join`)
//! 4. reduce each bucket into absolute/relative metrics (`metrics`)
//!
//! Per-state data problems never abort the pass; they are collected as
//! [`DataWarning`]s next to the metrics, and one state's bad data never
//! affects another's aggregation.

pub mod filter;
pub mod group;
pub mod join;
pub mod metrics;
pub mod rank;

pub use filter::filter_by_range;
pub use group::group_by_code;
pub use join::{PopulationMatch, resolve_population};
pub use rank::top_n;

use crate::domain::{CaseRecord, DateRange, MetricsMap, PopulationRecord};
use crate::names::StateNameTable;

/// A non-fatal data problem observed during one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    /// A case-feed code with no entry in the name table; its records were
    /// dropped from aggregation.
    UnresolvedCode { code: String, records: usize },
    /// No census row matched the resolved name; relative metrics are absent.
    MissingPopulation { state: String },
    /// Several census rows matched one name; the first was used.
    AmbiguousPopulation { state: String, matches: usize },
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::UnresolvedCode { code, records } => {
                write!(f, "state code `{code}` has no full-name mapping; {records} record(s) dropped")
            }
            DataWarning::MissingPopulation { state } => {
                write!(f, "no population record for `{state}`; relative metrics unavailable")
            }
            DataWarning::AmbiguousPopulation { state, matches } => {
                write!(f, "{matches} population records match `{state}`; using the first")
            }
        }
    }
}

/// Everything one pipeline pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub metrics: MetricsMap,
    pub warnings: Vec<DataWarning>,
}

/// Run the full aggregation pass.
///
/// The result map holds exactly the states with at least one resolvable
/// record in the window; states with no records in range are absent rather
/// than present with zero metrics. The pass is a pure function of its
/// arguments: no shared state is read or written, and calling it again with
/// the same inputs yields an equal result.
pub fn compute(
    cases: &[CaseRecord],
    populations: &[PopulationRecord],
    names: &StateNameTable,
    range: Option<&DateRange>,
) -> PipelineOutput {
    let filtered = filter_by_range(cases, range);
    let buckets = group_by_code(&filtered);

    let mut map = MetricsMap::new();
    let mut warnings = Vec::new();

    for (code, bucket) in &buckets {
        let Some(state_name) = names.full_name(code) else {
            warnings.push(DataWarning::UnresolvedCode {
                code: code.clone(),
                records: bucket.len(),
            });
            continue;
        };

        let matched = resolve_population(state_name, populations);
        if matched.matches == 0 {
            warnings.push(DataWarning::MissingPopulation {
                state: state_name.to_string(),
            });
        } else if matched.matches > 1 {
            warnings.push(DataWarning::AmbiguousPopulation {
                state: state_name.to_string(),
                matches: matched.matches,
            });
        }

        map.insert(metrics::compute(state_name, matched.population, bucket));
    }

    PipelineOutput {
        metrics: map,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricField;
    use chrono::NaiveDate;

    fn case(code: &str, day: u32, new_cases: f64, new_deaths: f64) -> CaseRecord {
        CaseRecord {
            state_code: code.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            new_cases,
            new_deaths,
        }
    }

    fn population(name: &str, population: u64) -> PopulationRecord {
        PopulationRecord {
            state_name: name.to_string(),
            population,
        }
    }

    #[test]
    fn aggregates_one_state_end_to_end() {
        let cases = vec![case("CA", 1, 100.0, 2.0), case("CA", 2, 50.0, 1.0)];
        let populations = vec![population("California", 1000)];
        let names = StateNameTable::us_census();

        let out = compute(&cases, &populations, &names, None);
        assert_eq!(out.metrics.len(), 1);
        assert!(out.warnings.is_empty());

        let m = out.metrics.get("California").unwrap();
        assert!((m.abs_cases - 150.0).abs() < 1e-9);
        assert!((m.abs_deaths - 3.0).abs() < 1e-9);
        assert!((m.rel_cases.unwrap() - 15.0).abs() < 1e-9);
        assert!((m.rel_deaths.unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn window_restricts_the_sums() {
        let cases = vec![case("CA", 1, 100.0, 2.0), case("CA", 2, 50.0, 1.0)];
        let populations = vec![population("California", 1000)];
        let names = StateNameTable::us_census();

        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
        };
        let out = compute(&cases, &populations, &names, Some(&range));
        let m = out.metrics.get("California").unwrap();
        assert!((m.abs_cases - 50.0).abs() < 1e-9);
    }

    #[test]
    fn no_range_equals_full_span_range() {
        let cases = vec![
            case("CA", 1, 10.0, 1.0),
            case("TX", 5, 20.0, 2.0),
            case("CA", 31, 30.0, 3.0),
        ];
        let populations = vec![population("California", 100), population("Texas", 200)];
        let names = StateNameTable::us_census();

        let unfiltered = compute(&cases, &populations, &names, None);
        let full_span = DateRange {
            start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
        };
        let spanned = compute(&cases, &populations, &names, Some(&full_span));
        assert_eq!(unfiltered.metrics, spanned.metrics);
    }

    #[test]
    fn unknown_codes_are_dropped_with_a_warning() {
        let cases = vec![case("NYC", 1, 500.0, 10.0), case("CA", 1, 10.0, 0.0)];
        let populations = vec![population("California", 1000)];
        let names = StateNameTable::us_census();

        let out = compute(&cases, &populations, &names, None);
        assert_eq!(out.metrics.len(), 1);
        assert!(out.metrics.get("California").is_some());
        assert_eq!(
            out.warnings,
            vec![DataWarning::UnresolvedCode {
                code: "NYC".to_string(),
                records: 1
            }]
        );
    }

    #[test]
    fn missing_population_keeps_absolute_metrics() {
        let cases = vec![case("GU", 1, 40.0, 1.0)];
        let populations = vec![population("California", 1000)];
        let names = StateNameTable::us_census();

        let out = compute(&cases, &populations, &names, None);
        let m = out.metrics.get("Guam").unwrap();
        assert!((m.abs_cases - 40.0).abs() < 1e-9);
        assert_eq!(m.rel_cases, None);
        assert_eq!(
            out.warnings,
            vec![DataWarning::MissingPopulation {
                state: "Guam".to_string()
            }]
        );
    }

    #[test]
    fn duplicate_populations_warn_and_use_the_first() {
        let cases = vec![case("OH", 1, 100.0, 1.0)];
        let populations = vec![population("Ohio", 1000), population("Ohio", 5)];
        let names = StateNameTable::us_census();

        let out = compute(&cases, &populations, &names, None);
        let m = out.metrics.get("Ohio").unwrap();
        assert_eq!(m.population, 1000);
        assert!((m.rel_cases.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(
            out.warnings,
            vec![DataWarning::AmbiguousPopulation {
                state: "Ohio".to_string(),
                matches: 2
            }]
        );
    }

    #[test]
    fn empty_inputs_produce_an_empty_map() {
        let names = StateNameTable::us_census();
        let out = compute(&[], &[], &names, None);
        assert!(out.metrics.is_empty());
        assert!(out.warnings.is_empty());
        assert!(top_n(&out.metrics, MetricField::AbsCases, 10, true).is_empty());
    }

    #[test]
    fn states_without_records_in_range_are_absent() {
        let cases = vec![case("CA", 1, 10.0, 0.0), case("TX", 20, 20.0, 0.0)];
        let populations = vec![population("California", 100), population("Texas", 200)];
        let names = StateNameTable::us_census();

        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
        };
        let out = compute(&cases, &populations, &names, Some(&range));
        assert_eq!(out.metrics.len(), 1);
        assert!(out.metrics.get("Texas").is_some());
        assert!(out.metrics.get("California").is_none());
    }

    #[test]
    fn compute_is_idempotent() {
        let cases = vec![
            case("CA", 1, 10.0, 1.0),
            case("NYC", 2, 99.0, 9.0),
            case("GU", 3, 5.0, 0.0),
        ];
        let populations = vec![population("California", 100)];
        let names = StateNameTable::us_census();

        let first = compute(&cases, &populations, &names, None);
        let second = compute(&cases, &populations, &names, None);
        assert_eq!(first, second);
    }

    #[test]
    fn map_order_follows_first_occurrence_of_codes() {
        let cases = vec![
            case("TX", 1, 1.0, 0.0),
            case("AL", 1, 1.0, 0.0),
            case("TX", 2, 1.0, 0.0),
            case("CA", 1, 1.0, 0.0),
        ];
        let populations = vec![
            population("Alabama", 100),
            population("California", 100),
            population("Texas", 100),
        ];
        let names = StateNameTable::us_census();

        let out = compute(&cases, &populations, &names, None);
        let order: Vec<&str> = out.metrics.iter().map(|m| m.state_name.as_str()).collect();
        assert_eq!(order, vec!["Texas", "Alabama", "California"]);
    }
}
