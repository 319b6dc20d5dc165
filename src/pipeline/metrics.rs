//! Per-state metric reduction.

use crate::domain::{CaseRecord, StateMetrics};

/// Reduce one state's bucket into absolute and relative metrics.
///
/// Absolute metrics are plain sums over the bucket; negative correction rows
/// flow straight through. Relative metrics are the sums as a percentage of
/// population, and are `None` whenever the population is unresolved or zero
/// so that no NaN or infinity can reach sorting and rendering.
pub fn compute(state_name: &str, population: Option<u64>, records: &[&CaseRecord]) -> StateMetrics {
    let mut abs_cases = 0.0;
    let mut abs_deaths = 0.0;
    for record in records {
        abs_cases += record.new_cases;
        abs_deaths += record.new_deaths;
    }

    let (rel_cases, rel_deaths) = match population {
        Some(p) if p > 0 => {
            let p = p as f64;
            (Some(abs_cases / p * 100.0), Some(abs_deaths / p * 100.0))
        }
        _ => (None, None),
    };

    StateMetrics {
        state_name: state_name.to_string(),
        population: population.unwrap_or(0),
        abs_cases,
        abs_deaths,
        rel_cases,
        rel_deaths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, new_cases: f64, new_deaths: f64) -> CaseRecord {
        CaseRecord {
            state_code: "CA".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            new_cases,
            new_deaths,
        }
    }

    #[test]
    fn sums_and_percentages() {
        let records = vec![record(1, 100.0, 2.0), record(2, 50.0, 1.0)];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let m = compute("California", Some(1000), &refs);

        assert!((m.abs_cases - 150.0).abs() < 1e-9);
        assert!((m.abs_deaths - 3.0).abs() < 1e-9);
        assert!((m.rel_cases.unwrap() - 15.0).abs() < 1e-9);
        assert!((m.rel_deaths.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(m.population, 1000);
    }

    #[test]
    fn unresolved_population_keeps_absolute_metrics() {
        let records = vec![record(1, 40.0, 4.0)];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let m = compute("Guam", None, &refs);

        assert!((m.abs_cases - 40.0).abs() < 1e-9);
        assert_eq!(m.population, 0);
        assert_eq!(m.rel_cases, None);
        assert_eq!(m.rel_deaths, None);
    }

    #[test]
    fn zero_population_yields_none_not_infinity() {
        let records = vec![record(1, 10.0, 1.0)];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let m = compute("Nowhere", Some(0), &refs);
        assert_eq!(m.rel_cases, None);
        assert_eq!(m.rel_deaths, None);
    }

    #[test]
    fn negative_corrections_are_not_clamped() {
        let records = vec![record(1, 100.0, 5.0), record(2, -130.0, -8.0)];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let m = compute("California", Some(1000), &refs);

        assert!((m.abs_cases - -30.0).abs() < 1e-9);
        assert!((m.abs_deaths - -3.0).abs() < 1e-9);
        assert!((m.rel_cases.unwrap() - -3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bucket_sums_to_zero() {
        let m = compute("California", Some(1000), &[]);
        assert_eq!(m.abs_cases, 0.0);
        assert_eq!(m.abs_deaths, 0.0);
        assert_eq!(m.rel_cases, Some(0.0));
    }
}
