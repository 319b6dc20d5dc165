//! Shared run pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (CSV or demo) -> filter -> group -> resolve/join -> metrics -> rank
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::generate_sample;
use crate::domain::{RunConfig, StateMetrics};
use crate::error::AppError;
use crate::io::ingest::{self, CaseIngest, PopulationIngest};
use crate::names::StateNameTable;
use crate::pipeline::{self, PipelineOutput};

/// Everything loaded once per session: both feeds plus the name table.
///
/// The TUI keeps this resident and re-runs the pipeline against it on every
/// selection change, so loading cost is paid once.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub cases: CaseIngest,
    pub populations: PopulationIngest,
    pub names: StateNameTable,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub output: PipelineOutput,
    pub ranked: Vec<StateMetrics>,
}

/// Load both feeds according to the config (files or demo synthesis).
pub fn load_inputs(config: &RunConfig) -> Result<LoadedInputs, AppError> {
    let names = StateNameTable::us_census();

    if config.demo {
        let (cases, populations) = generate_sample(config.demo_seed, config.demo_days, &names)?;
        return Ok(LoadedInputs {
            cases: CaseIngest::from_records(cases),
            populations: PopulationIngest::from_records(populations),
            names,
        });
    }

    let cases_path = config.cases_path.as_deref().ok_or_else(|| {
        AppError::new(2, "Missing --cases CSV (or pass --demo to synthesize feeds).")
    })?;
    let population_path = config.population_path.as_deref().ok_or_else(|| {
        AppError::new(2, "Missing --population CSV (or pass --demo to synthesize feeds).")
    })?;

    Ok(LoadedInputs {
        cases: ingest::load_case_records(cases_path)?,
        populations: ingest::load_population_records(population_path)?,
        names,
    })
}

/// One complete aggregation pass over already-loaded inputs.
///
/// This never fails: data problems surface as warnings in the output, and an
/// empty window yields an empty map, not an error.
pub fn run_with_inputs(inputs: &LoadedInputs, config: &RunConfig) -> RunOutput {
    let output = pipeline::compute(
        &inputs.cases.records,
        &inputs.populations.records,
        &inputs.names,
        config.range.as_ref(),
    );
    let ranked = pipeline::top_n(&output.metrics, config.metric, config.top_n, config.descending);

    RunOutput { output, ranked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateRange, MetricField};
    use chrono::NaiveDate;

    fn demo_config() -> RunConfig {
        RunConfig {
            cases_path: None,
            population_path: None,
            demo: true,
            demo_seed: 42,
            demo_days: 30,
            range: None,
            metric: MetricField::AbsCases,
            top_n: 10,
            descending: true,
            export_json: None,
            export_csv: None,
        }
    }

    #[test]
    fn demo_inputs_load_and_rank() {
        let config = demo_config();
        let inputs = load_inputs(&config).unwrap();
        assert_eq!(inputs.cases.n_codes, 57, "56 table codes plus NYC");

        let run = run_with_inputs(&inputs, &config);
        assert_eq!(run.output.metrics.len(), 56, "NYC drops out of the map");
        assert_eq!(run.ranked.len(), 10);
        assert!(
            !run.output.warnings.is_empty(),
            "demo data is built to produce warnings"
        );
    }

    #[test]
    fn file_mode_requires_both_paths() {
        let mut config = demo_config();
        config.demo = false;
        let err = load_inputs(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn narrowing_the_window_restricts_the_run() {
        let config = demo_config();
        let inputs = load_inputs(&config).unwrap();
        let full = run_with_inputs(&inputs, &config);

        let mut narrow = config.clone();
        narrow.range = Some(DateRange {
            start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 3, 7).unwrap(),
        });
        let windowed = run_with_inputs(&inputs, &narrow);

        let ca_full = full.output.metrics.get("California").unwrap();
        let ca_week = windowed.output.metrics.get("California").unwrap();
        assert!(ca_week.abs_cases < ca_full.abs_cases);

        // Out-of-feed window yields an empty result, never an error.
        let mut empty = config.clone();
        empty.range = Some(DateRange {
            start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2019, 1, 31).unwrap(),
        });
        let none = run_with_inputs(&inputs, &empty);
        assert!(none.output.metrics.is_empty());
        assert!(none.ranked.is_empty());
    }
}
