//! Synthetic case and population feeds for demo mode.
//!
//! The generator is deterministic per seed and deliberately reproduces the
//! quirks of the live feeds: a city code with no census population row,
//! one territory whose population row is missing, and occasional negative
//! correction rows.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CaseRecord, PopulationRecord};
use crate::error::AppError;
use crate::names::StateNameTable;

/// 2019 census population estimates, keyed by feed code.
const SAMPLE_POPULATIONS: [(&str, u64); 56] = [
    ("AL", 4_903_185),
    ("AK", 731_545),
    ("AZ", 7_278_717),
    ("AR", 3_017_804),
    ("CA", 39_512_223),
    ("CO", 5_758_736),
    ("CT", 3_565_287),
    ("DE", 973_764),
    ("DC", 705_749),
    ("FL", 21_477_737),
    ("GA", 10_617_423),
    ("HI", 1_415_872),
    ("ID", 1_787_065),
    ("IL", 12_671_821),
    ("IN", 6_732_219),
    ("IA", 3_155_070),
    ("KS", 2_913_314),
    ("KY", 4_467_673),
    ("LA", 4_648_794),
    ("ME", 1_344_212),
    ("MD", 6_045_680),
    ("MA", 6_892_503),
    ("MI", 9_986_857),
    ("MN", 5_639_632),
    ("MS", 2_976_149),
    ("MO", 6_137_428),
    ("MT", 1_068_778),
    ("NE", 1_934_408),
    ("NV", 3_080_156),
    ("NH", 1_359_711),
    ("NJ", 8_882_190),
    ("NM", 2_096_829),
    ("NY", 19_453_561),
    ("NC", 10_488_084),
    ("ND", 762_062),
    ("OH", 11_689_100),
    ("OK", 3_956_971),
    ("OR", 4_217_737),
    ("PA", 12_801_989),
    ("RI", 1_059_361),
    ("SC", 5_148_714),
    ("SD", 884_659),
    ("TN", 6_829_174),
    ("TX", 28_995_881),
    ("UT", 3_205_958),
    ("VT", 623_989),
    ("VA", 8_535_519),
    ("WA", 7_614_893),
    ("WV", 1_792_147),
    ("WI", 5_822_434),
    ("WY", 578_759),
    ("AS", 55_641),
    ("GU", 165_718),
    ("MP", 55_194),
    ("PR", 3_193_694),
    ("VI", 104_914),
];

/// The CDC feed reports New York City under its own code; the census feed has
/// no such row, so `NYC` exercises the unresolvable-code path.
const NYC_SCALE: u64 = 8_336_817;

/// This territory reports cases but its population row is withheld, so the
/// demo exercises the missing-population path.
const WITHHELD_POPULATION_CODE: &str = "GU";

/// First reporting day of the synthesized window.
const EPOCH: (i32, u32, u32) = (2020, 3, 1);

/// Baseline daily cases per capita before ramp and noise.
const CASE_RATE: f64 = 2.0e-5;

/// Expected deaths as a fraction of same-day cases.
const DEATH_RATE: f64 = 0.02;

/// The ramp climbs to `1 + RAMP_GAIN` over `RAMP_DAYS`, then holds flat.
const RAMP_GAIN: f64 = 2.0;
const RAMP_DAYS: f64 = 90.0;

/// Log-noise std dev applied per record.
const NOISE_SIGMA: f64 = 0.35;

/// Per-record probability of a negative correction row.
const CORRECTION_PROB: f64 = 0.01;

/// Synthesize both feeds for `days` reporting days starting at the epoch.
///
/// Records come out grouped per state in table order, each state's days in
/// ascending date order, with `NYC` rows appended last.
pub fn generate_sample(
    seed: u64,
    days: usize,
    names: &StateNameTable,
) -> Result<(Vec<CaseRecord>, Vec<PopulationRecord>), AppError> {
    if days == 0 {
        return Err(AppError::new(2, "Demo day count must be > 0."));
    }
    let epoch = NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2)
        .ok_or_else(|| AppError::new(4, "Invalid demo epoch date."))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut cases = Vec::with_capacity((SAMPLE_POPULATIONS.len() + 1) * days);
    let mut populations = Vec::with_capacity(SAMPLE_POPULATIONS.len() - 1);

    for (code, population) in SAMPLE_POPULATIONS {
        synthesize_state(&mut cases, &mut rng, &noise, code, population, epoch, days);

        if code == WITHHELD_POPULATION_CODE {
            continue;
        }
        let state_name = names.full_name(code).ok_or_else(|| {
            AppError::new(4, format!("Demo table has no census name for `{code}`."))
        })?;
        populations.push(PopulationRecord {
            state_name: state_name.to_string(),
            population,
        });
    }

    synthesize_state(&mut cases, &mut rng, &noise, "NYC", NYC_SCALE, epoch, days);

    Ok((cases, populations))
}

fn synthesize_state(
    out: &mut Vec<CaseRecord>,
    rng: &mut StdRng,
    noise: &Normal<f64>,
    code: &str,
    population: u64,
    epoch: NaiveDate,
    days: usize,
) {
    let baseline = population as f64 * CASE_RATE;

    for day in 0..days {
        let date = epoch
            .checked_add_signed(Duration::days(day as i64))
            .unwrap_or(epoch);
        let ramp = 1.0 + RAMP_GAIN * (day as f64 / RAMP_DAYS).min(1.0);

        let mut new_cases = (baseline * ramp * noise.sample(rng).exp()).round();
        let mut new_deaths = (new_cases * DEATH_RATE * noise.sample(rng).exp()).round();

        // The live feed occasionally revises earlier reports by publishing a
        // negative row. Sums downstream must absorb these unclamped.
        if rng.gen_bool(CORRECTION_PROB) {
            new_cases = -(new_cases * rng.gen_range(0.05..0.5)).round();
            new_deaths = 0.0;
        }

        out.push(CaseRecord {
            state_code: code.to_string(),
            date,
            new_cases,
            new_deaths,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_days_is_rejected() {
        let names = StateNameTable::us_census();
        assert!(generate_sample(1, 0, &names).is_err());
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let names = StateNameTable::us_census();
        let (cases_a, pops_a) = generate_sample(42, 30, &names).unwrap();
        let (cases_b, pops_b) = generate_sample(42, 30, &names).unwrap();
        assert_eq!(cases_a, cases_b);
        assert_eq!(pops_a, pops_b);

        let (cases_c, _) = generate_sample(43, 30, &names).unwrap();
        assert_ne!(cases_a, cases_c);
    }

    #[test]
    fn demo_covers_every_warning_class() {
        let names = StateNameTable::us_census();
        let (cases, pops) = generate_sample(7, 20, &names).unwrap();

        // NYC reports cases but resolves to no census name.
        assert!(cases.iter().any(|c| c.state_code == "NYC"));
        assert!(names.full_name("NYC").is_none());

        // Guam reports cases but its population row is withheld.
        assert!(cases.iter().any(|c| c.state_code == "GU"));
        assert!(!pops.iter().any(|p| p.state_name == "Guam"));
        assert_eq!(pops.len(), SAMPLE_POPULATIONS.len() - 1);
    }

    #[test]
    fn dates_span_the_requested_window() {
        let names = StateNameTable::us_census();
        let days = 15;
        let (cases, _) = generate_sample(1, days, &names).unwrap();

        let epoch = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let last = epoch + Duration::days(days as i64 - 1);
        assert!(cases.iter().all(|c| c.date >= epoch && c.date <= last));
        assert!(cases.iter().any(|c| c.date == epoch));
        assert!(cases.iter().any(|c| c.date == last));
        assert_eq!(cases.len(), (SAMPLE_POPULATIONS.len() + 1) * days);
    }

    #[test]
    fn corrections_show_up_as_negative_rows() {
        let names = StateNameTable::us_census();
        // 57 codes over a year at 1% odds per record makes at least one
        // negative row a statistical certainty.
        let (cases, _) = generate_sample(11, 365, &names).unwrap();
        assert!(cases.iter().any(|c| c.new_cases < 0.0));
    }
}
