//! Population lookup for resolved state names.

use crate::domain::PopulationRecord;

/// Outcome of a population lookup.
///
/// `matches` counts every census row with the exact name, so the caller can
/// flag duplicates; `population` is `None` only when there were no matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationMatch {
    pub population: Option<u64>,
    pub matches: usize,
}

/// Resolve the population for a full state name.
///
/// Names must match exactly; no trimming or fuzzy matching happens here (the
/// name already went through the code table). When the census data holds
/// several rows for one name, the first wins and the rest are never summed;
/// the caller reports the ambiguity instead.
pub fn resolve_population(state_name: &str, records: &[PopulationRecord]) -> PopulationMatch {
    let mut population = None;
    let mut matches = 0usize;

    for record in records {
        if record.state_name == state_name {
            matches += 1;
            if population.is_none() {
                population = Some(record.population);
            }
        }
    }

    PopulationMatch {
        population,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, population: u64) -> PopulationRecord {
        PopulationRecord {
            state_name: name.to_string(),
            population,
        }
    }

    #[test]
    fn unique_match_resolves() {
        let records = vec![record("California", 39_512_223), record("Texas", 28_995_881)];
        let m = resolve_population("Texas", &records);
        assert_eq!(m.population, Some(28_995_881));
        assert_eq!(m.matches, 1);
    }

    #[test]
    fn zero_matches_yield_none() {
        let records = vec![record("California", 39_512_223)];
        let m = resolve_population("Guam", &records);
        assert_eq!(m.population, None);
        assert_eq!(m.matches, 0);
    }

    #[test]
    fn duplicates_take_the_first_match_not_the_sum() {
        let records = vec![
            record("Ohio", 11_689_100),
            record("Ohio", 999),
            record("Ohio", 1),
        ];
        let m = resolve_population("Ohio", &records);
        assert_eq!(m.population, Some(11_689_100));
        assert_eq!(m.matches, 3);
    }

    #[test]
    fn matching_is_exact() {
        let records = vec![record("Texas ", 1), record("texas", 2)];
        let m = resolve_population("Texas", &records);
        assert_eq!(m.population, None);
        assert_eq!(m.matches, 0);
    }
}
