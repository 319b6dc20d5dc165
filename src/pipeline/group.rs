//! Grouping of case records into per-state buckets.

use std::collections::HashMap;

use crate::domain::CaseRecord;

/// Partition `records` into per-code buckets.
///
/// Every record lands in exactly one bucket. Buckets are ordered by the first
/// occurrence of each code in the input, not alphabetically; that order is
/// deterministic and flows through the pipeline into the metrics map.
pub fn group_by_code<'a>(records: &[&'a CaseRecord]) -> Vec<(String, Vec<&'a CaseRecord>)> {
    let mut buckets: Vec<(String, Vec<&CaseRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &record in records {
        match index.get(record.state_code.as_str()) {
            Some(&i) => buckets[i].1.push(record),
            None => {
                index.insert(record.state_code.as_str(), buckets.len());
                buckets.push((record.state_code.clone(), vec![record]));
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(code: &str, day: u32) -> CaseRecord {
        CaseRecord {
            state_code: code.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            new_cases: 1.0,
            new_deaths: 0.0,
        }
    }

    #[test]
    fn buckets_follow_first_occurrence_order() {
        let records = vec![
            record("TX", 1),
            record("CA", 2),
            record("TX", 3),
            record("AL", 4),
            record("CA", 5),
        ];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let buckets = group_by_code(&refs);

        let codes: Vec<&str> = buckets.iter().map(|(code, _)| code.as_str()).collect();
        assert_eq!(codes, vec!["TX", "CA", "AL"]);
        assert_eq!(buckets[0].1.len(), 2);
        assert_eq!(buckets[1].1.len(), 2);
        assert_eq!(buckets[2].1.len(), 1);
    }

    #[test]
    fn each_record_lands_in_exactly_one_bucket() {
        let records = vec![record("CA", 1), record("CA", 2), record("TX", 3)];
        let refs: Vec<&CaseRecord> = records.iter().collect();
        let buckets = group_by_code(&refs);

        let total: usize = buckets.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(group_by_code(&[]).is_empty());
    }
}
