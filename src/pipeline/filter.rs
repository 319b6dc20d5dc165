//! Date-window filtering of case records.

use crate::domain::{CaseRecord, DateRange};

/// Select the records whose date falls inside `range`, inclusive both ends.
///
/// `None` means "no filter": every record is passed through in input order.
/// Records are borrowed, never cloned or mutated; an empty result is a valid
/// outcome (an empty window simply yields no states downstream).
pub fn filter_by_range<'a>(
    records: &'a [CaseRecord],
    range: Option<&DateRange>,
) -> Vec<&'a CaseRecord> {
    match range {
        None => records.iter().collect(),
        Some(range) => records.iter().filter(|r| range.contains(r.date)).collect(),
    }
}
