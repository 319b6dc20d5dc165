//! Ranking of metrics for the top/bottom-N bar view.

use std::cmp::Ordering;

use crate::domain::{MetricField, MetricsMap, StateMetrics};

/// Sort all states by `field` and keep the first `min(n, len)` entries.
///
/// Entries whose field value is unresolved (`None`) sort after every resolved
/// entry regardless of direction, so they can never ride into a top or bottom
/// window on the back of the sort order. The sort is stable: equal values and
/// the unresolved tail keep the metrics map's insertion order.
pub fn top_n(
    metrics: &MetricsMap,
    field: MetricField,
    n: usize,
    descending: bool,
) -> Vec<StateMetrics> {
    let mut ranked: Vec<StateMetrics> = metrics.entries().to_vec();
    ranked.sort_by(|a, b| compare_field(a, b, field, descending));
    ranked.truncate(n);
    ranked
}

fn compare_field(a: &StateMetrics, b: &StateMetrics, field: MetricField, descending: bool) -> Ordering {
    match (a.value(field), b.value(field)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
