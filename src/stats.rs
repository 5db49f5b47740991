//! Aggregates computed in memory over a result set.
//!
//! Max, min and mean are pushed down to SQLite; median, quartiles and mode
//! are not expressible there without window functions, so they are computed
//! here from the fetched values.

use std::collections::HashMap;

/// Median of `values`, averaging the two middle elements for even lengths.
/// `None` for an empty slice.
pub fn median(values: &[i64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted_median(&sorted)
}

fn sorted_median(sorted: &[i64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let mid = n / 2;
    if n % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quartiles {
    pub quartile_1: i64,
    pub quartile_3: i64,
}

/// First and third quartile by the median-of-halves method.
///
/// For odd lengths the middle element belongs to neither half. Each quartile
/// is truncated toward zero. `None` when a half would be empty, i.e. for
/// fewer than two values.
pub fn quartiles(values: &[i64]) -> Option<Quartiles> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    let mid = n / 2;
    let lower = &sorted[..mid];
    let upper = if n % 2 == 0 {
        &sorted[mid..]
    } else {
        &sorted[mid + 1..]
    };

    Some(Quartiles {
        quartile_1: sorted_median(lower)?.trunc() as i64,
        quartile_3: sorted_median(upper)?.trunc() as i64,
    })
}

/// Every value sharing the highest occurrence count, ascending.
pub fn modes(values: &[i64]) -> Vec<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }

    let Some(&top) = counts.values().max() else {
        return Vec::new();
    };

    let mut modes: Vec<i64> = counts
        .into_iter()
        .filter(|&(_, count)| count == top)
        .map(|(v, _)| v)
        .collect();
    modes.sort_unstable();
    modes
}
