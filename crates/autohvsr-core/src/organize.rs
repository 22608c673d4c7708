//! Relabels resonances so ids ascend with frequency.

use std::collections::BTreeMap;

/// Relabel cluster ids in ascending order of their members' mean `log10 f`.
///
/// Membership never changes and noise stays `None`. Ties keep the original
/// id order.
pub fn order_by_frequency(labels: &[Option<usize>], log_frequencies: &[f64]) -> Vec<Option<usize>> {
    let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
    for (label, &lf) in labels.iter().zip(log_frequencies) {
        if let Some(id) = label {
            let entry = sums.entry(*id).or_insert((0.0, 0));
            entry.0 += lf;
            entry.1 += 1;
        }
    }

    let mut by_mean: Vec<(usize, f64)> = sums
        .into_iter()
        .map(|(id, (sum, count))| (id, sum / count as f64))
        .collect();
    // stable sort: equal means keep id order
    by_mean.sort_by(|a, b| a.1.total_cmp(&b.1));

    let remap: BTreeMap<usize, usize> = by_mean
        .iter()
        .enumerate()
        .map(|(new, &(old, _))| (old, new))
        .collect();

    labels
        .iter()
        .map(|label| label.and_then(|id| remap.get(&id).copied()))
        .collect()
}
