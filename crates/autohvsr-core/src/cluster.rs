//! Resonance clustering of valid peaks on the log-frequency axis.
//!
//! Two stages:
//!
//! 1. Density clustering (DBSCAN) of `log10 f` groups peaks that agree on a
//!    frequency band and discards isolated peaks as noise.
//! 2. A single-pass split heuristic separates clusters whose members form two
//!    sub-bands that DBSCAN chained together. Decisions are collected into a
//!    [`SplitPlan`] before any id changes, so no cluster is examined twice.

use serde::{Deserialize, Serialize};

use crate::stats::{mean, variance};

/// Clustering hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// DBSCAN neighborhood radius on `log10 f` (default 0.2).
    pub eps: f64,
    /// Neighbors, counting the point itself, that make a core point (default 10).
    pub min_samples: usize,
    /// Variance reduction a split must exceed (default 0.02).
    pub gamma: f64,
    /// Clusters smaller than this are never split (default 6).
    pub min_split_members: usize,
    /// Both halves of a split need at least this many members (default 3).
    pub min_group_members: usize,
    /// Clusters spanning less than this on `log10 f` are never split (default 1e-3).
    pub min_split_range: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps: 0.2,
            min_samples: 10,
            gamma: 0.02,
            min_split_members: 6,
            min_group_members: 3,
            min_split_range: 1e-3,
        }
    }
}

/// DBSCAN on one-dimensional values.
///
/// Returns one label per value (`None` for noise) and the number of clusters.
/// Cluster ids follow the order in which their first core point appears in
/// `values`. Border points join the first cluster that reaches them.
pub fn dbscan_1d(values: &[f64], eps: f64, min_samples: usize) -> (Vec<Option<usize>>, usize) {
    let n = values.len();
    let neighbors: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| (values[i] - values[j]).abs() <= eps)
                .collect()
        })
        .collect();
    let is_core: Vec<bool> = neighbors.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut labels = vec![None; n];
    let mut n_clusters = 0;
    let mut stack = Vec::new();

    for seed in 0..n {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }
        let id = n_clusters;
        n_clusters += 1;
        labels[seed] = Some(id);
        stack.push(seed);

        while let Some(point) = stack.pop() {
            for &nb in &neighbors[point] {
                if labels[nb].is_none() {
                    labels[nb] = Some(id);
                    if is_core[nb] {
                        stack.push(nb);
                    }
                }
            }
        }
    }

    (labels, n_clusters)
}

/// Accepted splits, indexed by pre-split cluster id.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    /// `Some(threshold)` when the cluster is split at `threshold`.
    thresholds: Vec<Option<f64>>,
}

impl SplitPlan {
    /// Decide, for every cluster in ascending id order, whether it splits.
    pub fn new(
        values: &[f64],
        labels: &[Option<usize>],
        n_clusters: usize,
        config: &ClusterConfig,
    ) -> Self {
        let thresholds = (0..n_clusters)
            .map(|id| {
                let members: Vec<f64> = values
                    .iter()
                    .zip(labels)
                    .filter(|(_, l)| **l == Some(id))
                    .map(|(&v, _)| v)
                    .collect();
                split_threshold(&members, config)
            })
            .collect();
        Self { thresholds }
    }

    /// Number of accepted splits.
    pub fn n_splits(&self) -> usize {
        self.thresholds.iter().filter(|t| t.is_some()).count()
    }

    /// Number of clusters after materialization.
    pub fn n_clusters(&self) -> usize {
        self.thresholds.len() + self.n_splits()
    }

    /// Split threshold of cluster `id`, if it splits.
    pub fn threshold(&self, id: usize) -> Option<f64> {
        self.thresholds.get(id).copied().flatten()
    }

    /// Final id of a member of cluster `id` with value `value`.
    ///
    /// Every accepted split below `id` shifts it up by one; the upper group of
    /// a split cluster takes the next id.
    pub fn final_id(&self, id: usize, value: f64) -> usize {
        let shift = self.thresholds[..id].iter().filter(|t| t.is_some()).count();
        match self.thresholds[id] {
            Some(threshold) if value > threshold => id + shift + 1,
            _ => id + shift,
        }
    }

    /// Relabel every member according to the plan.
    pub fn apply(&self, values: &[f64], labels: &[Option<usize>]) -> Vec<Option<usize>> {
        values
            .iter()
            .zip(labels)
            .map(|(&v, l)| l.map(|id| self.final_id(id, v)))
            .collect()
    }
}

/// Split point of one cluster, or `None` when the cluster stays whole.
fn split_threshold(members: &[f64], config: &ClusterConfig) -> Option<f64> {
    if members.len() < config.min_split_members {
        return None;
    }
    let (lo, hi) = members
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi - lo < config.min_split_range {
        return None;
    }

    let threshold = mean(members);
    let (upper, lower): (Vec<f64>, Vec<f64>) =
        members.iter().copied().partition(|&v| v > threshold);
    if lower.len() < config.min_group_members || upper.len() < config.min_group_members {
        return None;
    }

    let reduction = variance(members) - (variance(&lower) + variance(&upper));
    (reduction > config.gamma).then_some(threshold)
}

/// Cluster log-frequencies into resonance ids (`None` for noise).
///
/// Ids are contiguous from 0 but not yet ordered by frequency.
pub fn cluster_resonances(log_frequencies: &[f64], config: &ClusterConfig) -> Vec<Option<usize>> {
    if log_frequencies.is_empty() {
        return Vec::new();
    }
    let (labels, n_clusters) = dbscan_1d(log_frequencies, config.eps, config.min_samples);
    let plan = SplitPlan::new(log_frequencies, &labels, n_clusters, config);
    let noise = labels.iter().filter(|l| l.is_none()).count();
    tracing::debug!(
        peaks = log_frequencies.len(),
        clusters = n_clusters,
        splits = plan.n_splits(),
        noise,
        "clustered valid peaks"
    );
    plan.apply(log_frequencies, &labels)
}
