//! Per-peak feature vectors consumed by the peak classifier.
//!
//! The column layout is a contract with every trained classifier artifact and
//! must not change:
//!
//! | index  | feature                                               |
//! |--------|-------------------------------------------------------|
//! | 0..8   | mean window amplitude in each log-spaced energy band  |
//! | 8..12  | frequency-neighbor density, innermost four bands      |
//! | 12..16 | amplitude-neighbor density, innermost four bands      |
//! | 16     | peak prominence                                       |
//! | 17     | mean-curve amplitude at the peak's frequency sample   |
//! | 18     | mean-curve standard deviation at that sample          |
//!
//! Neighbor densities count candidate peaks from *all* windows, so the
//! features of one peak depend on the whole candidate pool but not on the
//! order in which windows are visited.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::curves::HvsrCurveSet;

/// Energy band edges in Hz (8 bands).
pub const ENERGY_BAND_EDGES: [f64; 9] = [0.01, 0.03, 0.1, 0.3, 1.0, 3.0, 10.0, 30.0, 100.0];

/// Frequency-neighbor distance edges on `|Δlog10 f|`.
pub const FREQUENCY_DENSITY_EDGES: [f64; 6] = [0.0, 0.025, 0.05, 0.1, 0.2, 0.4];

/// Amplitude-neighbor distance edges on `|ΔA|`.
pub const AMPLITUDE_DENSITY_EDGES: [f64; 6] = [0.0, 0.5, 1.0, 2.0, 4.0, 10.0];

/// Number of energy bins.
pub const N_ENERGY_BINS: usize = ENERGY_BAND_EDGES.len() - 1;

/// Number of emitted bins per neighbor-density descriptor.
pub const N_DENSITY_BINS: usize = 4;

/// Length of a feature vector.
pub const FEATURE_COUNT: usize = N_ENERGY_BINS + 2 * N_DENSITY_BINS + 3;

/// Column ranges and indices of the frozen layout.
pub mod columns {
    use super::{N_DENSITY_BINS, N_ENERGY_BINS, Range};

    /// Window energy bins.
    pub const ENERGY: Range<usize> = 0..N_ENERGY_BINS;
    /// Frequency-neighbor density bins.
    pub const FREQUENCY_DENSITY: Range<usize> = N_ENERGY_BINS..N_ENERGY_BINS + N_DENSITY_BINS;
    /// Amplitude-neighbor density bins.
    pub const AMPLITUDE_DENSITY: Range<usize> =
        N_ENERGY_BINS + N_DENSITY_BINS..N_ENERGY_BINS + 2 * N_DENSITY_BINS;
    /// Peak prominence.
    pub const PROMINENCE: usize = N_ENERGY_BINS + 2 * N_DENSITY_BINS;
    /// Mean-curve amplitude at the peak.
    pub const MEAN_CURVE_AMPLITUDE: usize = PROMINENCE + 1;
    /// Mean-curve standard deviation at the peak.
    pub const MEAN_CURVE_STD: usize = PROMINENCE + 2;
}

/// One row of the feature matrix.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Column names in layout order, for exports and diagnostics.
pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
    [
        "energy_0.01_0.03",
        "energy_0.03_0.1",
        "energy_0.1_0.3",
        "energy_0.3_1",
        "energy_1_3",
        "energy_3_10",
        "energy_10_30",
        "energy_30_100",
        "fdensity_0_0.025",
        "fdensity_0.025_0.05",
        "fdensity_0.05_0.1",
        "fdensity_0.1_0.2",
        "adensity_0_0.5",
        "adensity_0.5_1",
        "adensity_1_2",
        "adensity_2_4",
        "prominence",
        "mean_curve_amplitude",
        "mean_curve_std",
    ]
}

/// Candidate peak located on one window, before feature construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePeak {
    /// Window the peak was found in.
    pub window_index: usize,
    /// Index into the shared frequency axis.
    pub frequency_index: usize,
    /// Peak frequency in Hz.
    pub frequency: f64,
    /// Window amplitude at the peak.
    pub amplitude: f64,
    /// Peak prominence.
    pub prominence: f64,
}

/// Row-major `[n_peaks, FEATURE_COUNT]` matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    /// Wrap existing rows.
    pub fn from_rows(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    /// Number of rows (peaks).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One row.
    pub fn row(&self, index: usize) -> &FeatureVector {
        &self.rows[index]
    }

    /// All rows in order.
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Consume the matrix, returning its rows.
    pub fn into_rows(self) -> Vec<FeatureVector> {
        self.rows
    }
}

/// Mean amplitude of `curve` inside each energy band (0 for empty bands).
///
/// Band membership is strict: `lo < f < hi`.
pub fn energy_bins(frequency: &[f64], curve: &[f64]) -> [f64; N_ENERGY_BINS] {
    let mut bins = [0.0; N_ENERGY_BINS];
    for (bin, edges) in bins.iter_mut().zip(ENERGY_BAND_EDGES.windows(2)) {
        let (lo, hi) = (edges[0], edges[1]);
        let (sum, count) = frequency
            .iter()
            .zip(curve)
            .filter(|(f, _)| **f > lo && **f < hi)
            .fold((0.0, 0usize), |(s, c), (_, &a)| (s + a, c + 1));
        if count > 0 {
            *bin = sum / count as f64;
        }
    }
    bins
}

/// Fraction of the pool lying in each of the innermost distance bands around `value`.
///
/// `sorted_pool` holds every candidate's value (including `value` itself) in
/// ascending order. Band `k` counts members whose distance `d` satisfies
/// `edges[k] < d < edges[k + 1]`, so coincident members (the peak itself
/// included) never count. Counts are divided by the pool size.
pub fn neighbor_density(
    value: f64,
    sorted_pool: &[f64],
    edges: &[f64; 6],
) -> [f64; N_DENSITY_BINS] {
    let mut bins = [0.0; N_DENSITY_BINS];
    let total = sorted_pool.len();
    if total == 0 {
        return bins;
    }

    for (k, bin) in bins.iter_mut().enumerate() {
        let (lo, hi) = (edges[k], edges[k + 1]);
        let count = count_open(sorted_pool, value + lo, value + hi)
            + count_open(sorted_pool, value - hi, value - lo);
        *bin = count as f64 / total as f64;
    }
    bins
}

/// Number of sorted values strictly inside `(lower, upper)`.
fn count_open(sorted: &[f64], lower: f64, upper: f64) -> usize {
    let below_upper = sorted.partition_point(|&v| v < upper);
    let at_or_below_lower = sorted.partition_point(|&v| v <= lower);
    below_upper.saturating_sub(at_or_below_lower)
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// Build the feature matrix for every candidate peak.
///
/// `mean_curve` and `std_curve` are the aggregate curves of `curves` on the
/// same frequency axis. Rows follow the order of `candidates`.
pub fn build_features(
    curves: &HvsrCurveSet,
    candidates: &[CandidatePeak],
    mean_curve: &[f64],
    std_curve: &[f64],
) -> FeatureMatrix {
    let window_energy: Vec<[f64; N_ENERGY_BINS]> = curves
        .windows()
        .map(|curve| energy_bins(curves.frequency(), curve))
        .collect();

    let log_pool = sorted(candidates.iter().map(|c| c.frequency.log10()).collect());
    let amp_pool = sorted(candidates.iter().map(|c| c.amplitude).collect());

    let rows = candidates
        .iter()
        .map(|c| {
            let mut row = [0.0; FEATURE_COUNT];
            row[columns::ENERGY].copy_from_slice(&window_energy[c.window_index]);
            row[columns::FREQUENCY_DENSITY].copy_from_slice(&neighbor_density(
                c.frequency.log10(),
                &log_pool,
                &FREQUENCY_DENSITY_EDGES,
            ));
            row[columns::AMPLITUDE_DENSITY].copy_from_slice(&neighbor_density(
                c.amplitude,
                &amp_pool,
                &AMPLITUDE_DENSITY_EDGES,
            ));
            row[columns::PROMINENCE] = c.prominence;
            row[columns::MEAN_CURVE_AMPLITUDE] = mean_curve[c.frequency_index];
            row[columns::MEAN_CURVE_STD] = std_curve[c.frequency_index];
            row
        })
        .collect();

    FeatureMatrix::from_rows(rows)
}
