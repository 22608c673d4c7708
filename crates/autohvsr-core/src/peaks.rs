//! Peak location on individual HVSR window curves.
//!
//! A candidate peak is a local maximum whose prominence (height above the
//! higher of its two surrounding bases) reaches a minimum threshold.

use serde::{Deserialize, Serialize};

/// Peak locator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Minimum prominence, in curve-amplitude units (default 0.25).
    pub min_prominence: f64,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            min_prominence: 0.25,
        }
    }
}

/// A local maximum on one curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedPeak {
    /// Index into the shared frequency axis.
    pub index: usize,
    /// Prominence of the peak.
    pub prominence: f64,
}

/// Find peaks of `curve` whose prominence is at least `min_prominence`.
///
/// Peaks come back in ascending index order. Flat plateaus count as a single
/// peak reported at the middle sample (lower middle for even widths). The
/// first and last samples are never peaks, so flat and monotonic curves
/// yield nothing.
pub fn find_peaks(curve: &[f64], min_prominence: f64) -> Vec<LocatedPeak> {
    local_maxima(curve)
        .into_iter()
        .filter_map(|index| {
            let prominence = prominence(curve, index);
            (prominence >= min_prominence).then_some(LocatedPeak { index, prominence })
        })
        .collect()
}

/// Indices of local maxima, including the midpoints of flat-topped maxima.
pub fn local_maxima(curve: &[f64]) -> Vec<usize> {
    let n = curve.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }

    let mut i = 1;
    while i < n - 1 {
        if curve[i - 1] < curve[i] {
            // Walk across a plateau of equal values
            let mut ahead = i + 1;
            while ahead < n - 1 && curve[ahead] == curve[i] {
                ahead += 1;
            }
            if curve[ahead] < curve[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                maxima.push((left_edge + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    maxima
}

/// Prominence of the sample at `peak`.
///
/// Walks outward on each side until a strictly higher sample or the curve
/// edge, tracking the lowest value seen; the higher of those two minima is
/// the base.
pub fn prominence(curve: &[f64], peak: usize) -> f64 {
    let height = curve[peak];

    let mut left_min = height;
    for &v in curve[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &curve[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}
