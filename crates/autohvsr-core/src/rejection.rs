//! Frequency-domain window rejection.
//!
//! Windows whose main peak lies far from the consensus f0 are dropped
//! iteratively. Each pass keeps windows with `nstd(-n) < f0 < nstd(+n)` under
//! the f0 statistics of the windows kept so far, and the loop stops once both
//! the f0 spread and the distance between f0 and the mean-curve peak settle.

use serde::{Deserialize, Serialize};

use crate::curves::HvsrCurveSet;
use crate::error::HvsrResult;
use crate::fundamental::{FundamentalSummary, window_peaks};
use crate::stats::Distribution;

/// Relative change below which an iteration counts as converged.
const CONVERGENCE_TOLERANCE: f64 = 0.01;

/// Window rejection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionConfig {
    /// Half-width of the acceptance band in standard deviations (default 2.0).
    pub n: f64,
    /// Iteration cap (default 50).
    pub max_iterations: usize,
}

impl Default for RejectionConfig {
    fn default() -> Self {
        Self {
            n: 2.0,
            max_iterations: 50,
        }
    }
}

/// Result of [`reject_windows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionOutcome {
    /// One entry per window, `true` if the window was kept.
    pub accepted: Vec<bool>,
    /// Passes performed.
    pub iterations: usize,
    /// f0 statistics of all windows.
    pub before: FundamentalSummary,
    /// f0 statistics of the kept windows.
    pub after: FundamentalSummary,
}

impl RejectionOutcome {
    /// Number of rejected windows.
    pub fn n_rejected(&self) -> usize {
        self.accepted.iter().filter(|a| !**a).count()
    }
}

/// Iteratively reject windows whose main peak is an outlier.
///
/// A pass that would reject every window is not applied. Iteration stops
/// early when the spread or the f0/f0,mc distance reaches zero.
pub fn reject_windows(
    curves: &HvsrCurveSet,
    config: &RejectionConfig,
    distribution_f0: Distribution,
    distribution_mc: Distribution,
) -> HvsrResult<RejectionOutcome> {
    let peaks = window_peaks(curves);
    let mut accepted = vec![true; curves.n_windows()];
    let before = FundamentalSummary::from_windows(
        curves,
        &peaks,
        &accepted,
        distribution_f0,
        distribution_mc,
    )?;

    let mut current = before;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let d_before = current.mean_curve_offset();
        let s_before = current.f0.std;
        if d_before == 0.0 || s_before == 0.0 {
            break;
        }

        let (lower, upper) = (current.f0.nstd(-config.n), current.f0.nstd(config.n));
        let next: Vec<bool> = accepted
            .iter()
            .zip(&peaks)
            .map(|(&keep, p)| keep && p.frequency > lower && p.frequency < upper)
            .collect();
        if !next.contains(&true) {
            break;
        }
        iterations += 1;

        let summary = FundamentalSummary::from_windows(
            curves,
            &peaks,
            &next,
            distribution_f0,
            distribution_mc,
        )?;
        accepted = next;
        let d_after = summary.mean_curve_offset();
        let s_after = summary.f0.std;
        current = summary;

        tracing::debug!(
            iteration = iterations,
            kept = current.n_windows,
            f0 = current.f0.mean,
            std = s_after,
            "window rejection pass"
        );

        if d_after == 0.0 || s_after == 0.0 {
            break;
        }
        let d_change = (d_after - d_before).abs() / d_before;
        let s_change = (s_after - s_before).abs() / s_before;
        if d_change < CONVERGENCE_TOLERANCE && s_change < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    tracing::info!(
        iterations,
        rejected = accepted.iter().filter(|a| !**a).count(),
        "window rejection finished"
    );

    Ok(RejectionOutcome {
        accepted,
        iterations,
        before,
        after: current,
    })
}
