//! Fundamental-frequency (f0) statistics from per-window main peaks.

use serde::{Deserialize, Serialize};

use crate::curves::{CurvePoint, HvsrCurveSet, peak_in_range};
use crate::error::{HvsrError, HvsrResult};
use crate::stats::{Distribution, DistributionStats};

/// Main peak of every window: its highest amplitude sample.
///
/// Ties resolve to the lowest frequency.
pub fn window_peaks(curves: &HvsrCurveSet) -> Vec<CurvePoint> {
    let frequency = curves.frequency();
    curves
        .windows()
        .map(|curve| {
            let (index, &amplitude) = curve
                .iter()
                .enumerate()
                .fold((0, &curve[0]), |best, (i, a)| if *a > *best.1 { (i, a) } else { best });
            CurvePoint {
                frequency: frequency[index],
                amplitude,
            }
        })
        .collect()
}

/// f0 statistics over a subset of windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSummary {
    /// Statistics of the windows' main-peak frequencies.
    pub f0: DistributionStats,
    /// Highest point of the mean curve of the same windows (f0,mc).
    pub mean_curve_peak: CurvePoint,
    /// Number of windows included.
    pub n_windows: usize,
}

impl FundamentalSummary {
    /// Summarize the windows selected by `mask`.
    ///
    /// `peaks` must come from [`window_peaks`] on the same curve set.
    pub fn from_windows(
        curves: &HvsrCurveSet,
        peaks: &[CurvePoint],
        mask: &[bool],
        distribution_f0: Distribution,
        distribution_mc: Distribution,
    ) -> HvsrResult<Self> {
        let selected = curves.select_windows(mask)?;
        let f0s: Vec<f64> = peaks
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(p, _)| p.frequency)
            .collect();
        let f0 = DistributionStats::from_values(&f0s, distribution_f0)?;

        let mean_curve = selected.mean_curve(distribution_mc)?;
        let axis = selected.frequency();
        let mean_curve_peak = peak_in_range(axis, &mean_curve, axis[0], axis[axis.len() - 1])
            .ok_or_else(|| HvsrError::invalid_input("mean curve has no samples"))?;

        Ok(Self {
            f0,
            mean_curve_peak,
            n_windows: f0s.len(),
        })
    }

    /// Summarize every window of `curves`.
    pub fn from_curves(
        curves: &HvsrCurveSet,
        distribution_f0: Distribution,
        distribution_mc: Distribution,
    ) -> HvsrResult<Self> {
        let peaks = window_peaks(curves);
        let mask = vec![true; curves.n_windows()];
        Self::from_windows(curves, &peaks, &mask, distribution_f0, distribution_mc)
    }

    /// Site period `T0 = 1 / f0` in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.f0.mean
    }

    /// Distance between the f0 location and f0,mc.
    pub fn mean_curve_offset(&self) -> f64 {
        (self.f0.mean - self.mean_curve_peak.frequency).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> HvsrCurveSet {
        HvsrCurveSet::new(
            vec![1.0, 2.0, 4.0, 8.0],
            vec![
                vec![1.0, 3.0, 1.0, 1.0],
                vec![1.0, 1.0, 3.0, 1.0],
                vec![1.0, 1.0, 1.0, 3.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_window_peaks() {
        let peaks = window_peaks(&set());
        let f: Vec<f64> = peaks.iter().map(|p| p.frequency).collect();
        assert_eq!(f, vec![2.0, 4.0, 8.0]);
        assert!(peaks.iter().all(|p| p.amplitude == 3.0));
    }

    #[test]
    fn test_lognormal_f0_and_period() {
        let summary = FundamentalSummary::from_curves(
            &set(),
            Distribution::Lognormal,
            Distribution::Lognormal,
        )
        .unwrap();
        assert_eq!(summary.n_windows, 3);
        assert!((summary.f0.mean - 4.0).abs() < 1e-9);
        assert!((summary.period() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_masked_summary() {
        let curves = set();
        let peaks = window_peaks(&curves);
        let summary = FundamentalSummary::from_windows(
            &curves,
            &peaks,
            &[true, false, false],
            Distribution::Normal,
            Distribution::Normal,
        )
        .unwrap();
        assert_eq!(summary.n_windows, 1);
        assert_eq!(summary.f0.mean, 2.0);
        assert_eq!(summary.f0.std, 0.0);
        assert_eq!(summary.mean_curve_peak.frequency, 2.0);
        assert_eq!(summary.mean_curve_offset(), 0.0);
    }
}
