//! Per-resonance statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::curves::{CurvePoint, peak_in_range};
use crate::error::{HvsrError, HvsrResult};
use crate::record::PeakRecord;
use crate::stats::{Distribution, DistributionStats};

/// Statistics of one resonance band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceSummary {
    /// Resonance id; ids ascend with frequency.
    pub resonance_id: usize,
    /// Number of valid peaks in the band.
    pub n_peaks: usize,
    /// Peak frequency statistics (Hz).
    pub frequency: DistributionStats,
    /// Peak amplitude statistics.
    pub amplitude: DistributionStats,
    /// Highest mean-curve sample inside the band's frequency range.
    pub mean_curve_peak: CurvePoint,
}

impl ResonanceSummary {
    /// Resonance period `1 / f` in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.frequency.mean
    }

    /// Frequency bounds `n` standard deviations around the location.
    pub fn frequency_bounds(&self, n: f64) -> (f64, f64) {
        (self.frequency.nstd(-n), self.frequency.nstd(n))
    }
}

/// Summarize every resonance present in `peaks`, in ascending id order.
///
/// `frequency` and `mean_curve` are the curve set's axis and mean curve.
/// Peaks without a resonance are ignored; no resonances yields an empty list.
pub fn summarize_resonances(
    peaks: &[PeakRecord],
    frequency: &[f64],
    mean_curve: &[f64],
    distribution: Distribution,
) -> HvsrResult<Vec<ResonanceSummary>> {
    let mut members: BTreeMap<usize, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for peak in peaks {
        if let Some(id) = peak.resonance {
            let entry = members.entry(id).or_default();
            entry.0.push(peak.frequency);
            entry.1.push(peak.amplitude);
        }
    }

    members
        .into_iter()
        .map(|(resonance_id, (freqs, amps))| {
            let lower = freqs.iter().copied().fold(f64::INFINITY, f64::min);
            let upper = freqs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean_curve_peak =
                peak_in_range(frequency, mean_curve, lower, upper).ok_or_else(|| {
                    HvsrError::invalid_input(format!(
                        "resonance {resonance_id} spans {lower}..{upper} Hz, \
                         outside the frequency axis"
                    ))
                })?;
            Ok(ResonanceSummary {
                resonance_id,
                n_peaks: freqs.len(),
                frequency: DistributionStats::from_values(&freqs, distribution)?,
                amplitude: DistributionStats::from_values(&amps, distribution)?,
                mean_curve_peak,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    fn peak(
        frequency_index: usize,
        frequency: f64,
        amplitude: f64,
        resonance: Option<usize>,
    ) -> PeakRecord {
        PeakRecord {
            window_index: 0,
            frequency_index,
            frequency,
            amplitude,
            prominence: 1.0,
            features: [0.0; FEATURE_COUNT],
            valid: resonance.is_some(),
            resonance,
        }
    }

    #[test]
    fn test_summaries_in_id_order() {
        let axis = [1.0, 2.0, 3.0, 4.0, 8.0];
        let mean = [1.0, 3.0, 2.0, 1.0, 5.0];
        let peaks = vec![
            peak(4, 8.0, 5.0, Some(1)),
            peak(1, 2.0, 3.0, Some(0)),
            peak(2, 3.0, 2.0, Some(0)),
            peak(3, 4.0, 9.0, None),
        ];
        let out = summarize_resonances(&peaks, &axis, &mean, Distribution::Normal).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].resonance_id, 0);
        assert_eq!(out[0].n_peaks, 2);
        assert!((out[0].frequency.mean - 2.5).abs() < 1e-12);
        assert_eq!(out[0].mean_curve_peak.frequency, 2.0);
        assert_eq!(out[1].mean_curve_peak.amplitude, 5.0);
        assert!((out[1].period() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_lognormal_frequency_is_median() {
        let axis = [1.0, 4.0];
        let mean = [2.0, 2.0];
        let peaks = vec![peak(0, 1.0, 2.0, Some(0)), peak(1, 4.0, 2.0, Some(0))];
        let out = summarize_resonances(&peaks, &axis, &mean, Distribution::Lognormal).unwrap();
        assert!((out[0].frequency.mean - 2.0).abs() < 1e-12);
        let (lo, hi) = out[0].frequency_bounds(1.0);
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn test_no_resonances_is_empty() {
        let peaks = vec![peak(0, 1.0, 2.0, None)];
        let out = summarize_resonances(&peaks, &[1.0], &[1.0], Distribution::Normal).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_lognormal_non_positive_amplitude_is_invalid() {
        let peaks = vec![peak(0, 1.0, -2.0, Some(0))];
        let err =
            summarize_resonances(&peaks, &[1.0], &[1.0], Distribution::Lognormal).unwrap_err();
        assert!(matches!(err, HvsrError::InvalidInput(_)));
    }
}
