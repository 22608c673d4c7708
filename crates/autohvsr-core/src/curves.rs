//! HVSR curve sets and their aggregate (mean and standard deviation) curves.

use serde::{Deserialize, Serialize};

use crate::error::{HvsrError, HvsrResult};
use crate::stats::{Distribution, mean, sample_std};

/// Per-window HVSR amplitude curves on a shared frequency axis.
///
/// Produced by an upstream HVSR computation; this crate only reads it.
///
/// # Invariants
///
/// - at least one window and one frequency sample
/// - frequencies are finite, positive, and strictly increasing
/// - every window has exactly one finite amplitude per frequency sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCurveSet")]
pub struct HvsrCurveSet {
    frequency: Vec<f64>,
    amplitude: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawCurveSet {
    frequency: Vec<f64>,
    amplitude: Vec<Vec<f64>>,
}

impl TryFrom<RawCurveSet> for HvsrCurveSet {
    type Error = HvsrError;

    fn try_from(raw: RawCurveSet) -> Result<Self, Self::Error> {
        HvsrCurveSet::new(raw.frequency, raw.amplitude)
    }
}

impl HvsrCurveSet {
    /// Build a curve set, validating the shape invariants.
    pub fn new(frequency: Vec<f64>, amplitude: Vec<Vec<f64>>) -> HvsrResult<Self> {
        if frequency.is_empty() {
            return Err(HvsrError::invalid_input("frequency axis is empty"));
        }
        if amplitude.is_empty() {
            return Err(HvsrError::invalid_input("curve set has no windows"));
        }
        if let Some(i) = frequency.iter().position(|f| !f.is_finite() || *f <= 0.0) {
            return Err(HvsrError::invalid_input(format!(
                "frequency[{i}] = {} is not a positive finite value",
                frequency[i]
            )));
        }
        if let Some(i) = frequency.windows(2).position(|w| w[1] <= w[0]) {
            return Err(HvsrError::invalid_input(format!(
                "frequency axis is not strictly increasing at index {}",
                i + 1
            )));
        }
        for (w, curve) in amplitude.iter().enumerate() {
            if curve.len() != frequency.len() {
                return Err(HvsrError::invalid_input(format!(
                    "window {w} has {} amplitudes but the frequency axis has {}",
                    curve.len(),
                    frequency.len()
                )));
            }
            if let Some(i) = curve.iter().position(|a| !a.is_finite()) {
                return Err(HvsrError::invalid_input(format!(
                    "window {w} amplitude[{i}] is not finite"
                )));
            }
        }
        Ok(Self {
            frequency,
            amplitude,
        })
    }

    /// Shared frequency axis (Hz).
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Amplitude curve of one window.
    pub fn window(&self, index: usize) -> &[f64] {
        &self.amplitude[index]
    }

    /// Iterate over window curves in order.
    pub fn windows(&self) -> impl DoubleEndedIterator<Item = &[f64]> {
        self.amplitude.iter().map(Vec::as_slice)
    }

    /// Number of time windows.
    pub fn n_windows(&self) -> usize {
        self.amplitude.len()
    }

    /// Number of frequency samples.
    pub fn n_frequencies(&self) -> usize {
        self.frequency.len()
    }

    /// Build a new curve set from the windows whose mask entry is `true`.
    pub fn select_windows(&self, mask: &[bool]) -> HvsrResult<Self> {
        if mask.len() != self.n_windows() {
            return Err(HvsrError::invalid_input(format!(
                "window mask has {} entries for {} windows",
                mask.len(),
                self.n_windows()
            )));
        }
        let amplitude: Vec<Vec<f64>> = self
            .amplitude
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(curve, _)| curve.clone())
            .collect();
        Self::new(self.frequency.clone(), amplitude)
    }

    /// Aggregate curve across all windows.
    ///
    /// Normal: arithmetic mean per frequency sample. Lognormal: `exp(mean(ln A))`.
    pub fn mean_curve(&self, distribution: Distribution) -> HvsrResult<Vec<f64>> {
        self.column_statistic(distribution, mean)
    }

    /// Per-frequency spread across windows: sample standard deviation of `A`
    /// (normal) or of `ln A` (lognormal).
    pub fn std_curve(&self, distribution: Distribution) -> HvsrResult<Vec<f64>> {
        let mut std = Vec::with_capacity(self.n_frequencies());
        let mut column = Vec::with_capacity(self.n_windows());
        for i in 0..self.n_frequencies() {
            self.fill_column(i, distribution, &mut column)?;
            std.push(sample_std(&column));
        }
        Ok(std)
    }

    /// Mean curve shifted by `n` standard deviations, in natural units.
    pub fn nstd_curve(&self, n: f64, distribution: Distribution) -> HvsrResult<Vec<f64>> {
        let mean = self.mean_curve(distribution)?;
        let std = self.std_curve(distribution)?;
        Ok(mean
            .iter()
            .zip(&std)
            .map(|(&m, &s)| match distribution {
                Distribution::Normal => m + n * s,
                Distribution::Lognormal => (m.ln() + n * s).exp(),
            })
            .collect())
    }

    fn column_statistic(
        &self,
        distribution: Distribution,
        statistic: fn(&[f64]) -> f64,
    ) -> HvsrResult<Vec<f64>> {
        let mut out = Vec::with_capacity(self.n_frequencies());
        let mut column = Vec::with_capacity(self.n_windows());
        for i in 0..self.n_frequencies() {
            self.fill_column(i, distribution, &mut column)?;
            let value = statistic(&column);
            out.push(match distribution {
                Distribution::Normal => value,
                Distribution::Lognormal => value.exp(),
            });
        }
        Ok(out)
    }

    fn fill_column(
        &self,
        index: usize,
        distribution: Distribution,
        column: &mut Vec<f64>,
    ) -> HvsrResult<()> {
        column.clear();
        for (w, curve) in self.amplitude.iter().enumerate() {
            let a = curve[index];
            match distribution {
                Distribution::Normal => column.push(a),
                Distribution::Lognormal => {
                    if a <= 0.0 {
                        return Err(HvsrError::invalid_input(format!(
                            "window {w} amplitude {a} at {} Hz is not positive; \
                             lognormal curves need positive amplitudes",
                            self.frequency[index]
                        )));
                    }
                    column.push(a.ln());
                }
            }
        }
        Ok(())
    }
}

/// A single point on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Frequency in Hz.
    pub frequency: f64,
    /// Curve amplitude at that frequency.
    pub amplitude: f64,
}

/// Highest sample of `curve` whose frequency lies within `[lower, upper]`.
///
/// Returns `None` when no frequency sample falls inside the range.
pub fn peak_in_range(
    frequency: &[f64],
    curve: &[f64],
    lower: f64,
    upper: f64,
) -> Option<CurvePoint> {
    frequency
        .iter()
        .zip(curve)
        .filter(|(f, _)| **f >= lower && **f <= upper)
        .fold(None, |best: Option<CurvePoint>, (&f, &a)| match best {
            Some(b) if b.amplitude >= a => Some(b),
            _ => Some(CurvePoint {
                frequency: f,
                amplitude: a,
            }),
        })
}
