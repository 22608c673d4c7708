//! Descriptive statistics under the normal and lognormal distributions.
//!
//! Lognormal statistics follow the usual HVSR reporting convention: the
//! location is the lognormal median `exp(mean(ln x))` in natural units and
//! the spread is the standard deviation of `ln x`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HvsrError, HvsrResult};

/// Distribution family used to summarize a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Arithmetic mean and standard deviation.
    Normal,
    /// Median and standard deviation of the natural log.
    #[default]
    #[serde(alias = "log-normal")]
    Lognormal,
}

impl Distribution {
    /// Lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Distribution::Normal => "normal",
            Distribution::Lognormal => "lognormal",
        }
    }

    /// Label for the location statistic ("Mean" or "LM" for lognormal median).
    pub fn location_label(self) -> &'static str {
        match self {
            Distribution::Normal => "Mean",
            Distribution::Lognormal => "LM",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = HvsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Distribution::Normal),
            "lognormal" | "log-normal" => Ok(Distribution::Lognormal),
            other => Err(HvsrError::invalid_input(format!(
                "unknown distribution '{other}' (expected 'normal' or 'lognormal')"
            ))),
        }
    }
}

/// Location and spread of a set of values under a [`Distribution`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Distribution the statistics were computed under.
    pub distribution: Distribution,
    /// Mean (normal) or lognormal median, in natural units.
    pub mean: f64,
    /// Standard deviation (normal) or standard deviation of `ln x` (lognormal).
    pub std: f64,
}

impl DistributionStats {
    /// Summarize `values` under `distribution`.
    ///
    /// Fails on an empty slice, and on non-positive values for the
    /// lognormal family.
    pub fn from_values(values: &[f64], distribution: Distribution) -> HvsrResult<Self> {
        if values.is_empty() {
            return Err(HvsrError::invalid_input(
                "cannot compute statistics of an empty set",
            ));
        }
        match distribution {
            Distribution::Normal => Ok(Self {
                distribution,
                mean: mean(values),
                std: sample_std(values),
            }),
            Distribution::Lognormal => {
                let logs = ln_values(values)?;
                Ok(Self {
                    distribution,
                    mean: mean(&logs).exp(),
                    std: sample_std(&logs),
                })
            }
        }
    }

    /// Value `n` standard deviations away from the location, in natural units.
    pub fn nstd(&self, n: f64) -> f64 {
        match self.distribution {
            Distribution::Normal => self.mean + n * self.std,
            Distribution::Lognormal => (self.mean.ln() + n * self.std).exp(),
        }
    }
}

/// Natural log of every value; lognormal statistics need strictly positive input.
pub(crate) fn ln_values(values: &[f64]) -> HvsrResult<Vec<f64>> {
    values
        .iter()
        .map(|&v| {
            if v > 0.0 {
                Ok(v.ln())
            } else {
                Err(HvsrError::invalid_input(format!(
                    "lognormal statistics require positive values, got {v}"
                )))
            }
        })
        .collect()
}

/// Arithmetic mean (0 for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (0 for an empty slice).
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with one degree of freedom removed
/// (0 for fewer than two values).
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&v) - 2.5).abs() < 1e-12);
        assert!((variance(&v) - 1.25).abs() < 1e-12);
        assert!((sample_std(&v) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(sample_std(&[3.0]), 0.0);
    }

    #[test]
    fn test_normal_stats() {
        let stats = DistributionStats::from_values(&[2.0, 4.0], Distribution::Normal).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.std - 2.0f64.sqrt()).abs() < 1e-12);
        assert!((stats.nstd(1.0) - (3.0 + 2.0f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_lognormal_stats_report_median() {
        let stats =
            DistributionStats::from_values(&[1.0, 100.0], Distribution::Lognormal).unwrap();
        // Geometric mean of 1 and 100
        assert!((stats.mean - 10.0).abs() < 1e-9);
        let expected_std = (2.0 * (100.0f64.ln() / 2.0).powi(2)).sqrt();
        assert!((stats.std - expected_std).abs() < 1e-9);
        assert!((stats.nstd(0.0) - 10.0).abs() < 1e-9);
        assert!(stats.nstd(-1.0) < stats.mean && stats.nstd(1.0) > stats.mean);
    }

    #[test]
    fn test_lognormal_rejects_non_positive() {
        let err = DistributionStats::from_values(&[1.0, 0.0], Distribution::Lognormal);
        assert!(matches!(err, Err(HvsrError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_set_is_invalid() {
        assert!(DistributionStats::from_values(&[], Distribution::Normal).is_err());
    }

    #[test]
    fn test_distribution_parse() {
        assert_eq!("normal".parse::<Distribution>().unwrap(), Distribution::Normal);
        assert_eq!("log-normal".parse::<Distribution>().unwrap(), Distribution::Lognormal);
        assert_eq!("LogNormal".parse::<Distribution>().unwrap(), Distribution::Lognormal);
        assert!("gamma".parse::<Distribution>().is_err());
    }
}
