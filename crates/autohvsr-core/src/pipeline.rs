//! The end-to-end resonance identification pipeline.
//!
//! Stages run in a fixed order over an in-memory peak table owned by one
//! call to [`AutoHvsr::identify`]:
//!
//! ```text
//! curves -> peak locator -> feature builder -> classifier
//!        -> clusterer -> organizer -> statistics
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::{PeakClassifier, load_classifier};
use crate::cluster::{ClusterConfig, cluster_resonances};
use crate::curves::HvsrCurveSet;
use crate::error::{HvsrError, HvsrResult};
use crate::features::{CandidatePeak, FeatureMatrix, build_features};
use crate::organize::order_by_frequency;
use crate::peaks::{PeakConfig, find_peaks};
use crate::record::PeakRecord;
use crate::stats::Distribution;
use crate::summary::{ResonanceSummary, summarize_resonances};

/// Pipeline hyperparameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Distribution of the mean/std curves used as features (default lognormal).
    pub mean_curve_distribution: Distribution,
    /// Peak locator settings.
    pub peaks: PeakConfig,
    /// Clusterer settings.
    pub cluster: ClusterConfig,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoHvsrResult {
    /// Every candidate peak with its labels, ordered by window then frequency.
    pub peaks: Vec<PeakRecord>,
    /// One summary per resonance, ascending frequency.
    pub resonances: Vec<ResonanceSummary>,
    /// Mean curve used for features and mean-curve peaks.
    pub mean_curve: Vec<f64>,
    /// Standard deviation curve used for features.
    pub std_curve: Vec<f64>,
    /// Distribution the resonance statistics were computed under.
    pub distribution: Distribution,
}

impl AutoHvsrResult {
    /// Number of peaks the classifier accepted.
    pub fn n_valid(&self) -> usize {
        self.peaks.iter().filter(|p| p.valid).count()
    }

    /// Number of valid peaks that clustering left as noise.
    pub fn n_noise(&self) -> usize {
        self.peaks
            .iter()
            .filter(|p| p.valid && p.resonance.is_none())
            .count()
    }
}

/// Candidate peaks of every window, ordered by window then frequency.
pub fn candidate_peaks(curves: &HvsrCurveSet, config: &PeakConfig) -> Vec<CandidatePeak> {
    let frequency = curves.frequency();
    curves
        .windows()
        .enumerate()
        .flat_map(|(window_index, curve)| {
            find_peaks(curve, config.min_prominence)
                .into_iter()
                .map(move |p| CandidatePeak {
                    window_index,
                    frequency_index: p.index,
                    frequency: frequency[p.index],
                    amplitude: curve[p.index],
                    prominence: p.prominence,
                })
        })
        .collect()
}

/// Candidate peaks and their feature matrix under `config`.
///
/// The first two stages of the pipeline; needs no classifier.
pub fn compute_features(
    curves: &HvsrCurveSet,
    config: &PipelineConfig,
) -> HvsrResult<(Vec<CandidatePeak>, FeatureMatrix)> {
    let dist = config.mean_curve_distribution;
    let mean_curve = curves.mean_curve(dist)?;
    let std_curve = curves.std_curve(dist)?;
    let candidates = candidate_peaks(curves, &config.peaks);
    let features = build_features(curves, &candidates, &mean_curve, &std_curve);
    Ok((candidates, features))
}

/// Automatic multi-resonance identification.
///
/// Holds a shared, read-only classifier; cloning is cheap and one instance
/// can serve any number of requests.
#[derive(Clone)]
pub struct AutoHvsr {
    classifier: Arc<dyn PeakClassifier>,
    config: PipelineConfig,
}

impl std::fmt::Debug for AutoHvsr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoHvsr")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AutoHvsr {
    /// Create a pipeline with default hyperparameters.
    pub fn new(classifier: Arc<dyn PeakClassifier>) -> Self {
        Self {
            classifier,
            config: PipelineConfig::default(),
        }
    }

    /// Load the classifier artifact at `path`.
    ///
    /// Fails with [`HvsrError::Configuration`] before any curve is seen.
    pub fn from_artifact(path: impl AsRef<Path>) -> HvsrResult<Self> {
        Ok(Self::new(load_classifier(path)?))
    }

    /// Replace the hyperparameters.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current hyperparameters.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Candidate peaks and their feature matrix, without classification.
    pub fn features(
        &self,
        curves: &HvsrCurveSet,
    ) -> HvsrResult<(Vec<CandidatePeak>, FeatureMatrix)> {
        compute_features(curves, &self.config)
    }

    /// Run the full pipeline.
    ///
    /// Resonance statistics use `distribution`. Finding no peaks, no valid
    /// peaks, or no resonances is a normal, empty outcome.
    pub fn identify(
        &self,
        curves: &HvsrCurveSet,
        distribution: Distribution,
    ) -> HvsrResult<AutoHvsrResult> {
        let curve_dist = self.config.mean_curve_distribution;
        let mean_curve = curves.mean_curve(curve_dist)?;
        let std_curve = curves.std_curve(curve_dist)?;

        let candidates = candidate_peaks(curves, &self.config.peaks);
        tracing::debug!(
            windows = curves.n_windows(),
            candidates = candidates.len(),
            "located candidate peaks"
        );

        let features = build_features(curves, &candidates, &mean_curve, &std_curve);
        let labels = self.classifier.classify(&features);
        if labels.len() != candidates.len() {
            return Err(HvsrError::configuration(format!(
                "classifier returned {} labels for {} peaks",
                labels.len(),
                candidates.len()
            )));
        }
        tracing::debug!(
            valid = labels.iter().filter(|v| **v).count(),
            "classified peaks"
        );

        let valid_positions: Vec<usize> = (0..candidates.len()).filter(|&i| labels[i]).collect();
        let log_frequencies: Vec<f64> = valid_positions
            .iter()
            .map(|&i| candidates[i].frequency.log10())
            .collect();
        let clustered = cluster_resonances(&log_frequencies, &self.config.cluster);
        let ordered = order_by_frequency(&clustered, &log_frequencies);

        let mut resonance = vec![None; candidates.len()];
        for (&i, id) in valid_positions.iter().zip(ordered) {
            resonance[i] = id;
        }

        let peaks: Vec<PeakRecord> = candidates
            .iter()
            .zip(features.into_rows())
            .zip(labels.iter().zip(resonance))
            .map(|((c, features), (&valid, resonance))| PeakRecord {
                window_index: c.window_index,
                frequency_index: c.frequency_index,
                frequency: c.frequency,
                amplitude: c.amplitude,
                prominence: c.prominence,
                features,
                valid,
                resonance,
            })
            .collect();

        let resonances =
            summarize_resonances(&peaks, curves.frequency(), &mean_curve, distribution)?;
        tracing::info!(
            peaks = peaks.len(),
            resonances = resonances.len(),
            %distribution,
            "identified resonances"
        );

        Ok(AutoHvsrResult {
            peaks,
            resonances,
            mean_curve,
            std_curve,
            distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    struct Fixed(Vec<bool>);

    impl PeakClassifier for Fixed {
        fn classify(&self, _features: &FeatureMatrix) -> Vec<bool> {
            self.0.clone()
        }
    }

    struct Always(bool);

    impl PeakClassifier for Always {
        fn classify(&self, features: &FeatureMatrix) -> Vec<bool> {
            features.rows().iter().map(|_: &FeatureVector| self.0).collect()
        }
    }

    fn axis() -> Vec<f64> {
        (0..64).map(|i| 10f64.powf(-0.5 + 1.5 * f64::from(i) / 63.0)).collect()
    }

    fn window(axis: &[f64], f0: f64) -> Vec<f64> {
        axis.iter()
            .map(|f| {
                let x = (f.log10() - f0.log10()) / 0.05;
                1.0 + 4.0 * (-0.5 * x * x).exp()
            })
            .collect()
    }

    fn curves(n: usize) -> HvsrCurveSet {
        let axis = axis();
        let amplitude = (0..n).map(|i| window(&axis, 2.0 + 0.01 * i as f64)).collect();
        HvsrCurveSet::new(axis, amplitude).unwrap()
    }

    #[test]
    fn test_single_resonance() {
        let pipeline = AutoHvsr::new(Arc::new(Always(true)));
        let result = pipeline.identify(&curves(12), Distribution::Lognormal).unwrap();
        assert_eq!(result.peaks.len(), 12);
        assert_eq!(result.resonances.len(), 1);
        assert_eq!(result.resonances[0].n_peaks, 12);
        assert!((result.resonances[0].frequency.mean - 2.05).abs() < 0.15);
        assert_eq!(result.n_noise(), 0);
    }

    #[test]
    fn test_too_few_peaks_is_noise_not_error() {
        let pipeline = AutoHvsr::new(Arc::new(Always(true)));
        let result = pipeline.identify(&curves(5), Distribution::Normal).unwrap();
        assert!(result.resonances.is_empty());
        assert_eq!(result.n_noise(), 5);
        assert!(result.peaks.iter().all(|p| p.resonance_id() == -1));
    }

    #[test]
    fn test_reject_all() {
        let pipeline = AutoHvsr::new(Arc::new(Always(false)));
        let result = pipeline.identify(&curves(12), Distribution::Lognormal).unwrap();
        assert_eq!(result.n_valid(), 0);
        assert!(result.resonances.is_empty());
    }

    #[test]
    fn test_label_length_mismatch_is_configuration_error() {
        let pipeline = AutoHvsr::new(Arc::new(Fixed(vec![true])));
        let err = pipeline.identify(&curves(12), Distribution::Lognormal).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_flat_curves_give_empty_result() {
        let axis = axis();
        let set = HvsrCurveSet::new(axis.clone(), vec![vec![1.0; axis.len()]; 4]).unwrap();
        let pipeline = AutoHvsr::new(Arc::new(Always(true)));
        let result = pipeline.identify(&set, Distribution::Lognormal).unwrap();
        assert!(result.peaks.is_empty());
        assert!(result.resonances.is_empty());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = PipelineConfig {
            mean_curve_distribution: Distribution::Normal,
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        let partial: PipelineConfig =
            serde_json::from_str(r#"{"peaks":{"min_prominence":1.0}}"#).unwrap();
        assert_eq!(partial.cluster, ClusterConfig::default());
        assert_eq!(partial.peaks.min_prominence, 1.0);
    }
}
