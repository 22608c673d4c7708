//! Peak classifier capability and the serialized artifacts that implement it.
//!
//! The pipeline only needs [`PeakClassifier::classify`]. Trained models are
//! shipped as JSON artifacts tagged by `"kind"`:
//!
//! ```json
//! { "kind": "logistic", "n_features": 19, "weights": [...], "intercept": -1.2,
//!   "scaler": { "mean": [...], "scale": [...] }, "threshold": 0.5 }
//!
//! { "kind": "forest", "n_features": 19, "threshold": 0.5, "trees": [
//!     { "nodes": [ { "feature": 16, "threshold": 0.8, "left": 1, "right": 2 },
//!                  { "value": 0.1 }, { "value": 0.9 } ] } ] }
//!
//! { "kind": "prominence", "n_features": 19, "min_prominence": 0.5 }
//! ```
//!
//! Any problem with an artifact is a [`HvsrError::Configuration`] and is
//! raised when the artifact is loaded, never while curves are processed.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HvsrError, HvsrResult};
use crate::features::{FEATURE_COUNT, FeatureMatrix, FeatureVector, columns};

/// Binary classifier deciding which candidate peaks indicate a resonance.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait PeakClassifier: Send + Sync {
    /// One label per feature row, `true` for a valid peak.
    fn classify(&self, features: &FeatureMatrix) -> Vec<bool>;
}

fn default_threshold() -> f64 {
    0.5
}

/// Serialized classifier model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierArtifact {
    /// Logistic regression on (optionally standardized) features.
    Logistic(LogisticModel),
    /// Averaged ensemble of decision trees.
    Forest(ForestModel),
    /// Rule: accept peaks at or above a prominence.
    Prominence(ProminenceRule),
}

/// Logistic regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Expected feature vector length.
    pub n_features: usize,
    /// One coefficient per feature.
    pub weights: Vec<f64>,
    /// Bias term.
    pub intercept: f64,
    /// Standardization applied before the linear term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
    /// Minimum probability of a valid peak.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Per-feature standardization `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature offsets.
    pub mean: Vec<f64>,
    /// Per-feature divisors; must be non-zero.
    pub scale: Vec<f64>,
}

/// Decision-tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    /// Expected feature vector length.
    pub n_features: usize,
    /// Trees whose leaf probabilities are averaged.
    pub trees: Vec<DecisionTree>,
    /// Minimum averaged probability of a valid peak.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// A binary decision tree stored as a flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree nodes. Children always have larger indices than their parent.
    pub nodes: Vec<TreeNode>,
}

/// One node of a [`DecisionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go `left` when `row[feature] <= threshold`, else `right`.
    Split {
        /// Feature column tested.
        feature: usize,
        /// Split value.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
    /// Probability of a valid peak.
    Leaf {
        /// Leaf probability in `[0, 1]`.
        value: f64,
    },
}

/// Prominence-only rule, useful as a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProminenceRule {
    /// Expected feature vector length.
    pub n_features: usize,
    /// Minimum prominence of a valid peak.
    pub min_prominence: f64,
}

impl ClassifierArtifact {
    /// Parse and validate an artifact from JSON text.
    pub fn from_json_str(json: &str) -> HvsrResult<Self> {
        let artifact: ClassifierArtifact = serde_json::from_str(json)
            .map_err(|e| HvsrError::configuration(format!("malformed classifier artifact: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, parse and validate an artifact file.
    pub fn load(path: impl AsRef<Path>) -> HvsrResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            HvsrError::configuration(format!(
                "cannot read classifier artifact '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> HvsrResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HvsrError::configuration(format!("cannot serialize artifact: {e}")))
    }

    /// Short model name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::Logistic(_) => "logistic",
            ClassifierArtifact::Forest(_) => "forest",
            ClassifierArtifact::Prominence(_) => "prominence",
        }
    }

    /// Check the artifact against the frozen feature layout.
    pub fn validate(&self) -> HvsrResult<()> {
        match self {
            ClassifierArtifact::Logistic(m) => m.validate(),
            ClassifierArtifact::Forest(m) => m.validate(),
            ClassifierArtifact::Prominence(m) => m.validate(),
        }
    }

    /// Decide a single feature row.
    pub fn predict_row(&self, row: &FeatureVector) -> bool {
        match self {
            ClassifierArtifact::Logistic(m) => m.probability(row) >= m.threshold,
            ClassifierArtifact::Forest(m) => m.probability(row) >= m.threshold,
            ClassifierArtifact::Prominence(m) => row[columns::PROMINENCE] >= m.min_prominence,
        }
    }
}

impl PeakClassifier for ClassifierArtifact {
    fn classify(&self, features: &FeatureMatrix) -> Vec<bool> {
        features.rows().iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Load an artifact and wrap it for sharing across requests.
pub fn load_classifier(path: impl AsRef<Path>) -> HvsrResult<Arc<dyn PeakClassifier>> {
    let artifact = ClassifierArtifact::load(path)?;
    tracing::debug!(kind = artifact.kind(), "loaded peak classifier");
    Ok(Arc::new(artifact))
}

fn check_feature_count(n_features: usize) -> HvsrResult<()> {
    if n_features != FEATURE_COUNT {
        return Err(HvsrError::configuration(format!(
            "artifact expects {n_features} features but the feature layout has {FEATURE_COUNT}"
        )));
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> HvsrResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(HvsrError::configuration(format!(
            "probability threshold {threshold} is outside [0, 1]"
        )));
    }
    Ok(())
}

fn check_length(name: &str, values: &[f64]) -> HvsrResult<()> {
    if values.len() != FEATURE_COUNT {
        return Err(HvsrError::configuration(format!(
            "{name} has {} entries, expected {FEATURE_COUNT}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(HvsrError::configuration(format!("{name} contains a non-finite value")));
    }
    Ok(())
}

impl LogisticModel {
    fn validate(&self) -> HvsrResult<()> {
        check_feature_count(self.n_features)?;
        check_threshold(self.threshold)?;
        check_length("weights", &self.weights)?;
        if !self.intercept.is_finite() {
            return Err(HvsrError::configuration("intercept is not finite"));
        }
        if let Some(scaler) = &self.scaler {
            check_length("scaler.mean", &scaler.mean)?;
            check_length("scaler.scale", &scaler.scale)?;
            if scaler.scale.contains(&0.0) {
                return Err(HvsrError::configuration("scaler.scale contains zero"));
            }
        }
        Ok(())
    }

    /// Sigmoid probability that `row` is a valid peak.
    ///
    /// Features beyond the shortest of `weights` and the scaler vectors are
    /// ignored; [`ClassifierArtifact::validate`] rules that case out for
    /// loaded artifacts.
    pub fn probability(&self, row: &FeatureVector) -> f64 {
        let weighted = row.iter().zip(&self.weights);
        let z: f64 = match &self.scaler {
            Some(s) => weighted
                .zip(s.mean.iter().zip(&s.scale))
                .map(|((x, w), (m, scale))| w * (x - m) / scale)
                .sum(),
            None => weighted.map(|(x, w)| w * x).sum(),
        };
        1.0 / (1.0 + (-(z + self.intercept)).exp())
    }
}

impl ForestModel {
    fn validate(&self) -> HvsrResult<()> {
        check_feature_count(self.n_features)?;
        check_threshold(self.threshold)?;
        if self.trees.is_empty() {
            return Err(HvsrError::configuration("forest has no trees"));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|reason| HvsrError::configuration(format!("tree {t}: {reason}")))?;
        }
        Ok(())
    }

    /// Mean leaf probability across trees.
    pub fn probability(&self, row: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(row)).sum();
        sum / self.trees.len() as f64
    }
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(format!("leaf {i} probability {value} is outside [0, 1]"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Probability at the leaf reached by `row`.
    ///
    /// A walk that leaves the node table, revisits an earlier node, or splits
    /// on an unknown feature yields 0. Validated trees never do.
    pub fn leaf_value(&self, row: &FeatureVector) -> f64 {
        let mut index = 0;
        while let Some(node) = self.nodes.get(index) {
            match *node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let Some(&x) = row.get(feature) else {
                        return 0.0;
                    };
                    let next = if x <= threshold { left } else { right };
                    if next <= index {
                        return 0.0;
                    }
                    index = next;
                }
            }
        }
        0.0
    }
}

impl ProminenceRule {
    fn validate(&self) -> HvsrResult<()> {
        check_feature_count(self.n_features)?;
        if !self.min_prominence.is_finite() {
            return Err(HvsrError::configuration("min_prominence is not finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_prominence(p: f64) -> FeatureVector {
        let mut row = [0.0; FEATURE_COUNT];
        row[columns::PROMINENCE] = p;
        row
    }

    #[test]
    fn test_prominence_rule() {
        let artifact = ClassifierArtifact::from_json_str(
            r#"{"kind":"prominence","n_features":19,"min_prominence":0.5}"#,
        )
        .unwrap();
        let m = FeatureMatrix::from_rows(vec![row_with_prominence(0.4), row_with_prominence(0.5)]);
        assert_eq!(artifact.classify(&m), vec![false, true]);
    }

    #[test]
    fn test_logistic_probability_and_scaler() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[columns::PROMINENCE] = 2.0;
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[columns::PROMINENCE] = 0.5;
        let model = LogisticModel {
            n_features: FEATURE_COUNT,
            weights,
            intercept: -2.0,
            scaler: Some(StandardScaler {
                mean: vec![0.0; FEATURE_COUNT],
                scale,
            }),
            threshold: 0.5,
        };
        model.validate().unwrap();
        // z = 2 * (0.5 / 0.5) - 2 = 0
        assert!((model.probability(&row_with_prominence(0.5)) - 0.5).abs() < 1e-12);
        let artifact = ClassifierArtifact::Logistic(model);
        assert!(artifact.predict_row(&row_with_prominence(1.0)));
        assert!(!artifact.predict_row(&row_with_prominence(0.1)));
    }

    #[test]
    fn test_forest_averages_trees() {
        let json = r#"{
            "kind": "forest", "n_features": 19,
            "trees": [
                { "nodes": [
                    { "feature": 16, "threshold": 1.0, "left": 1, "right": 2 },
                    { "value": 0.0 }, { "value": 1.0 } ] },
                { "nodes": [ { "value": 0.6 } ] }
            ]
        }"#;
        let artifact = ClassifierArtifact::from_json_str(json).unwrap();
        let ClassifierArtifact::Forest(forest) = &artifact else {
            panic!("expected forest");
        };
        assert!((forest.probability(&row_with_prominence(0.5)) - 0.3).abs() < 1e-12);
        assert!((forest.probability(&row_with_prominence(2.0)) - 0.8).abs() < 1e-12);
        let m = FeatureMatrix::from_rows(vec![row_with_prominence(0.5), row_with_prominence(2.0)]);
        assert_eq!(artifact.classify(&m), vec![false, true]);
    }

    #[test]
    fn test_unvalidated_models_do_not_panic() {
        let short = ClassifierArtifact::Logistic(LogisticModel {
            n_features: FEATURE_COUNT,
            weights: vec![1.0],
            intercept: 0.0,
            scaler: Some(StandardScaler {
                mean: vec![0.0; 3],
                scale: vec![1.0; 3],
            }),
            threshold: 0.5,
        });
        assert!(short.validate().is_err());
        let m = FeatureMatrix::from_rows(vec![row_with_prominence(1.0); 2]);
        // only feature 0 (zero here) reaches the linear term
        assert_eq!(short.classify(&m), vec![true, true]);

        let broken = DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 40,
                    threshold: 0.0,
                    left: 1,
                    right: 1,
                },
                TreeNode::Leaf { value: 1.0 },
            ],
        };
        assert_eq!(broken.leaf_value(&row_with_prominence(1.0)), 0.0);
        let cyclic = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 7,
            }],
        };
        assert_eq!(cyclic.leaf_value(&row_with_prominence(1.0)), 0.0);
        assert_eq!(DecisionTree { nodes: vec![] }.leaf_value(&row_with_prominence(1.0)), 0.0);
    }

    #[test]
    fn test_wrong_feature_count_is_configuration_error() {
        let err = ClassifierArtifact::from_json_str(
            r#"{"kind":"prominence","n_features":12,"min_prominence":0.5}"#,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_artifacts_are_configuration_errors() {
        for json in [
            "not json",
            r#"{"kind":"svm","n_features":19}"#,
            r#"{"kind":"logistic","n_features":19,"weights":[1.0],"intercept":0.0}"#,
            r#"{"kind":"forest","n_features":19,"trees":[]}"#,
            r#"{"kind":"forest","n_features":19,"trees":[{"nodes":[
                {"feature":0,"threshold":0.0,"left":0,"right":1},{"value":0.5}]}]}"#,
            r#"{"kind":"forest","n_features":19,"trees":[{"nodes":[{"value":1.5}]}]}"#,
        ] {
            let err = ClassifierArtifact::from_json_str(json).unwrap_err();
            assert!(err.is_configuration(), "{json} -> {err}");
        }
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_classifier(dir.path().join("absent.json")).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_artifact_json_round_trip() {
        let artifact = ClassifierArtifact::Prominence(ProminenceRule {
            n_features: FEATURE_COUNT,
            min_prominence: 0.3,
        });
        let json = artifact.to_json_string().unwrap();
        assert!(json.contains("\"kind\": \"prominence\""));
        assert_eq!(ClassifierArtifact::from_json_str(&json).unwrap(), artifact);
    }
}
