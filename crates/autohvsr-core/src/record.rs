//! The labeled peak table shared by the pipeline stages.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// One candidate peak with its features and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
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
    /// Feature vector in the frozen layout.
    pub features: FeatureVector,
    /// Classifier verdict.
    pub valid: bool,
    /// Resonance band, `None` for invalid peaks and clustering noise.
    pub resonance: Option<usize>,
}

impl PeakRecord {
    /// Resonance id with `-1` standing for "no resonance".
    pub fn resonance_id(&self) -> i64 {
        self.resonance.map_or(-1, |r| r as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    fn record(resonance: Option<usize>) -> PeakRecord {
        PeakRecord {
            window_index: 0,
            frequency_index: 3,
            frequency: 2.0,
            amplitude: 4.0,
            prominence: 1.5,
            features: [0.25; FEATURE_COUNT],
            valid: resonance.is_some(),
            resonance,
        }
    }

    #[test]
    fn test_resonance_id_encoding() {
        assert_eq!(record(None).resonance_id(), -1);
        assert_eq!(record(Some(2)).resonance_id(), 2);
    }

    #[test]
    fn test_json_keeps_feature_list() {
        let json = serde_json::to_string(&record(Some(0))).unwrap();
        let back: PeakRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record(Some(0)));

        let short = json.replacen("0.25,", "", 1);
        assert!(serde_json::from_str::<PeakRecord>(&short).is_err());
    }
}
