//! AutoHVSR Core - Automatic multi-resonance identification for HVSR curves
//!
//! Given per-window horizontal-to-vertical spectral ratio curves, this crate
//! finds the frequency bands where many windows agree on a spectral peak:
//!
//! - [`peaks`] - Local maxima with a minimum-prominence threshold
//! - [`features`] - Frozen 19-column feature vectors per candidate peak
//! - [`classifier`] - Peak classifier capability and JSON model artifacts
//! - [`cluster`] - DBSCAN on log-frequency plus a variance-reduction split
//! - [`organize`] - Resonance ids in ascending frequency order
//! - [`summary`] - Per-resonance statistics and mean-curve peaks
//! - [`pipeline`] - The [`AutoHvsr`] pipeline tying the stages together
//! - [`fundamental`] / [`rejection`] - f0 statistics and window rejection
//! - [`io`] - Curve set and result files
//! - [`hv`] - hvsrpy- and Geopsy-style `.hv` reports
//! - [`synthetic`] - Reproducible synthetic curve sets
//!
//! ## Example
//!
//! ```rust,ignore
//! use autohvsr_core::{AutoHvsr, Distribution, io};
//!
//! let pipeline = AutoHvsr::from_artifact("classifier.json")?;
//! let curves = io::read_curve_set("curves.json")?;
//! let result = pipeline.identify(&curves, Distribution::Lognormal)?;
//!
//! for r in &result.resonances {
//!     println!("f{} = {:.2} Hz ({} peaks)", r.resonance_id, r.frequency.mean, r.n_peaks);
//! }
//! ```
//!
//! ## Window Rejection
//!
//! ```rust,ignore
//! use autohvsr_core::rejection::{RejectionConfig, reject_windows};
//!
//! let outcome = reject_windows(&curves, &RejectionConfig::default(),
//!                              Distribution::Lognormal, Distribution::Lognormal)?;
//! let kept = curves.select_windows(&outcome.accepted)?;
//! ```

pub mod classifier;
pub mod cluster;
pub mod curves;
pub mod error;
pub mod features;
pub mod fundamental;
pub mod hv;
pub mod io;
pub mod organize;
pub mod peaks;
pub mod pipeline;
pub mod record;
pub mod rejection;
pub mod stats;
pub mod summary;
pub mod synthetic;

pub use classifier::{ClassifierArtifact, PeakClassifier, load_classifier};
pub use cluster::ClusterConfig;
pub use curves::{CurvePoint, HvsrCurveSet};
pub use error::{HvsrError, HvsrResult};
pub use features::{FEATURE_COUNT, FeatureMatrix, FeatureVector};
pub use fundamental::FundamentalSummary;
pub use hv::{HvReport, HvStyle};
pub use peaks::PeakConfig;
pub use pipeline::{AutoHvsr, AutoHvsrResult, PipelineConfig};
pub use record::PeakRecord;
pub use rejection::{RejectionConfig, RejectionOutcome};
pub use stats::{Distribution, DistributionStats};
pub use summary::ResonanceSummary;
