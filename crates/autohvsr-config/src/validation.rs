//! Range checks for settings values.
//!
//! TOML parsing only guarantees types; these checks reject values the
//! pipeline cannot run with, reporting every problem at once.

use autohvsr_core::{ClusterConfig, PeakConfig, RejectionConfig};
use thiserror::Error;

use crate::settings::Settings;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A single field holds an unusable value.
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the field, e.g. `pipeline.cluster.eps`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Collect problems with the peak locator settings.
pub fn check_peaks(peaks: &PeakConfig, errors: &mut Vec<ValidationError>) {
    if !(peaks.min_prominence.is_finite() && peaks.min_prominence >= 0.0) {
        errors.push(invalid(
            "pipeline.peaks.min_prominence",
            "must be a finite, non-negative number",
        ));
    }
}

/// Collect problems with the clustering settings.
pub fn check_cluster(cluster: &ClusterConfig, errors: &mut Vec<ValidationError>) {
    if !(cluster.eps.is_finite() && cluster.eps > 0.0) {
        errors.push(invalid("pipeline.cluster.eps", "must be positive"));
    }
    if cluster.min_samples == 0 {
        errors.push(invalid("pipeline.cluster.min_samples", "must be at least 1"));
    }
    if !(cluster.gamma.is_finite() && cluster.gamma >= 0.0) {
        errors.push(invalid("pipeline.cluster.gamma", "must be non-negative"));
    }
    if cluster.min_group_members == 0 {
        errors.push(invalid("pipeline.cluster.min_group_members", "must be at least 1"));
    }
    if cluster.min_split_members < 2 * cluster.min_group_members {
        errors.push(invalid(
            "pipeline.cluster.min_split_members",
            format!(
                "must be at least twice min_group_members ({})",
                cluster.min_group_members
            ),
        ));
    }
    if !(cluster.min_split_range.is_finite() && cluster.min_split_range >= 0.0) {
        errors.push(invalid("pipeline.cluster.min_split_range", "must be non-negative"));
    }
}

/// Collect problems with the window rejection settings.
pub fn check_rejection(rejection: &RejectionConfig, errors: &mut Vec<ValidationError>) {
    if !(rejection.n.is_finite() && rejection.n > 0.0) {
        errors.push(invalid("rejection.n", "must be positive"));
    }
}

/// Validate a full settings document.
///
/// Returns the single error directly, or [`ValidationError::Multiple`].
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    let mut errors = Vec::new();
    check_peaks(&settings.pipeline.peaks, &mut errors);
    check_cluster(&settings.pipeline.cluster, &mut errors);
    check_rejection(&settings.rejection.to_config(), &mut errors);

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_single_error_is_returned_directly() {
        let mut settings = Settings::default();
        settings.pipeline.cluster.eps = 0.0;
        let err = validate_settings(&settings).unwrap_err();
        let ValidationError::Invalid { field, .. } = &err else {
            panic!("expected a single error, got {err}");
        };
        assert_eq!(field, "pipeline.cluster.eps");
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let mut settings = Settings::default();
        settings.pipeline.peaks.min_prominence = -1.0;
        settings.pipeline.cluster.min_samples = 0;
        settings.rejection.n = f64::NAN;
        let err = validate_settings(&settings).unwrap_err();
        let ValidationError::Multiple(errors) = &err else {
            panic!("expected multiple errors, got {err}");
        };
        assert_eq!(errors.len(), 3);
        assert!(err.to_string().contains("rejection.n"));
    }

    #[test]
    fn test_split_members_must_cover_both_groups() {
        let mut settings = Settings::default();
        settings.pipeline.cluster.min_split_members = 5;
        assert!(validate_settings(&settings).is_err());
    }
}
