//! Error types for the resonance identification pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the AutoHVSR core.
///
/// Empty outcomes (no peaks, no valid peaks, no resonances) are not errors;
/// they come back as empty result lists.
#[derive(Debug, Error)]
pub enum HvsrError {
    /// Classifier artifact missing, malformed, or inconsistent with the
    /// feature layout. Retrying without fixing the artifact cannot succeed.
    #[error("classifier configuration error: {0}")]
    Configuration(String),

    /// Curve set or request violates an input invariant.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failed to read or write a file
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path of the file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File contents could not be parsed
    #[error("failed to parse '{path}': {reason}")]
    Parse {
        /// Path of the file being parsed.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },
}

impl HvsrError {
    /// Create a configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        HvsrError::Configuration(reason.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        HvsrError::InvalidInput(reason.into())
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HvsrError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HvsrError::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is a configuration error (fatal, not retryable).
    pub fn is_configuration(&self) -> bool {
        matches!(self, HvsrError::Configuration(_))
    }
}

/// Result type for core operations.
pub type HvsrResult<T> = Result<T, HvsrError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn configuration_display() {
        let err = HvsrError::configuration("model file not found");
        assert_eq!(
            err.to_string(),
            "classifier configuration error: model file not found"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn invalid_input_is_not_configuration() {
        let err = HvsrError::invalid_input("no windows");
        assert_eq!(err.to_string(), "invalid input: no windows");
        assert!(!err.is_configuration());
    }

    #[test]
    fn io_display_and_source() {
        let err = HvsrError::io("/data/curves.json", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("/data/curves.json"), "got: {msg}");
        assert!(err.source().is_some(), "Io must expose I/O source");
    }

    #[test]
    fn parse_display() {
        let err = HvsrError::parse("curves.txt", "line 3: expected 4 columns");
        let msg = err.to_string();
        assert!(msg.contains("curves.txt"), "got: {msg}");
        assert!(msg.contains("line 3"), "got: {msg}");
        assert!(err.source().is_none());
    }
}
