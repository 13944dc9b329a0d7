//! Error types for the artifact layer
//!
//! Provides error handling for:
//! - Artifact loading (file → typed artifact)
//! - Categorical encoding and numeric scaling
//! - Model inference

use std::path::PathBuf;

/// Errors while reading or decoding an artifact file
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// IO error during file read
    #[error("io error reading {artifact} artifact at {path}: {source}")]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but its content does not match the artifact schema
    #[error("failed to decode {artifact} artifact at {path}: {message}")]
    Decode {
        artifact: &'static str,
        path: PathBuf,
        message: String,
    },

    /// No decoder for the file extension
    #[error("unsupported format for {artifact} artifact at {path}")]
    UnsupportedFormat {
        artifact: &'static str,
        path: PathBuf,
    },

    /// Decoded artifact is structurally inconsistent
    #[error("invalid {artifact} artifact: {message}")]
    Invalid {
        artifact: &'static str,
        message: String,
    },
}

impl ArtifactError {
    /// Create IO error for path
    pub fn io_error(artifact: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            artifact,
            path: path.into(),
            source,
        }
    }

    /// Create decode error for path
    pub fn decode(artifact: &'static str, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            artifact,
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create structural validation error
    pub fn invalid(artifact: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            message: message.into(),
        }
    }
}

/// Errors from a label encoder
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// Value was not seen when the encoder was fit
    #[error("unseen label: '{0}'")]
    Unseen(String),

    /// Code outside the encoder's class range
    #[error("code {code} out of range for {classes} classes")]
    OutOfRange { code: i64, classes: usize },
}

/// Errors from a numeric scaler
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    /// Scaler parameter vectors disagree in length
    #[error("scaler parameters have mismatched lengths: {names} names, {params} parameters")]
    ShapeMismatch { names: usize, params: usize },

    /// Feature scaler without column names; its columns cannot be located
    #[error("scaler has no feature_names, fitted columns are unknown")]
    Unnamed,

    /// A column the scaler was fit on is absent from the input
    #[error("column '{0}' required by the scaler is missing")]
    MissingColumn(String),

    /// Transform produced NaN or infinity
    #[error("scaling produced a non-finite value for column '{0}'")]
    NonFinite(String),
}

/// Errors during model inference
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// Input width does not match what the model was trained on
    #[error("model expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// Tree structure cannot be traversed
    #[error("malformed tree {tree}: {message}")]
    MalformedTree { tree: usize, message: String },

    /// Model has nothing to evaluate
    #[error("model has no {0}")]
    EmptyModel(&'static str),

    /// Prediction produced NaN or infinity
    #[error("model produced a non-finite output")]
    NonFinite,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn artifact_error_display() {
        let err = ArtifactError::decode("classifier", "models/classifier.json", "expected value");
        assert_eq!(
            err.to_string(),
            "failed to decode classifier artifact at models/classifier.json: expected value"
        );
    }

    #[test]
    fn inference_error_display() {
        let err = InferenceError::FeatureCountMismatch {
            expected: 17,
            actual: 3,
        };
        assert_eq!(err.to_string(), "model expects 17 features, got 3");
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::Unseen("Barley".to_string());
        assert!(err.to_string().contains("Barley"));
    }
}
