//! Request-level errors and their HTTP mapping

use sfr_artifact::{ArtifactKind, InferenceError};
use sfr_features::TransformError;
use warp::http::StatusCode;

/// Failures that end a `/predict` request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Required artifacts were not loaded at startup
    #[error("Model artifacts not loaded: {}", names(.0))]
    ArtifactsUnavailable(Vec<ArtifactKind>),

    /// Fertilizer-type classifier failed
    #[error("Fertilizer type prediction failed: {0}")]
    Classifier(#[source] InferenceError),

    /// Quantity regressor failed or produced a non-finite value
    #[error("Fertilizer quantity prediction failed: {0}")]
    Regressor(#[source] InferenceError),

    /// Feature transform rejected the record
    #[error("Feature transform failed: {0}")]
    Transform(#[from] TransformError),
}

impl ServiceError {
    /// Status code sent to the client
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Stage label used in logs
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ArtifactsUnavailable(_) => "artifacts",
            Self::Classifier(_) => "classifier",
            Self::Regressor(_) => "regressor",
            Self::Transform(_) => "transform",
        }
    }
}

fn names(kinds: &[ArtifactKind]) -> String {
    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_names_every_missing_artifact() {
        let err = ServiceError::ArtifactsUnavailable(vec![ArtifactKind::Classifier, ArtifactKind::Regressor]);
        assert_eq!(err.to_string(), "Model artifacts not loaded: classifier, regressor");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn stage_in_detail() {
        let err = ServiceError::Regressor(InferenceError::NonFinite);
        assert!(err.to_string().starts_with("Fertilizer quantity prediction failed"));
        assert_eq!(err.stage(), "regressor");

        let err = ServiceError::Classifier(InferenceError::FeatureCountMismatch {
            expected: 17,
            actual: 16,
        });
        assert_eq!(
            err.to_string(),
            "Fertilizer type prediction failed: model expects 17 features, got 16"
        );
        assert_eq!(err.stage(), "classifier");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
