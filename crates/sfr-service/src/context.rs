//! Immutable per-process model context shared by every request

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use sfr_artifact::{ArtifactError, Classifier, ModelArtifactSet, NumericScaler, Regressor};
use sfr_features::{FeatureArtifacts, FeaturePipeline};

/// Loaded artifacts plus the transform pipeline
///
/// Built once at startup and shared behind an `Arc`; never mutated.
#[derive(Debug, Default)]
pub struct ServiceContext {
    artifacts: ModelArtifactSet,
    pipeline: FeaturePipeline,
}

/// Borrowed view of the artifacts `/predict` needs, all present
#[derive(Debug, Clone, Copy)]
pub struct ReadyModels<'a> {
    pub features: FeatureArtifacts<'a>,
    pub classifier: &'a Classifier,
    pub regressor: &'a Regressor,
    pub target_scaler: Option<&'a NumericScaler>,
}

impl ServiceContext {
    #[must_use]
    pub fn new(artifacts: ModelArtifactSet, pipeline: FeaturePipeline) -> Self {
        Self { artifacts, pipeline }
    }

    /// Load artifacts from the configured directory
    ///
    /// # Errors
    /// Returns error if a present artifact cannot be decoded or is inconsistent
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ArtifactError> {
        let artifacts = ModelArtifactSet::load(&config.artifact_dir)?;
        let ctx = Self::new(artifacts, FeaturePipeline::new(config.column_policy));
        tracing::info!(
            artifact_dir = %config.artifact_dir.display(),
            column_policy = %ctx.pipeline.policy(),
            ready = ctx.artifacts.missing_required().is_empty(),
            "Model context ready"
        );
        Ok(ctx)
    }

    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &ModelArtifactSet {
        &self.artifacts
    }

    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Required artifacts, or the list of those missing
    ///
    /// # Errors
    /// Returns [`ServiceError::ArtifactsUnavailable`] naming every missing artifact
    pub fn ready(&self) -> Result<ReadyModels<'_>, ServiceError> {
        let set = &self.artifacts;
        match (
            FeatureArtifacts::from_set(set),
            set.classifier.as_ref(),
            set.regressor.as_ref(),
        ) {
            (Some(features), Some(classifier), Some(regressor)) if features.scaler.is_some() => {
                Ok(ReadyModels {
                    features,
                    classifier: &classifier.value,
                    regressor: &regressor.value,
                    target_scaler: set.target_scaler.as_ref().map(|l| &l.value),
                })
            }
            _ => Err(ServiceError::ArtifactsUnavailable(set.missing_required())),
        }
    }
}
