//! Artifact loading
//!
//! Each logical artifact has an ordered list of candidate filenames. The
//! first candidate present in the artifact directory is decoded and the rest
//! are ignored. A present-but-undecodable file is a hard error; an artifact
//! with no present candidate is simply absent.

use crate::encoder::{CategoricalEncoders, LabelEncoder};
use crate::error::ArtifactError;
use crate::fingerprint::Fingerprint;
use crate::model::{Classifier, Regressor};
use crate::scaler::NumericScaler;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Logical artifacts the service loads at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Numeric feature scaler
    Scaler,
    /// Target-value rescaler
    TargetScaler,
    /// Categorical label encoders
    LabelEncoders,
    /// Fertilizer-type label decoder
    LabelDecoder,
    /// Fertilizer-type classifier
    Classifier,
    /// Fertilizer-quantity regressor
    Regressor,
    /// Expected feature-column list
    FeatureColumns,
}

impl ArtifactKind {
    /// All artifacts in load order
    pub const ALL: [Self; 7] = [
        Self::Scaler,
        Self::TargetScaler,
        Self::LabelEncoders,
        Self::LabelDecoder,
        Self::Classifier,
        Self::Regressor,
        Self::FeatureColumns,
    ];

    /// Stable name used in logs and error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scaler => "scaler",
            Self::TargetScaler => "target_scaler",
            Self::LabelEncoders => "label_encoders",
            Self::LabelDecoder => "label_decoder",
            Self::Classifier => "classifier",
            Self::Regressor => "regressor",
            Self::FeatureColumns => "feature_columns",
        }
    }

    /// Candidate filenames, highest priority first
    #[must_use]
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Scaler => &["scaler.json", "scaler.yaml", "numeric_scaler.json"],
            Self::TargetScaler => &["y_scaler.json", "target_scaler.json", "y_scaler.yaml"],
            Self::LabelEncoders => &["label_encoders.json", "encoders.json", "label_encoders.yaml"],
            Self::LabelDecoder => &[
                "fertilizer_label_encoder.json",
                "label_decoder.json",
                "fertilizer_label_encoder.yaml",
            ],
            Self::Classifier => &[
                "fertilizer_type_model.json",
                "classifier.json",
                "fertilizer_type_model.yaml",
            ],
            Self::Regressor => &[
                "fertilizer_quantity_model.json",
                "regressor.json",
                "fertilizer_quantity_model.yaml",
            ],
            Self::FeatureColumns => &["feature_columns.json", "final_features.json", "feature_columns.yaml"],
        }
    }

    /// Whether predictions are impossible without this artifact
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(
            self,
            Self::Scaler | Self::Classifier | Self::Regressor | Self::FeatureColumns
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered column names the models were trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureColumns(Vec<String>);

impl FeatureColumns {
    /// Create from column names
    #[inline]
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }

    /// Column names in order
    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject empty lists and duplicate names
    ///
    /// # Errors
    /// Returns [`ArtifactError::Invalid`] for an unusable list
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.0.is_empty() {
            return Err(ArtifactError::invalid("feature_columns", "list is empty"));
        }
        let mut seen = HashSet::new();
        for name in &self.0 {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::invalid(
                    "feature_columns",
                    format!("duplicate column '{name}'"),
                ));
            }
        }
        Ok(())
    }
}

/// A decoded artifact with its provenance
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Decoded value
    pub value: T,
    /// File it was read from
    pub path: PathBuf,
    /// Digest of the file bytes
    pub fingerprint: Fingerprint,
}

impl<T> Loaded<T> {
    /// Wrap an already-decoded value
    #[inline]
    #[must_use]
    pub fn new(value: T, path: impl Into<PathBuf>, fingerprint: Fingerprint) -> Self {
        Self {
            value,
            path: path.into(),
            fingerprint,
        }
    }
}

/// Load one artifact by trying its candidates in priority order
///
/// # Returns
/// - `Ok(Some(_))` for the first candidate that exists
/// - `Ok(None)` when no candidate exists
///
/// # Errors
/// Returns error if the first existing candidate cannot be read or decoded
pub fn load_artifact<T: DeserializeOwned>(
    dir: &Path,
    kind: ArtifactKind,
) -> Result<Option<Loaded<T>>, ArtifactError> {
    let Some(path) = resolve(dir, kind.candidates()) else {
        tracing::debug!("No candidate found for {} in {}", kind, dir.display());
        return Ok(None);
    };

    let bytes = std::fs::read(&path).map_err(|e| ArtifactError::io_error(kind.name(), &path, e))?;
    let value = decode(kind.name(), &path, &bytes)?;
    let fingerprint = Fingerprint::compute(&bytes);

    tracing::info!(
        artifact = kind.name(),
        path = %path.display(),
        fingerprint = %fingerprint.short(),
        "Loaded artifact"
    );
    Ok(Some(Loaded::new(value, path, fingerprint)))
}

/// First candidate that exists as a file under `dir`
#[must_use]
pub fn resolve(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn decode<T: DeserializeOwned>(artifact: &'static str, path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_slice(bytes).map_err(|e| ArtifactError::decode(artifact, path, e)),
        Some("yaml" | "yml") => serde_yaml::from_slice(bytes).map_err(|e| ArtifactError::decode(artifact, path, e)),
        _ => Err(ArtifactError::UnsupportedFormat {
            artifact,
            path: path.to_path_buf(),
        }),
    }
}

/// Load-once, read-only set of every artifact the service uses
#[derive(Debug, Clone, Default)]
pub struct ModelArtifactSet {
    /// Numeric feature scaler
    pub scaler: Option<Loaded<NumericScaler>>,
    /// Target-value rescaler
    pub target_scaler: Option<Loaded<NumericScaler>>,
    /// Categorical encoders
    pub encoders: Option<Loaded<CategoricalEncoders>>,
    /// Fertilizer-type label decoder
    pub label_decoder: Option<Loaded<LabelEncoder>>,
    /// Fertilizer-type classifier
    pub classifier: Option<Loaded<Classifier>>,
    /// Fertilizer-quantity regressor
    pub regressor: Option<Loaded<Regressor>>,
    /// Expected feature columns
    pub feature_columns: Option<Loaded<FeatureColumns>>,
}

impl ModelArtifactSet {
    /// Load every artifact from `dir`
    ///
    /// A missing directory yields an empty set; missing required artifacts
    /// are reported by [`Self::missing_required`], not here.
    ///
    /// # Errors
    /// Returns the first read/decode error or structural defect
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        if !dir.is_dir() {
            tracing::warn!("Artifact directory {} does not exist", dir.display());
        }

        let set = Self {
            scaler: load_artifact(dir, ArtifactKind::Scaler)?,
            target_scaler: load_artifact(dir, ArtifactKind::TargetScaler)?,
            encoders: load_artifact(dir, ArtifactKind::LabelEncoders)?,
            label_decoder: load_artifact(dir, ArtifactKind::LabelDecoder)?,
            classifier: load_artifact(dir, ArtifactKind::Classifier)?,
            regressor: load_artifact(dir, ArtifactKind::Regressor)?,
            feature_columns: load_artifact(dir, ArtifactKind::FeatureColumns)?,
        };
        set.validate()?;

        for kind in set.missing_required() {
            tracing::warn!("Required artifact {} is missing; /predict will be unavailable", kind);
        }
        Ok(set)
    }

    /// Check that the present artifacts are consistent with each other
    ///
    /// # Errors
    /// Returns [`ArtifactError::Invalid`] describing the first defect
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if let Some(scaler) = &self.scaler {
            scaler
                .value
                .validate()
                .map_err(|e| ArtifactError::invalid("scaler", e.to_string()))?;
            if scaler.value.feature_names().is_empty() {
                return Err(ArtifactError::invalid(
                    "scaler",
                    "feature_names must list the columns the scaler was fit on",
                ));
            }
        }
        if let Some(target) = &self.target_scaler {
            target
                .value
                .validate()
                .map_err(|e| ArtifactError::invalid("target_scaler", e.to_string()))?;
            if target.value.width() != 1 {
                return Err(ArtifactError::invalid("target_scaler", "must be fit on exactly one column"));
            }
        }

        let Some(columns) = &self.feature_columns else {
            return Ok(());
        };
        columns.value.validate()?;
        if let Some(clf) = &self.classifier {
            clf.value.validate(columns.value.len())?;
        }
        if let Some(reg) = &self.regressor {
            reg.value.validate(columns.value.len())?;
        }
        Ok(())
    }

    /// Required artifacts that were not found
    #[must_use]
    pub fn missing_required(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required() && !self.is_present(*kind))
            .collect()
    }

    /// Whether an artifact was loaded
    #[must_use]
    pub fn is_present(&self, kind: ArtifactKind) -> bool {
        self.status(kind).is_some()
    }

    /// Path and fingerprint of a loaded artifact
    #[must_use]
    pub fn status(&self, kind: ArtifactKind) -> Option<(&Path, Fingerprint)> {
        fn info<T>(loaded: Option<&Loaded<T>>) -> Option<(&Path, Fingerprint)> {
            loaded.map(|l| (l.path.as_path(), l.fingerprint))
        }

        match kind {
            ArtifactKind::Scaler => info(self.scaler.as_ref()),
            ArtifactKind::TargetScaler => info(self.target_scaler.as_ref()),
            ArtifactKind::LabelEncoders => info(self.encoders.as_ref()),
            ArtifactKind::LabelDecoder => info(self.label_decoder.as_ref()),
            ArtifactKind::Classifier => info(self.classifier.as_ref()),
            ArtifactKind::Regressor => info(self.regressor.as_ref()),
            ArtifactKind::FeatureColumns => info(self.feature_columns.as_ref()),
        }
    }

    /// Encoder able to turn classifier codes back into fertilizer names
    ///
    /// The dedicated decoder wins; a target-shaped label-encoder artifact is
    /// the fallback.
    #[must_use]
    pub fn fertilizer_decoder(&self) -> Option<&LabelEncoder> {
        self.label_decoder
            .as_ref()
            .map(|l| &l.value)
            .or_else(|| self.encoders.as_ref().and_then(|l| l.value.target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_existing_candidate_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("final_features.json"), r#"["b"]"#).unwrap();
        fs::write(dir.path().join("feature_columns.yaml"), "- a\n").unwrap();

        let loaded: Loaded<FeatureColumns> = load_artifact(dir.path(), ArtifactKind::FeatureColumns)
            .unwrap()
            .unwrap();

        assert_eq!(loaded.value.names(), ["b".to_string()]);
        assert!(loaded.path.ends_with("final_features.json"));
    }

    #[test]
    fn yaml_candidate_is_decoded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("feature_columns.yaml"), "- Soil_pH\n- NPK_Ratio\n").unwrap();

        let loaded: Loaded<FeatureColumns> = load_artifact(dir.path(), ArtifactKind::FeatureColumns)
            .unwrap()
            .unwrap();

        assert_eq!(loaded.value.len(), 2);
    }

    #[test]
    fn absent_artifact_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Loaded<NumericScaler>> = load_artifact(dir.path(), ArtifactKind::TargetScaler).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_artifact_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scaler.json"), "{not json").unwrap();

        let err = load_artifact::<NumericScaler>(dir.path(), ArtifactKind::Scaler).unwrap_err();
        assert!(matches!(err, ArtifactError::Decode { artifact: "scaler", .. }));
    }

    #[test]
    fn missing_directory_reports_required() {
        let set = ModelArtifactSet::load(Path::new("/nonexistent/sfr-models")).unwrap();
        assert_eq!(
            set.missing_required(),
            vec![
                ArtifactKind::Scaler,
                ArtifactKind::Classifier,
                ArtifactKind::Regressor,
                ArtifactKind::FeatureColumns,
            ]
        );
    }

    #[test]
    fn feature_scaler_without_names_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("scaler.json"),
            r#"{"kind": "standard", "mean": [6.0], "scale": [0.5]}"#,
        )
        .unwrap();

        let err = ModelArtifactSet::load(dir.path()).unwrap_err();

        assert!(matches!(err, ArtifactError::Invalid { artifact: "scaler", .. }), "{err:?}");
        assert!(err.to_string().contains("feature_names"));
    }

    #[test]
    fn duplicate_feature_columns_rejected() {
        let columns = FeatureColumns::new(["a", "b", "a"]);
        assert!(columns.validate().is_err());
    }

    #[test]
    fn decoder_falls_back_to_target_encoder() {
        let encoders = CategoricalEncoders::Target {
            encoder: LabelEncoder::new(["DAP", "Urea"]),
        };
        let set = ModelArtifactSet {
            encoders: Some(Loaded::new(encoders, "mem", Fingerprint::compute(b"enc"))),
            ..Default::default()
        };
        assert_eq!(set.fertilizer_decoder().unwrap().inverse_transform(0), Ok("DAP"));
    }

    #[test]
    fn candidates_are_unique_per_kind() {
        for kind in ArtifactKind::ALL {
            let names: HashSet<_> = kind.candidates().iter().collect();
            assert_eq!(names.len(), kind.candidates().len(), "{kind}");
        }
    }
}
