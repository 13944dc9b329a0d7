//! Categorical encoders
//!
//! - [`LabelEncoder`]: string label ↔ integer code, codes being positions in
//!   the fitted class list
//! - [`CategoricalEncoders`]: the label-encoder artifact, either one encoder
//!   per feature column or a single encoder for the fertilizer target

use crate::error::EncodeError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maps each fitted class label to its position in `classes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelEncoder {
    /// Fitted class labels; the code of a label is its index
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Create encoder from class labels
    #[inline]
    #[must_use]
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode a label
    ///
    /// # Errors
    /// Returns [`EncodeError::Unseen`] if the label was not fitted
    pub fn transform(&self, label: &str) -> Result<i64, EncodeError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| i as i64)
            .ok_or_else(|| EncodeError::Unseen(label.to_string()))
    }

    /// Decode a code back to its label
    ///
    /// # Errors
    /// Returns [`EncodeError::OutOfRange`] for negative or too-large codes
    pub fn inverse_transform(&self, code: i64) -> Result<&str, EncodeError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .ok_or(EncodeError::OutOfRange {
                code,
                classes: self.classes.len(),
            })
    }

    /// Number of fitted classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if encoder has no classes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Label-encoder artifact shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoricalEncoders {
    /// One encoder per categorical feature column
    Columns {
        /// Column name → encoder
        encoders: IndexMap<String, LabelEncoder>,
    },

    /// A single encoder fit on the fertilizer-type target
    Target {
        /// Target encoder
        encoder: LabelEncoder,
    },
}

impl CategoricalEncoders {
    /// Encoder for a feature column, if this artifact carries per-column encoders
    #[inline]
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&LabelEncoder> {
        match self {
            Self::Columns { encoders } => encoders.get(name),
            Self::Target { .. } => None,
        }
    }

    /// The target encoder, if this artifact is target-shaped
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&LabelEncoder> {
        match self {
            Self::Target { encoder } => Some(encoder),
            Self::Columns { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn fertilizers() -> LabelEncoder {
        LabelEncoder::new(["DAP", "MOP", "NPK 10-26-26", "Urea"])
    }

    #[test]
    fn transform_known_label() {
        assert_eq!(fertilizers().transform("MOP"), Ok(1));
    }

    #[test]
    fn transform_unseen_label() {
        let err = fertilizers().transform("Compost").unwrap_err();
        assert_eq!(err, EncodeError::Unseen("Compost".to_string()));
    }

    #[test]
    fn inverse_out_of_range() {
        let enc = fertilizers();
        assert!(matches!(
            enc.inverse_transform(4),
            Err(EncodeError::OutOfRange { code: 4, classes: 4 })
        ));
        assert!(enc.inverse_transform(-1).is_err());
    }

    #[test]
    fn columns_shape_from_json() {
        let json = r#"{
            "kind": "columns",
            "encoders": {
                "Crop_Type": {"classes": ["Maize", "Rice"]},
                "Region": {"classes": ["Kerala"]}
            }
        }"#;
        let encoders: CategoricalEncoders = serde_json::from_str(json).unwrap();
        assert_eq!(encoders.column("Crop_Type").unwrap().transform("Rice"), Ok(1));
        assert!(encoders.target().is_none());
        assert_eq!(encoders.column("Region").unwrap().transform("Kerala"), Ok(0));
    }

    #[test]
    fn target_shape_from_json() {
        let json = r#"{"kind": "target", "encoder": {"classes": ["DAP", "Urea"]}}"#;
        let encoders: CategoricalEncoders = serde_json::from_str(json).unwrap();
        assert!(encoders.column("Crop_Type").is_none());
        assert_eq!(encoders.target().unwrap().inverse_transform(1), Ok("Urea"));
    }

    proptest! {
        #[test]
        fn prop_encode_then_decode_returns_label(
            classes in prop::collection::hash_set("[A-Za-z0-9 -]{1,12}", 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let classes: Vec<String> = classes.into_iter().collect();
            let label = pick.get(&classes).clone();
            let enc = LabelEncoder::new(classes);

            let code = enc.transform(&label).unwrap();
            prop_assert_eq!(enc.inverse_transform(code).unwrap(), label.as_str());
        }
    }
}
