//! Numeric scalers
//!
//! [`NumericScaler`] mirrors the two scikit-learn scalers the training side
//! exports. It is used both for feature rescaling (fit on named columns) and
//! as the optional target rescaler (fit on a single unnamed column).

use crate::error::ScaleError;
use serde::{Deserialize, Serialize};

/// Fitted numeric scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericScaler {
    /// `(x - mean) / scale`
    Standard {
        /// Columns the scaler was fit on, in fit order
        #[serde(default)]
        feature_names: Vec<String>,
        /// Per-column mean
        mean: Vec<f64>,
        /// Per-column standard deviation
        scale: Vec<f64>,
    },

    /// `x * scale + min`
    MinMax {
        /// Columns the scaler was fit on, in fit order
        #[serde(default)]
        feature_names: Vec<String>,
        /// Per-column additive offset
        min: Vec<f64>,
        /// Per-column multiplicative factor
        scale: Vec<f64>,
    },
}

impl NumericScaler {
    /// Columns the scaler was fit on
    #[inline]
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                feature_names
            }
        }
    }

    /// Number of fitted columns
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// Check that all parameter vectors agree in length
    ///
    /// # Errors
    /// Returns [`ScaleError::ShapeMismatch`] on inconsistent parameters
    pub fn validate(&self) -> Result<(), ScaleError> {
        let (offset, scale) = self.params();
        let names = self.feature_names().len();
        if offset.len() != scale.len() || (names != 0 && names != offset.len()) {
            return Err(ScaleError::ShapeMismatch {
                names,
                params: offset.len().max(scale.len()),
            });
        }
        Ok(())
    }

    /// Rescale the named columns in place
    ///
    /// Columns the scaler was not fit on are left untouched. Either every
    /// fitted column is rescaled or `values` is left unchanged.
    ///
    /// # Errors
    /// Returns error if parameters are inconsistent, the scaler carries no
    /// column names, a fitted column is absent from `columns`, or a result is
    /// not finite
    pub fn transform_columns(&self, columns: &[String], values: &mut [f64]) -> Result<usize, ScaleError> {
        self.validate()?;
        if self.feature_names().is_empty() && self.width() > 0 {
            return Err(ScaleError::Unnamed);
        }
        let mut scaled = values.to_vec();

        for (i, name) in self.feature_names().iter().enumerate() {
            let pos = columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ScaleError::MissingColumn(name.clone()))?;
            let out = self.forward(i, scaled[pos]);
            if !out.is_finite() {
                return Err(ScaleError::NonFinite(name.clone()));
            }
            scaled[pos] = out;
        }

        values.copy_from_slice(&scaled);
        Ok(self.feature_names().len())
    }

    /// Undo the transform for a single-column scaler
    ///
    /// # Errors
    /// Returns error if the scaler is not single-column or the result is not finite
    pub fn inverse_single(&self, value: f64) -> Result<f64, ScaleError> {
        self.validate()?;
        if self.width() != 1 {
            return Err(ScaleError::ShapeMismatch {
                names: self.feature_names().len(),
                params: self.width(),
            });
        }
        let out = self.inverse(0, value);
        if out.is_finite() {
            Ok(out)
        } else {
            Err(ScaleError::NonFinite("target".to_string()))
        }
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            Self::Standard { mean, scale, .. } => (mean, scale),
            Self::MinMax { min, scale, .. } => (min, scale),
        }
    }

    fn forward(&self, i: usize, x: f64) -> f64 {
        match self {
            Self::Standard { mean, scale, .. } => (x - mean[i]) / nonzero(scale[i]),
            Self::MinMax { min, scale, .. } => x * scale[i] + min[i],
        }
    }

    fn inverse(&self, i: usize, y: f64) -> f64 {
        match self {
            Self::Standard { mean, scale, .. } => y * nonzero(scale[i]) + mean[i],
            Self::MinMax { min, scale, .. } => (y - min[i]) / nonzero(scale[i]),
        }
    }
}

// Constant columns are fit with scale 0; treat them as unit scale.
fn nonzero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    fn standard() -> NumericScaler {
        NumericScaler::Standard {
            feature_names: names(&["Soil_pH", "Rainfall_mm"]),
            mean: vec![6.0, 500.0],
            scale: vec![0.5, 100.0],
        }
    }

    #[test]
    fn standard_transform_only_fitted_columns() {
        let columns = names(&["Crop_Type", "Soil_pH", "Rainfall_mm"]);
        let mut values = vec![3.0, 6.5, 600.0];

        let n = standard().transform_columns(&columns, &mut values).unwrap();

        assert_eq!(n, 2);
        assert_eq!(values, vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_fitted_column_leaves_values_untouched() {
        let columns = names(&["Soil_pH"]);
        let mut values = vec![6.5];

        let err = standard().transform_columns(&columns, &mut values).unwrap_err();

        assert_eq!(err, ScaleError::MissingColumn("Rainfall_mm".to_string()));
        assert_eq!(values, vec![6.5]);
    }

    #[test]
    fn zero_scale_is_unit() {
        let scaler = NumericScaler::Standard {
            feature_names: names(&["Plant_Age_Weeks"]),
            mean: vec![8.0],
            scale: vec![0.0],
        };
        let mut values = vec![10.0];
        scaler.transform_columns(&names(&["Plant_Age_Weeks"]), &mut values).unwrap();
        assert_eq!(values, vec![2.0]);
    }

    #[test]
    fn shape_mismatch_detected() {
        let scaler = NumericScaler::MinMax {
            feature_names: names(&["a", "b"]),
            min: vec![0.0],
            scale: vec![1.0],
        };
        assert!(matches!(scaler.validate(), Err(ScaleError::ShapeMismatch { .. })));
    }

    #[test]
    fn unnamed_scaler_does_not_transform() {
        let scaler = NumericScaler::Standard {
            feature_names: Vec::new(),
            mean: vec![6.0],
            scale: vec![0.5],
        };
        let mut values = vec![6.5];

        let err = scaler.transform_columns(&names(&["Soil_pH"]), &mut values).unwrap_err();

        assert_eq!(err, ScaleError::Unnamed);
        assert_eq!(values, vec![6.5]);
    }

    #[test]
    fn min_max_inverse_single() {
        let scaler = NumericScaler::MinMax {
            feature_names: Vec::new(),
            min: vec![-0.5],
            scale: vec![0.01],
        };
        let y = scaler.inverse_single(0.5).unwrap();
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_single_rejects_multi_column() {
        assert!(standard().inverse_single(1.0).is_err());
    }

    #[test]
    fn decode_from_json() {
        let json = r#"{"kind": "standard", "mean": [120.0], "scale": [30.0]}"#;
        let scaler: NumericScaler = serde_json::from_str(json).unwrap();
        assert!(scaler.feature_names().is_empty());
        assert_eq!(scaler.inverse_single(1.0).unwrap(), 150.0);
    }
}
