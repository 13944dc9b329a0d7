//! Feature-transform pipeline
//!
//! Converts one [`InputRecord`] into one [`FeatureVector`]:
//! 1. encode categoricals with their column encoders (unseen → 0)
//! 2. append the derived nutrient-need features
//! 3. code any remaining text cells through the [`FallbackChain`]
//! 4. reconcile columns against the expected feature list
//! 5. rescale the columns the scaler was fit on
//!
//! Steps degrade instead of failing. The only hard failure is a missing
//! expected column under [`ColumnPolicy::Strict`].

use crate::error::TransformError;
use crate::record::{Cell, InputRecord, Row};
use crate::strategy::{CodingContext, FallbackChain};
use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};
use sfr_artifact::{CategoricalEncoders, FeatureColumns, ModelArtifactSet, NumericScaler};
use std::fmt;
use std::str::FromStr;

/// Added to the NPK ratio denominator so it never divides by zero
pub const NPK_EPSILON: f64 = 1e-6;

/// Derived feature columns, in the order they are appended
pub const DERIVED_COLUMNS: [&str; 4] = ["High_N_Need", "High_P_Need", "High_K_Need", "NPK_Ratio"];

/// What to do when an expected feature column is absent from the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Add the column with value 0
    #[default]
    ZeroFill,
    /// Fail the transform
    Strict,
}

impl FromStr for ColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero_fill" | "zero-fill" => Ok(Self::ZeroFill),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown column policy '{other}' (expected zero_fill or strict)")),
        }
    }
}

impl fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFill => f.write_str("zero_fill"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Artifacts the pipeline reads
#[derive(Debug, Clone, Copy)]
pub struct FeatureArtifacts<'a> {
    /// Expected feature columns
    pub columns: &'a FeatureColumns,
    /// Categorical encoders, if loaded
    pub encoders: Option<&'a CategoricalEncoders>,
    /// Numeric scaler, if loaded
    pub scaler: Option<&'a NumericScaler>,
}

impl<'a> FeatureArtifacts<'a> {
    /// Borrow from a loaded set; `None` without a feature-column list
    #[must_use]
    pub fn from_set(set: &'a ModelArtifactSet) -> Option<Self> {
        Some(Self {
            columns: &set.feature_columns.as_ref()?.value,
            encoders: set.encoders.as_ref().map(|l| &l.value),
            scaler: set.scaler.as_ref().map(|l| &l.value),
        })
    }
}

/// How the rescaling step ended
#[derive(Debug, Clone, PartialEq)]
pub enum Scaling {
    /// Scaler applied to this many columns
    Applied(usize),
    /// Scaler failed; values left unscaled
    Skipped(String),
    /// No scaler loaded
    Unavailable,
}

/// Degradations that happened during a transform
#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    /// Categorical columns whose value was unseen by its encoder
    pub unseen: Vec<String>,
    /// Residual text columns and the strategy that coded them
    pub fallback_coded: Vec<(String, Option<&'static str>)>,
    /// Expected columns added as 0
    pub zero_filled: Vec<String>,
    /// Row columns not in the expected list
    pub dropped: Vec<String>,
    /// Rescaling outcome
    pub scaling: Scaling,
}

/// Transform output
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    /// Model-ready features
    pub vector: FeatureVector,
    /// What degraded along the way
    pub report: TransformReport,
}

/// Deterministic record → feature-vector transform
#[derive(Debug, Default)]
pub struct FeaturePipeline {
    chain: FallbackChain,
    policy: ColumnPolicy,
}

impl FeaturePipeline {
    /// Create pipeline with the default fallback chain
    #[inline]
    #[must_use]
    pub fn new(policy: ColumnPolicy) -> Self {
        Self {
            chain: FallbackChain::with_defaults(),
            policy,
        }
    }

    /// Active column policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ColumnPolicy {
        self.policy
    }

    /// Run all five steps on one record
    ///
    /// # Errors
    /// Returns [`TransformError::MissingColumns`] only under
    /// [`ColumnPolicy::Strict`]
    pub fn transform(
        &self,
        record: &InputRecord,
        artifacts: &FeatureArtifacts<'_>,
    ) -> Result<TransformOutcome, TransformError> {
        let mut row = record.to_row();

        let unseen = encode_categoricals(&mut row, artifacts.encoders);
        add_derived_features(&mut row, record);
        let fallback_coded = code_residual_text(&mut row, &self.chain, artifacts.encoders);
        let (mut vector, zero_filled, dropped) = reconcile_columns(&row, artifacts.columns, self.policy)?;
        let scaling = rescale(&mut vector, artifacts.scaler);

        if !unseen.is_empty() {
            tracing::debug!("Unseen categories coded as 0: {:?}", unseen);
        }
        if !zero_filled.is_empty() {
            tracing::warn!("Expected feature columns zero-filled: {:?}", zero_filled);
        }
        if !dropped.is_empty() {
            tracing::debug!("Columns dropped during reconciliation: {:?}", dropped);
        }
        if let Scaling::Skipped(reason) = &scaling {
            tracing::warn!("Scaling skipped, using unscaled values: {}", reason);
        }

        Ok(TransformOutcome {
            vector,
            report: TransformReport {
                unseen,
                fallback_coded,
                zero_filled,
                dropped,
                scaling,
            },
        })
    }
}

/// Step 1: encode text cells that have a column encoder
///
/// Unseen values become 0. Returns the columns that hit an unseen value.
pub fn encode_categoricals(row: &mut Row, encoders: Option<&CategoricalEncoders>) -> Vec<String> {
    let Some(encoders) = encoders else {
        return Vec::new();
    };

    let mut unseen = Vec::new();
    for column in row.text_columns() {
        let Some(encoder) = encoders.column(&column) else {
            continue;
        };
        let Some(text) = row.get(&column).and_then(Cell::as_text) else {
            continue;
        };
        let code = encoder.transform(text).unwrap_or_else(|_| {
            unseen.push(column.clone());
            0
        });
        row.insert(column, Cell::Number(code as f64));
    }
    unseen
}

/// Step 2: append the nutrient-need indicators and the NPK ratio
///
/// Always computed from the record's raw numeric fields.
pub fn add_derived_features(row: &mut Row, record: &InputRecord) {
    let n = record.nitrogen_level;
    let p = record.phosphorus_level;
    let k = record.potassium_level;

    row.insert("High_N_Need", Cell::Number(indicator(n < 100.0)));
    row.insert("High_P_Need", Cell::Number(indicator(p < 30.0)));
    row.insert("High_K_Need", Cell::Number(indicator(k < 100.0)));
    row.insert("NPK_Ratio", Cell::Number(npk_ratio(n, p, k)));
}

/// `n / (p + k + ε)`
#[inline]
#[must_use]
pub fn npk_ratio(nitrogen: f64, phosphorus: f64, potassium: f64) -> f64 {
    nitrogen / (phosphorus + potassium + NPK_EPSILON)
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Step 3: code every remaining text cell through the fallback chain
pub fn code_residual_text(
    row: &mut Row,
    chain: &FallbackChain,
    encoders: Option<&CategoricalEncoders>,
) -> Vec<(String, Option<&'static str>)> {
    let mut coded = Vec::new();
    for column in row.text_columns() {
        let Some(value) = row.get(&column).and_then(Cell::as_text).map(str::to_owned) else {
            continue;
        };
        let column_values = [value.as_str()];
        let resolution = chain.resolve(&CodingContext {
            column: &column,
            value: &value,
            column_values: &column_values,
            encoders,
        });
        row.insert(column.clone(), Cell::Number(resolution.code));
        coded.push((column, resolution.strategy));
    }
    coded
}

/// Step 4: align the row with the expected feature list
///
/// Returns the vector, the zero-filled columns and the dropped columns.
///
/// # Errors
/// Returns [`TransformError::MissingColumns`] under [`ColumnPolicy::Strict`]
pub fn reconcile_columns(
    row: &Row,
    expected: &FeatureColumns,
    policy: ColumnPolicy,
) -> Result<(FeatureVector, Vec<String>, Vec<String>), TransformError> {
    let mut zero_filled = Vec::new();
    let mut values = Vec::with_capacity(expected.len());

    for name in expected.names() {
        match row.get(name) {
            Some(Cell::Number(v)) => values.push(*v),
            // Step 3 codes every text cell, so this only happens if it was skipped.
            Some(Cell::Text(_)) => values.push(0.0),
            None => {
                zero_filled.push(name.clone());
                values.push(0.0);
            }
        }
    }

    if policy == ColumnPolicy::Strict && !zero_filled.is_empty() {
        return Err(TransformError::MissingColumns(zero_filled));
    }

    let dropped = row
        .columns()
        .filter(|c| !expected.names().iter().any(|e| e == c))
        .map(str::to_owned)
        .collect();

    let vector = FeatureVector {
        columns: expected.names().to_vec(),
        values,
    };
    Ok((vector, zero_filled, dropped))
}

/// Step 5: rescale fitted columns, falling back to unscaled values
pub fn rescale(vector: &mut FeatureVector, scaler: Option<&NumericScaler>) -> Scaling {
    let Some(scaler) = scaler else {
        return Scaling::Unavailable;
    };
    match scaler.transform_columns(&vector.columns, &mut vector.values) {
        Ok(n) => Scaling::Applied(n),
        Err(e) => Scaling::Skipped(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use sfr_artifact::LabelEncoder;

    fn record() -> InputRecord {
        InputRecord {
            crop_type: "Rice".into(),
            region: "Tamil Nadu".into(),
            soil_type: "Loamy".into(),
            soil_ph: 6.5,
            nitrogen_level: 120.0,
            phosphorus_level: 40.0,
            potassium_level: 180.0,
            organic_carbon: 1.2,
            moisture_content: 25.0,
            rainfall_mm: 600.0,
            temperature_c: 30.0,
            plant_age_weeks: 8,
            application_timing: "Before sowing".into(),
        }
    }

    fn crop_encoders() -> CategoricalEncoders {
        let mut encoders = IndexMap::new();
        encoders.insert("Crop_Type".to_string(), LabelEncoder::new(["Maize", "Rice", "Wheat"]));
        CategoricalEncoders::Columns { encoders }
    }

    #[test]
    fn derived_features_for_rich_soil() {
        let mut row = Row::default();
        add_derived_features(&mut row, &record());

        assert_eq!(row.get("High_N_Need"), Some(&Cell::Number(0.0)));
        assert_eq!(row.get("High_P_Need"), Some(&Cell::Number(0.0)));
        assert_eq!(row.get("High_K_Need"), Some(&Cell::Number(0.0)));
        let ratio = row.get("NPK_Ratio").and_then(Cell::as_number).unwrap();
        assert!((ratio - 120.0 / 220.000_001).abs() < 1e-12);
        assert_eq!(format!("{ratio:.3}"), "0.545");
    }

    #[test]
    fn derived_features_for_poor_soil() {
        let mut r = record();
        r.nitrogen_level = 99.9;
        r.phosphorus_level = 0.0;
        r.potassium_level = 0.0;
        let mut row = Row::default();
        add_derived_features(&mut row, &r);

        assert_eq!(row.get("High_N_Need"), Some(&Cell::Number(1.0)));
        assert_eq!(row.get("High_P_Need"), Some(&Cell::Number(1.0)));
        assert_eq!(row.get("High_K_Need"), Some(&Cell::Number(1.0)));
        assert!(row.get("NPK_Ratio").and_then(Cell::as_number).unwrap().is_finite());
    }

    #[test]
    fn unseen_category_codes_to_zero() {
        let mut r = record();
        r.crop_type = "Barley".into();
        let mut row = r.to_row();

        let unseen = encode_categoricals(&mut row, Some(&crop_encoders()));

        assert_eq!(unseen, vec!["Crop_Type".to_string()]);
        assert_eq!(row.get("Crop_Type"), Some(&Cell::Number(0.0)));
        // Columns without an encoder are left for step 3.
        assert!(row.get("Region").and_then(Cell::as_text).is_some());
    }

    #[test]
    fn residual_text_is_fully_coded() {
        let mut row = record().to_row();
        encode_categoricals(&mut row, Some(&crop_encoders()));
        let coded = code_residual_text(&mut row, &FallbackChain::with_defaults(), Some(&crop_encoders()));

        assert_eq!(coded.len(), 3);
        assert!(coded.iter().all(|(_, s)| *s == Some("first_seen")));
        assert!(row.text_columns().is_empty());
    }

    #[test]
    fn reconcile_orders_fills_and_drops() {
        let mut row = Row::default();
        row.insert("b", Cell::Number(2.0));
        row.insert("extra", Cell::Number(9.0));
        row.insert("a", Cell::Number(1.0));
        let expected = FeatureColumns::new(["a", "b", "c"]);

        let (vector, zero_filled, dropped) = reconcile_columns(&row, &expected, ColumnPolicy::ZeroFill).unwrap();

        assert_eq!(vector.columns(), expected.names());
        assert_eq!(vector.values(), &[1.0, 2.0, 0.0]);
        assert_eq!(zero_filled, vec!["c".to_string()]);
        assert_eq!(dropped, vec!["extra".to_string()]);
    }

    #[test]
    fn strict_policy_rejects_missing_columns() {
        let row = Row::default();
        let expected = FeatureColumns::new(["a"]);

        let err = reconcile_columns(&row, &expected, ColumnPolicy::Strict).unwrap_err();
        assert_eq!(err, TransformError::MissingColumns(vec!["a".to_string()]));
    }

    #[test]
    fn failed_scaling_keeps_unscaled_values() {
        let mut vector = FeatureVector {
            columns: vec!["Soil_pH".into()],
            values: vec![6.5],
        };
        let scaler = NumericScaler::Standard {
            feature_names: vec!["Soil_pH".into(), "Unknown".into()],
            mean: vec![6.0, 0.0],
            scale: vec![1.0, 1.0],
        };

        let scaling = rescale(&mut vector, Some(&scaler));

        assert!(matches!(scaling, Scaling::Skipped(_)));
        assert_eq!(vector.values(), &[6.5]);
    }

    #[test]
    fn unnamed_scaler_is_skipped() {
        let mut vector = FeatureVector {
            columns: vec!["Soil_pH".into()],
            values: vec![6.5],
        };
        let scaler = NumericScaler::Standard {
            feature_names: Vec::new(),
            mean: vec![6.0],
            scale: vec![0.5],
        };

        let scaling = rescale(&mut vector, Some(&scaler));

        assert!(matches!(scaling, Scaling::Skipped(_)), "{scaling:?}");
        assert_eq!(vector.values(), &[6.5]);
    }

    #[test]
    fn column_policy_parses() {
        assert_eq!("strict".parse::<ColumnPolicy>(), Ok(ColumnPolicy::Strict));
        assert_eq!("zero-fill".parse::<ColumnPolicy>(), Ok(ColumnPolicy::ZeroFill));
        assert!("lenient".parse::<ColumnPolicy>().is_err());
        assert_eq!(ColumnPolicy::default().to_string(), "zero_fill");
    }
}
