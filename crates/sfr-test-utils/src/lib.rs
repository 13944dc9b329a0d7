//! Testing utilities for the SFR workspace
//!
//! Shared fixtures: a sample record, a small deterministic model set, and
//! [`ArtifactFixture`] for writing artifact directories to disk.
//!
//! For [`sample_record`] the complete fixture set predicts `"NPK"` with a
//! quantity of `122.0` kg/acre (raw regressor output `0.55`).

#![allow(missing_docs)]

use indexmap::IndexMap;
use serde::Serialize;
use sfr_artifact::{
    CategoricalEncoders, ClassLabel, Classifier, FeatureColumns, LabelEncoder, ModelArtifactSet,
    NumericScaler, Regressor, Tree, TreeNode,
};
use sfr_features::{InputRecord, DERIVED_COLUMNS};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Fertilizer name predicted for [`sample_record`]
pub const SAMPLE_FERTILIZER: &str = "NPK";

/// Quantity predicted for [`sample_record`] with the target scaler present
pub const SAMPLE_QUANTITY: f64 = 122.0;

/// Raw regressor output for [`sample_record`] (no target scaler)
pub const SAMPLE_RAW_QUANTITY: f64 = 0.55;

pub fn sample_record() -> InputRecord {
    InputRecord {
        crop_type: "Rice".to_string(),
        region: "Tamil Nadu".to_string(),
        soil_type: "Loamy".to_string(),
        soil_ph: 6.5,
        nitrogen_level: 120.0,
        phosphorus_level: 40.0,
        potassium_level: 180.0,
        organic_carbon: 1.2,
        moisture_content: 25.0,
        rainfall_mm: 600.0,
        temperature_c: 30.0,
        plant_age_weeks: 8,
        application_timing: "Before sowing".to_string(),
    }
}

pub fn sample_record_json() -> serde_json::Value {
    serde_json::to_value(sample_record()).unwrap()
}

/// The thirteen input columns followed by the four derived columns
pub fn feature_columns() -> FeatureColumns {
    let mut names: Vec<&str> = vec!["Crop_Type", "Region", "Soil_Type"];
    names.extend(&InputRecord::NUMERIC_COLUMNS);
    names.push("Application_Timing");
    names.extend(&DERIVED_COLUMNS);
    FeatureColumns::new(names)
}

pub fn column_encoders() -> CategoricalEncoders {
    let mut encoders = IndexMap::new();
    encoders.insert(
        "Crop_Type".to_string(),
        LabelEncoder::new(["Cotton", "Groundnut", "Maize", "Rice", "Tomato", "Wheat"]),
    );
    encoders.insert(
        "Region".to_string(),
        LabelEncoder::new([
            "Andhra Pradesh",
            "Karnataka",
            "Kerala",
            "Maharashtra",
            "Punjab",
            "Tamil Nadu",
        ]),
    );
    encoders.insert(
        "Soil_Type".to_string(),
        LabelEncoder::new(["Black", "Clay", "Loamy", "Red", "Sandy"]),
    );
    encoders.insert(
        "Application_Timing".to_string(),
        LabelEncoder::new(["After sowing", "Before sowing", "Flowering", "Mid-growth"]),
    );
    CategoricalEncoders::Columns { encoders }
}

pub fn fertilizer_decoder() -> LabelEncoder {
    LabelEncoder::new(["DAP", "MOP", "NPK", "Urea"])
}

pub fn scaler() -> NumericScaler {
    NumericScaler::Standard {
        feature_names: InputRecord::NUMERIC_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        mean: vec![6.5, 150.0, 50.0, 150.0, 1.0, 30.0, 700.0, 28.0, 10.0],
        scale: vec![1.0, 50.0, 20.0, 60.0, 0.5, 10.0, 200.0, 4.0, 4.0],
    }
}

pub fn target_scaler() -> NumericScaler {
    NumericScaler::Standard {
        feature_names: Vec::new(),
        mean: vec![100.0],
        scale: vec![40.0],
    }
}

fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
    TreeNode::Split {
        feature,
        threshold,
        left,
        right,
    }
}

fn leaf(value: &[f64]) -> TreeNode {
    TreeNode::Leaf {
        value: value.to_vec(),
    }
}

/// Two-tree forest over class codes 0..4
///
/// Column indices: 5 = Phosphorus_Level, 6 = Potassium_Level,
/// 13 = High_N_Need, 15 = High_K_Need.
pub fn classifier() -> Classifier {
    Classifier::Forest {
        n_features: 17,
        classes: (0..4).map(ClassLabel::Code).collect(),
        trees: vec![
            Tree {
                nodes: vec![
                    split(13, 0.5, 1, 2),
                    split(6, 0.0, 3, 4),
                    leaf(&[0.0, 0.0, 0.0, 10.0]),
                    leaf(&[0.0, 8.0, 2.0, 0.0]),
                    leaf(&[1.0, 0.0, 9.0, 0.0]),
                ],
            },
            Tree {
                nodes: vec![
                    split(15, 0.5, 1, 2),
                    split(5, -1.0, 3, 4),
                    leaf(&[0.0, 10.0, 0.0, 0.0]),
                    leaf(&[10.0, 0.0, 0.0, 0.0]),
                    leaf(&[0.0, 0.0, 7.0, 3.0]),
                ],
            },
        ],
    }
}

/// `0.25 - 0.5 * Nitrogen_Level(scaled) + 1.0 * High_N_Need`
pub fn regressor() -> Regressor {
    let mut coefficients = vec![0.0; 17];
    coefficients[4] = -0.5;
    coefficients[13] = 1.0;
    Regressor::Linear {
        coefficients,
        intercept: 0.25,
    }
}

/// Temporary artifact directory
pub struct ArtifactFixture {
    dir: TempDir,
}

impl ArtifactFixture {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Scaler, classifier, regressor and feature columns
    pub fn required_only() -> Self {
        let fixture = Self::empty();
        fixture
            .write("scaler.json", &scaler())
            .write("fertilizer_type_model.json", &classifier())
            .write("fertilizer_quantity_model.json", &regressor())
            .write("feature_columns.json", &feature_columns());
        fixture
    }

    /// Every artifact, using the primary candidate filenames
    pub fn complete() -> Self {
        let fixture = Self::required_only();
        fixture
            .write("y_scaler.json", &target_scaler())
            .write("label_encoders.json", &column_encoders())
            .write("fertilizer_label_encoder.json", &fertilizer_decoder());
        fixture
    }

    pub fn write<T: Serialize>(&self, filename: &str, value: &T) -> &Self {
        let json = serde_json::to_vec_pretty(value).unwrap();
        fs::write(self.dir.path().join(filename), json).unwrap();
        self
    }

    pub fn write_raw(&self, filename: &str, contents: &str) -> &Self {
        fs::write(self.dir.path().join(filename), contents).unwrap();
        self
    }

    pub fn remove(&self, filename: &str) -> &Self {
        fs::remove_file(self.dir.path().join(filename)).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn load(&self) -> ModelArtifactSet {
        ModelArtifactSet::load(self.path()).unwrap()
    }
}
