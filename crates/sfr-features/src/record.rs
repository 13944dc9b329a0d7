//! Input record and raw row types
//!
//! [`InputRecord`] is the thirteen-field request body; [`Row`] is its
//! column-keyed form that the pipeline mutates step by step.

use crate::error::RecordError;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One farm observation, as posted to `/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Soil_Type")]
    pub soil_type: String,
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Nitrogen_Level")]
    pub nitrogen_level: f64,
    #[serde(rename = "Phosphorus_Level")]
    pub phosphorus_level: f64,
    #[serde(rename = "Potassium_Level")]
    pub potassium_level: f64,
    #[serde(rename = "Organic_Carbon")]
    pub organic_carbon: f64,
    #[serde(rename = "Moisture_Content")]
    pub moisture_content: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Plant_Age_Weeks", deserialize_with = "whole_number")]
    pub plant_age_weeks: i64,
    #[serde(rename = "Application_Timing")]
    pub application_timing: String,
}

/// Integer field that also accepts integral floats such as `8.0`
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct WholeNumber;

    impl<'de> Visitor<'de> for WholeNumber {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a whole number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(WholeNumber)
}

/// Accepted range per numeric field, as offered by the input form
pub const FIELD_RANGES: [(&str, f64, f64); 9] = [
    ("Soil_pH", 3.0, 9.0),
    ("Nitrogen_Level", 0.0, 300.0),
    ("Phosphorus_Level", 0.0, 150.0),
    ("Potassium_Level", 0.0, 300.0),
    ("Organic_Carbon", 0.0, 5.0),
    ("Moisture_Content", 0.0, 100.0),
    ("Rainfall_mm", 0.0, 1500.0),
    ("Temperature_C", 0.0, 50.0),
    ("Plant_Age_Weeks", 1.0, 52.0),
];

impl InputRecord {
    /// Categorical columns, in record order
    pub const CATEGORICAL_COLUMNS: [&'static str; 4] =
        ["Crop_Type", "Region", "Soil_Type", "Application_Timing"];

    /// Numeric columns, in record order
    pub const NUMERIC_COLUMNS: [&'static str; 9] = [
        "Soil_pH",
        "Nitrogen_Level",
        "Phosphorus_Level",
        "Potassium_Level",
        "Organic_Carbon",
        "Moisture_Content",
        "Rainfall_mm",
        "Temperature_C",
        "Plant_Age_Weeks",
    ];

    /// Numeric fields by column name, in record order
    #[must_use]
    pub fn numeric_fields(&self) -> [(&'static str, f64); 9] {
        [
            ("Soil_pH", self.soil_ph),
            ("Nitrogen_Level", self.nitrogen_level),
            ("Phosphorus_Level", self.phosphorus_level),
            ("Potassium_Level", self.potassium_level),
            ("Organic_Carbon", self.organic_carbon),
            ("Moisture_Content", self.moisture_content),
            ("Rainfall_mm", self.rainfall_mm),
            ("Temperature_C", self.temperature_c),
            ("Plant_Age_Weeks", self.plant_age_weeks as f64),
        ]
    }

    /// Categorical fields by column name, in record order
    #[must_use]
    pub fn categorical_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Crop_Type", self.crop_type.as_str()),
            ("Region", self.region.as_str()),
            ("Soil_Type", self.soil_type.as_str()),
            ("Application_Timing", self.application_timing.as_str()),
        ]
    }

    /// Column-keyed row in declaration order
    #[must_use]
    pub fn to_row(&self) -> Row {
        let numeric = self.numeric_fields();
        let mut row = Row::default();
        row.insert("Crop_Type", Cell::Text(self.crop_type.clone()));
        row.insert("Region", Cell::Text(self.region.clone()));
        row.insert("Soil_Type", Cell::Text(self.soil_type.clone()));
        for (name, value) in numeric {
            row.insert(name, Cell::Number(value));
        }
        row.insert("Application_Timing", Cell::Text(self.application_timing.clone()));
        row
    }

    /// Check every field against the form's accepted values
    ///
    /// The service scores whatever it receives; this is for clients that
    /// want to reject bad input before sending it.
    ///
    /// # Errors
    /// Returns all violations found
    pub fn validate(&self) -> Result<(), Vec<RecordError>> {
        let mut errors = Vec::new();

        for (field, value) in self.categorical_fields() {
            if value.trim().is_empty() {
                errors.push(RecordError::Empty { field });
            }
        }

        for ((field, value), (_, min, max)) in self.numeric_fields().into_iter().zip(FIELD_RANGES) {
            if !value.is_finite() {
                errors.push(RecordError::NonFinite { field });
            } else if value < min || value > max {
                errors.push(RecordError::OutOfRange { field, value, min, max });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A raw or partially transformed cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Numeric value
    Number(f64),
    /// Categorical value not yet encoded
    Text(String),
}

impl Cell {
    /// Numeric value, if already numeric
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Text value, if still categorical
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// Insertion-ordered column → cell map for a single row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, Cell>,
}

impl Row {
    /// Insert or replace a cell, keeping its original position on replace
    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    /// Cell by column name
    #[inline]
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Remove a column
    pub fn remove(&mut self, column: &str) -> Option<Cell> {
        self.cells.shift_remove(column)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// `(column, cell)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Columns whose cell is still text
    #[must_use]
    pub fn text_columns(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|(_, cell)| matches!(cell, Cell::Text(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if row has no columns
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
