//! Error types for record validation and the feature pipeline

use sfr_artifact::EncodeError;

/// A single field-level violation found by [`crate::InputRecord::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// Categorical field is blank
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Numeric field is NaN or infinite
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// Numeric field outside the accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Failure of one fallback coding strategy
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    /// No encoder artifact covers the column
    #[error("no encoder for column '{0}'")]
    NoEncoder(String),

    /// Encoder rejected the value
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Value absent from the row's column
    #[error("value '{0}' not present in column")]
    NotInColumn(String),
}

/// Errors that fail a feature transform
///
/// Most pipeline steps degrade instead of failing; only the strict column
/// policy produces an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// Expected feature columns absent from the row
    #[error("missing expected feature columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_display() {
        let err = TransformError::MissingColumns(vec!["Crop_Type".into(), "Region".into()]);
        assert_eq!(err.to_string(), "missing expected feature columns: Crop_Type, Region");
    }

    #[test]
    fn out_of_range_display() {
        let err = RecordError::OutOfRange {
            field: "Soil_pH",
            value: 11.0,
            min: 3.0,
            max: 9.0,
        };
        assert_eq!(err.to_string(), "Soil_pH must be between 3 and 9, got 11");
    }
}
