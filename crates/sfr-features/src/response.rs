//! Response bodies shared by the service and the form client

use serde::{Deserialize, Serialize};

/// Fixed body of the liveness check
pub const LIVENESS_MESSAGE: &str = "Smart Fertilizer Recommender API is running successfully!";

/// Successful `/predict` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Human-readable fertilizer type
    #[serde(rename = "Fertilizer_Type")]
    pub fertilizer_type: String,
    /// Recommended quantity, kg per acre, two decimals
    #[serde(rename = "Recommended_Quantity_kg_per_acre")]
    pub quantity_kg_per_acre: f64,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    #[inline]
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// `GET /` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    pub message: String,
}

impl Default for Liveness {
    fn default() -> Self {
        Self {
            message: LIVENESS_MESSAGE.to_string(),
        }
    }
}

/// Round to two decimal places
#[inline]
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_wire_names() {
        let result = PredictionResult {
            fertilizer_type: "Urea".into(),
            quantity_kg_per_acre: 42.5,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Fertilizer_Type": "Urea", "Recommended_Quantity_kg_per_acre": 42.5})
        );
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(122.000_000_000_01), 122.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-1.005_1), -1.01);
    }
}
