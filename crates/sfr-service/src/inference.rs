//! The `/predict` flow: transform, classify, regress, decode

use crate::context::ServiceContext;
use crate::error::ServiceError;
use sfr_artifact::{ClassLabel, InferenceError, LabelEncoder, NumericScaler};
use sfr_features::{round2, InputRecord, PredictionResult};

/// Run one prediction against the shared context
///
/// # Errors
/// Returns [`ServiceError`] when artifacts are missing, the strict column
/// policy rejects the record, or either model fails
pub fn predict(ctx: &ServiceContext, record: &InputRecord) -> Result<PredictionResult, ServiceError> {
    let models = ctx.ready()?;
    let outcome = ctx.pipeline().transform(record, &models.features)?;
    let features = outcome.vector.values();

    let raw_class = models.classifier.predict(features).map_err(ServiceError::Classifier)?;
    let raw_quantity = models.regressor.predict(features).map_err(ServiceError::Regressor)?;

    let fertilizer_type = decode_label(&raw_class, ctx.artifacts().fertilizer_decoder());
    let quantity = restore_quantity(raw_quantity, models.target_scaler);
    if !quantity.is_finite() {
        return Err(ServiceError::Regressor(InferenceError::NonFinite));
    }

    tracing::debug!(
        raw_class = %raw_class,
        raw_quantity,
        unseen = outcome.report.unseen.len(),
        zero_filled = outcome.report.zero_filled.len(),
        "Inference complete"
    );

    Ok(PredictionResult {
        fertilizer_type,
        quantity_kg_per_acre: round2(quantity),
    })
}

/// Map a raw class to its fertilizer name
///
/// Without a usable decoder the raw class's string form is returned.
#[must_use]
pub fn decode_label(raw: &ClassLabel, decoder: Option<&LabelEncoder>) -> String {
    match (raw, decoder) {
        (ClassLabel::Code(code), Some(decoder)) => match decoder.inverse_transform(*code) {
            Ok(name) => name.to_string(),
            Err(e) => {
                tracing::warn!("Label decoding failed, returning raw class: {}", e);
                raw.to_string()
            }
        },
        (ClassLabel::Name(_), _) | (_, None) => raw.to_string(),
    }
}

/// Undo target scaling; the raw value is kept when no scaler applies
#[must_use]
pub fn restore_quantity(raw: f64, target_scaler: Option<&NumericScaler>) -> f64 {
    let Some(scaler) = target_scaler else {
        return raw;
    };
    scaler.inverse_single(raw).unwrap_or_else(|e| {
        tracing::warn!("Target inverse scaling failed, using raw output: {}", e);
        raw
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> LabelEncoder {
        LabelEncoder::new(["DAP", "Urea"])
    }

    #[test]
    fn code_decoded_through_decoder() {
        assert_eq!(decode_label(&ClassLabel::Code(1), Some(&decoder())), "Urea");
    }

    #[test]
    fn out_of_range_code_falls_back_to_raw() {
        assert_eq!(decode_label(&ClassLabel::Code(7), Some(&decoder())), "7");
    }

    #[test]
    fn no_decoder_returns_raw() {
        assert_eq!(decode_label(&ClassLabel::Code(0), None), "0");
        assert_eq!(decode_label(&ClassLabel::Name("MOP".into()), Some(&decoder())), "MOP");
    }

    #[test]
    fn quantity_inverse_scaled() {
        let scaler = NumericScaler::Standard {
            feature_names: Vec::new(),
            mean: vec![100.0],
            scale: vec![40.0],
        };
        assert!((restore_quantity(0.5, Some(&scaler)) - 120.0).abs() < 1e-12);
        assert_eq!(restore_quantity(0.5, None), 0.5);
    }

    #[test]
    fn wide_target_scaler_falls_back_to_raw() {
        let scaler = NumericScaler::Standard {
            feature_names: Vec::new(),
            mean: vec![1.0, 2.0],
            scale: vec![1.0, 1.0],
        };
        assert_eq!(restore_quantity(3.25, Some(&scaler)), 3.25);
    }
}
