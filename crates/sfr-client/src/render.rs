//! Terminal rendering of a recommendation

use sfr_features::{InputRecord, PredictionResult};
use std::fmt::Write as _;

/// Recommendation block
#[must_use]
pub fn render_result(result: &PredictionResult) -> String {
    format!(
        "✅ Recommendation Generated\n  Fertilizer Type:      {}\n  Recommended Quantity: {} kg/acre\n",
        result.fertilizer_type, result.quantity_kg_per_acre
    )
}

/// Two-column table of the submitted fields, in record order
#[must_use]
pub fn render_summary(record: &InputRecord) -> String {
    let mut rows: Vec<(&str, String)> = Vec::with_capacity(13);
    let categorical = record.categorical_fields();
    for (name, value) in &categorical[..3] {
        rows.push((*name, (*value).to_string()));
    }
    for (name, value) in record.numeric_fields() {
        rows.push((name, value.to_string()));
    }
    let (timing, value) = categorical[3];
    rows.push((timing, value.to_string()));

    let name_width = rows.iter().map(|(n, _)| n.len()).max().unwrap_or(0).max("Field".len());
    let value_width = rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0).max("Value".len());

    let mut out = String::from("Input Summary\n");
    let rule = format!("+-{}-+-{}-+\n", "-".repeat(name_width), "-".repeat(value_width));
    out.push_str(&rule);
    let _ = writeln!(out, "| {:<name_width$} | {:<value_width$} |", "Field", "Value");
    out.push_str(&rule);
    for (name, value) in &rows {
        let _ = writeln!(out, "| {name:<name_width$} | {value:<value_width$} |");
    }
    out.push_str(&rule);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InputRecord {
        InputRecord {
            crop_type: "Maize".into(),
            region: "Punjab".into(),
            soil_type: "Black".into(),
            soil_ph: 7.1,
            nitrogen_level: 90.0,
            phosphorus_level: 25.0,
            potassium_level: 110.0,
            organic_carbon: 0.8,
            moisture_content: 18.0,
            rainfall_mm: 450.0,
            temperature_c: 27.0,
            plant_age_weeks: 5,
            application_timing: "Mid-growth".into(),
        }
    }

    #[test]
    fn result_mentions_type_and_unit() {
        let text = render_result(&PredictionResult {
            fertilizer_type: "DAP".into(),
            quantity_kg_per_acre: 61.25,
        });
        assert!(text.contains("Fertilizer Type:      DAP"));
        assert!(text.contains("61.25 kg/acre"));
    }

    #[test]
    fn summary_lists_fields_in_record_order() {
        let table = render_summary(&record());
        let crop = table.find("Crop_Type").unwrap();
        let ph = table.find("Soil_pH").unwrap();
        let timing = table.find("Application_Timing").unwrap();
        assert!(crop < ph && ph < timing);
        assert!(table.contains("| Plant_Age_Weeks    | 5          |"));
        assert_eq!(table.lines().count(), 1 + 3 + 13 + 1);
    }
}
