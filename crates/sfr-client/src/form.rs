//! Interactive terminal form
//!
//! Prompts for each record field in order. Categorical fields offer a fixed
//! choice list; numeric fields carry a default and the accepted range from
//! [`FIELD_RANGES`]. An empty answer takes the default; an invalid answer
//! re-prompts.

use sfr_features::{InputRecord, FIELD_RANGES};
use std::io::{self, BufRead, Write};

pub const CROP_CHOICES: [&str; 6] = ["Rice", "Wheat", "Groundnut", "Cotton", "Tomato", "Maize"];
pub const REGION_CHOICES: [&str; 6] = [
    "Tamil Nadu",
    "Karnataka",
    "Andhra Pradesh",
    "Kerala",
    "Maharashtra",
    "Punjab",
];
pub const SOIL_CHOICES: [&str; 5] = ["Loamy", "Clay", "Sandy", "Red", "Black"];
pub const TIMING_CHOICES: [&str; 4] = ["Before sowing", "After sowing", "Mid-growth", "Flowering"];

/// Default per numeric column, in record order
pub const NUMERIC_DEFAULTS: [(&str, f64); 9] = [
    ("Soil_pH", 6.5),
    ("Nitrogen_Level", 120.0),
    ("Phosphorus_Level", 40.0),
    ("Potassium_Level", 180.0),
    ("Organic_Carbon", 1.2),
    ("Moisture_Content", 25.0),
    ("Rainfall_mm", 600.0),
    ("Temperature_C", 30.0),
    ("Plant_Age_Weeks", 8.0),
];

/// Numeric prompt settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberField {
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

impl NumberField {
    /// Settings for a numeric column; `None` for unknown columns
    #[must_use]
    pub fn for_column(column: &str, label: &'static str) -> Option<Self> {
        let (_, default) = NUMERIC_DEFAULTS.iter().find(|(c, _)| *c == column)?;
        let (_, min, max) = FIELD_RANGES.iter().find(|(c, _, _)| *c == column)?;
        Some(Self {
            label,
            default: *default,
            min: *min,
            max: *max,
            integer: column == "Plant_Age_Weeks",
        })
    }

    /// Parse one answer
    ///
    /// # Errors
    /// Returns a message suitable for re-prompting
    pub fn parse(&self, input: &str) -> Result<f64, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(self.default);
        }
        let value: f64 = input.parse().map_err(|_| format!("'{input}' is not a number"))?;
        if !value.is_finite() {
            return Err(format!("'{input}' is not a finite number"));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(format!("{} must be a whole number", self.label));
        }
        if value < self.min || value > self.max {
            return Err(format!("{} must be between {} and {}", self.label, self.min, self.max));
        }
        Ok(value)
    }
}

/// Parse a choice answer: empty for the first choice, a 1-based index, or a
/// case-insensitive name
///
/// # Errors
/// Returns a message suitable for re-prompting
pub fn parse_choice(input: &str, choices: &[&str]) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return choices
            .first()
            .map(|c| (*c).to_string())
            .ok_or_else(|| "no choices available".to_string());
    }
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| choices.get(i))
            .map(|c| (*c).to_string())
            .ok_or_else(|| format!("pick a number between 1 and {}", choices.len()));
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(input))
        .map(|c| (*c).to_string())
        .ok_or_else(|| format!("'{input}' is not one of: {}", choices.join(", ")))
}

/// Line-oriented prompter over any reader/writer pair
pub struct Form<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Form<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt every field and assemble the record
    ///
    /// # Errors
    /// Returns error on I/O failure or if input ends before the form is complete
    pub fn fill(&mut self) -> io::Result<InputRecord> {
        writeln!(self.output, "Smart Fertilizer Recommender")?;
        writeln!(self.output, "Press Enter to accept the value in brackets.")?;
        writeln!(self.output)?;

        let crop_type = self.choice("Crop Type", &CROP_CHOICES)?;
        let region = self.choice("Region", &REGION_CHOICES)?;
        let soil_type = self.choice("Soil Type", &SOIL_CHOICES)?;
        let soil_ph = self.number("Soil_pH", "Soil pH")?;
        let organic_carbon = self.number("Organic_Carbon", "Organic Carbon (%)")?;
        let nitrogen_level = self.number("Nitrogen_Level", "Nitrogen Level")?;
        let phosphorus_level = self.number("Phosphorus_Level", "Phosphorus Level")?;
        let potassium_level = self.number("Potassium_Level", "Potassium Level")?;
        let moisture_content = self.number("Moisture_Content", "Moisture Content (%)")?;
        let rainfall_mm = self.number("Rainfall_mm", "Rainfall (mm)")?;
        let temperature_c = self.number("Temperature_C", "Temperature (°C)")?;
        let plant_age_weeks = self.number("Plant_Age_Weeks", "Plant Age (weeks)")?;
        let application_timing = self.choice("Application Timing", &TIMING_CHOICES)?;

        #[allow(clippy::cast_possible_truncation)]
        let plant_age_weeks = plant_age_weeks as i64;

        Ok(InputRecord {
            crop_type,
            region,
            soil_type,
            soil_ph,
            nitrogen_level,
            phosphorus_level,
            potassium_level,
            organic_carbon,
            moisture_content,
            rainfall_mm,
            temperature_c,
            plant_age_weeks,
            application_timing,
        })
    }

    fn choice(&mut self, label: &str, choices: &[&str]) -> io::Result<String> {
        writeln!(self.output, "{label}:")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }
        let default = choices.first().copied().unwrap_or_default();
        loop {
            let line = self.ask(&format!("{label} [{default}]: "))?;
            match parse_choice(&line, choices) {
                Ok(value) => return Ok(value),
                Err(msg) => writeln!(self.output, "  {msg}")?,
            }
        }
    }

    fn number(&mut self, column: &str, label: &'static str) -> io::Result<f64> {
        let field = NumberField::for_column(column, label)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("unknown field {column}")))?;
        loop {
            let line = self.ask(&format!(
                "{label} ({}-{}) [{}]: ",
                field.min, field.max, field.default
            ))?;
            match field.parse(&line) {
                Ok(value) => return Ok(value),
                Err(msg) => writeln!(self.output, "  {msg}")?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input ended before the form was complete"));
        }
        Ok(line)
    }
}
