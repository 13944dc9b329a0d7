//! SFR Client
//!
//! Terminal front end for the prediction service: collect a record through
//! an interactive form (or a JSON file), post it, render the answer.
//!
//! # Core Concepts
//!
//! - [`Form`]: prompts each field with fixed choices, defaults and ranges
//! - [`PredictionClient`]: `POST /predict` with distinct connection errors
//! - [`render_result`] / [`render_summary`]: terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use sfr_client::{Form, PredictionClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
//!
//! let record = Form::new(stdin.lock(), stdout).fill()?;
//! let client = PredictionClient::new(DEFAULT_API_URL, DEFAULT_TIMEOUT)?;
//! println!("{}", render_result(&client.predict(&record).await?));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod client;
mod error;
mod form;
mod render;

pub use client::{error_detail, PredictionClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use form::{
    parse_choice, Form, NumberField, CROP_CHOICES, NUMERIC_DEFAULTS, REGION_CHOICES, SOIL_CHOICES,
    TIMING_CHOICES,
};
pub use render::{render_result, render_summary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
