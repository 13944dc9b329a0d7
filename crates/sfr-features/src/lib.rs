//! SFR Features
//!
//! The request schema and the deterministic feature-transform pipeline that
//! sits between the HTTP layer and the models.
//!
//! # Core Concepts
//!
//! - [`InputRecord`]: the thirteen-field request body
//! - [`FeaturePipeline`]: record → [`FeatureVector`] in five degrade-don't-fail steps
//! - [`FallbackChain`]: ordered [`CodingStrategy`] list for residual text cells
//! - [`ColumnPolicy`]: zero-fill or reject missing expected columns
//! - [`PredictionResult`] / [`ErrorBody`]: response bodies shared with the client
//!
//! # Example
//!
//! ```rust,ignore
//! use sfr_features::{ColumnPolicy, FeatureArtifacts, FeaturePipeline};
//!
//! let pipeline = FeaturePipeline::new(ColumnPolicy::ZeroFill);
//! let artifacts = FeatureArtifacts::from_set(&set).expect("feature columns loaded");
//! let outcome = pipeline.transform(&record, &artifacts)?;
//! let label = classifier.predict(outcome.vector.values())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod pipeline;
mod record;
mod response;
mod strategy;
mod vector;

pub use error::{RecordError, StrategyError, TransformError};
pub use pipeline::{
    add_derived_features, code_residual_text, encode_categoricals, npk_ratio, reconcile_columns,
    rescale, ColumnPolicy, FeatureArtifacts, FeaturePipeline, Scaling, TransformOutcome,
    TransformReport, DERIVED_COLUMNS, NPK_EPSILON,
};
pub use record::{Cell, InputRecord, Row, FIELD_RANGES};
pub use response::{round2, ErrorBody, Liveness, PredictionResult, LIVENESS_MESSAGE};
pub use strategy::{
    CodingContext, CodingStrategy, ColumnEncoderStrategy, FallbackChain, FirstSeenStrategy,
    Resolution,
};
pub use vector::FeatureVector;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
