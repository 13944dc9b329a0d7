//! SFR Artifact Layer
//!
//! Typed, read-only model artifacts for the fertilizer prediction service.
//!
//! # Core Concepts
//!
//! - [`ModelArtifactSet`]: everything loaded from the artifact directory at startup
//! - [`ArtifactKind`]: logical artifacts and their candidate filenames
//! - [`NumericScaler`], [`LabelEncoder`], [`CategoricalEncoders`]: preprocessing
//! - [`Classifier`], [`Regressor`]: pre-trained models with pure inference
//!
//! # Example
//!
//! ```rust,ignore
//! use sfr_artifact::ModelArtifactSet;
//!
//! let artifacts = ModelArtifactSet::load(Path::new("models"))?;
//! if !artifacts.missing_required().is_empty() {
//!     // serve, but /predict answers 500
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod encoder;
mod error;
mod fingerprint;
mod loader;
mod model;
mod scaler;

// Re-exports
pub use encoder::{CategoricalEncoders, LabelEncoder};
pub use error::{ArtifactError, EncodeError, InferenceError, ScaleError};
pub use fingerprint::Fingerprint;
pub use loader::{load_artifact, resolve, ArtifactKind, FeatureColumns, Loaded, ModelArtifactSet};
pub use model::{ClassLabel, Classifier, Regressor, Tree, TreeNode};
pub use scaler::NumericScaler;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
