//! I/O modules for reading model and scaler artifacts

pub mod artifact;

pub use artifact::{ArtifactReader, FeatureScaler, RegressionModel};
