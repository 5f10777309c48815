//! Verdant: A Fast, Modular Above-Ground Biomass & Carbon Estimator
//!
//! This library estimates above-ground biomass (AGB) and derived carbon
//! metrics for geographic points and polygons, using a pre-trained
//! regression model fed by remote-sensing-derived features.
//!
//! The pipeline runs: coordinates -> feature synthesis (spectral bands,
//! radar backscatter, elevation, derived vegetation/radar indices) ->
//! scaled regression inference -> carbon stock and CO2-equivalent
//! conversion. Predictions never hard-fail: when the model or scaler is
//! unavailable the estimator serves a bounded fallback draw, tagged so
//! callers and telemetry can tell the difference.

pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AgbError, AgbResult, AgbValue, CarbonMetrics, Channel, Estimate, EstimateSource,
    FeatureVector, GeoPoint, PolygonEstimate, PredictionResult, RawChannels, Units,
};

pub use crate::core::{
    AgbEstimator, AgbPipeline, EstimatorState, FeatureSource, FeatureSourceKind,
    FixedFeatureSource, PipelineConfig, SyntheticFeatureSource,
};

pub use io::{ArtifactReader, FeatureScaler, RegressionModel};
