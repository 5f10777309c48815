//! Core estimation modules

pub mod aggregate;
pub mod carbon;
pub mod estimator;
pub mod features;
pub mod pipeline;

// Re-export main types
pub use aggregate::{aggregate, centroid};
pub use carbon::{convert, round2, CARBON_FRACTION, CO2_PER_TONNE_CARBON};
pub use estimator::{AgbEstimator, EstimatorState, AGB_MAX, AGB_MIN, FALLBACK_MAX, FALLBACK_MIN};
pub use features::{
    derive_indices, synthesize, validate_coordinates, FeatureSource, FixedFeatureSource,
    SyntheticFeatureSource,
};
pub use pipeline::{AgbPipeline, FeatureSourceKind, PipelineConfig};
