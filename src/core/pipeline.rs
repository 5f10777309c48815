use crate::core::aggregate;
use crate::core::carbon;
use crate::core::estimator::{AgbEstimator, EstimatorState};
use crate::core::features::{FeatureSource, FixedFeatureSource, SyntheticFeatureSource};
use crate::types::{AgbResult, FeatureVector, GeoPoint, PolygonEstimate, PredictionResult, Units};
use serde::Deserialize;
use std::path::PathBuf;

/// Which feature-source strategy the pipeline runs with.
///
/// Selected by configuration, not by which type a caller happens to
/// construct; a future remote-sensing retrieval source slots in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSourceKind {
    /// Randomized regime-based placeholder
    Synthetic,
    /// Constant mock channels
    Fixed,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Regression model artifact path
    pub model_path: PathBuf,
    /// Feature scaler artifact path
    pub scaler_path: PathBuf,
    pub feature_source: FeatureSourceKind,
    /// Fixed RNG seed for the synthetic source; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/agb_production_model_cleaned.json"),
            scaler_path: PathBuf::from("models/agb_production_scaler_cleaned.json"),
            feature_source: FeatureSourceKind::Synthetic,
            seed: None,
        }
    }
}

/// End-to-end estimation facade: feature source + estimator + carbon
/// conversion, with response rounding at this boundary only.
pub struct AgbPipeline {
    estimator: AgbEstimator,
    source: Box<dyn FeatureSource>,
}

impl AgbPipeline {
    /// Assemble from injected parts.
    pub fn new(estimator: AgbEstimator, source: Box<dyn FeatureSource>) -> Self {
        Self { estimator, source }
    }

    /// Assemble from configuration: load artifacts once, pick the feature
    /// source strategy. A failed artifact load yields a pipeline that
    /// serves fallback estimates (see [`AgbEstimator::from_artifacts`]).
    pub fn from_config(config: &PipelineConfig) -> Self {
        let estimator = AgbEstimator::from_artifacts(&config.model_path, &config.scaler_path);
        let source: Box<dyn FeatureSource> = match config.feature_source {
            FeatureSourceKind::Synthetic => match config.seed {
                Some(seed) => Box::new(SyntheticFeatureSource::with_seed(seed)),
                None => Box::new(SyntheticFeatureSource::new()),
            },
            FeatureSourceKind::Fixed => Box::new(FixedFeatureSource),
        };
        Self { estimator, source }
    }

    /// Estimate biomass and carbon figures for a point.
    ///
    /// `country` is a region hint threaded through from the caller; it is
    /// logged for traceability but does not enter the numerics. Fails only
    /// on invalid coordinates.
    pub fn predict_point(
        &self,
        latitude: f64,
        longitude: f64,
        country: &str,
    ) -> AgbResult<PredictionResult> {
        log::info!(
            "Point estimate requested at ({:.4}, {:.4}), region hint '{}'",
            latitude,
            longitude,
            country
        );

        let estimate = self
            .estimator
            .predict_at(self.source.as_ref(), latitude, longitude)?;
        Ok(self.finalize(estimate.agb_mg_ha, estimate.source))
    }

    /// Estimate directly from an already-assembled feature vector.
    ///
    /// Diagnostic entry point for exercising the model without a feature
    /// source in front of it.
    pub fn predict_features(&self, features: &FeatureVector) -> PredictionResult {
        let estimate = self.estimator.predict(features);
        self.finalize(estimate.agb_mg_ha, estimate.source)
    }

    /// Estimate per-hectare and total carbon figures for a polygon.
    ///
    /// Fails on fewer than 3 vertices, out-of-range vertices, or a
    /// non-finite area.
    pub fn predict_polygon(
        &self,
        vertices: &[GeoPoint],
        area_hectares: f64,
    ) -> AgbResult<PolygonEstimate> {
        let full = aggregate::aggregate(
            &self.estimator,
            self.source.as_ref(),
            vertices,
            area_hectares,
        )?;

        log::info!(
            "Area estimate: {:.2} Mg/ha over {} ha ({})",
            full.agb_per_hectare,
            full.area_hectares,
            full.source
        );

        Ok(PolygonEstimate {
            agb_per_hectare: carbon::round2(full.agb_per_hectare),
            carbon_per_hectare: carbon::round2(full.carbon_per_hectare),
            co2_per_hectare: carbon::round2(full.co2_per_hectare),
            total_carbon: carbon::round2(full.total_carbon),
            total_co2: carbon::round2(full.total_co2),
            area_hectares: full.area_hectares,
            source: full.source,
            units: full.units,
        })
    }

    /// Loaded/degraded state of the underlying estimator, for telemetry.
    pub fn estimator_state(&self) -> EstimatorState {
        self.estimator.state()
    }

    fn finalize(&self, agb_mg_ha: f64, source: crate::types::EstimateSource) -> PredictionResult {
        let metrics = carbon::convert(agb_mg_ha);
        PredictionResult {
            agb_estimate: carbon::round2(agb_mg_ha),
            carbon_stock: carbon::round2(metrics.carbon_stock_t),
            co2_equivalent: carbon::round2(metrics.co2_equivalent_t),
            source,
            units: Units::standard(),
        }
    }
}
