use crate::core::features::{self, FeatureSource};
use crate::io::artifact::{ArtifactReader, FeatureScaler, RegressionModel};
use crate::types::{
    AgbError, AgbResult, Estimate, EstimateSource, FeatureVector, GeoPoint,
};
use rand::Rng;
use std::path::Path;

/// Lower bound of the trained operating range, Mg/ha
pub const AGB_MIN: f64 = 2.0;
/// Upper bound of the trained operating range, Mg/ha
pub const AGB_MAX: f64 = 135.0;
/// Degraded-mode draw range, Mg/ha (typical smallholder biomass)
pub const FALLBACK_MIN: f64 = 10.0;
pub const FALLBACK_MAX: f64 = 60.0;

/// Whether the estimator is serving model predictions or fallback draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    /// Model and scaler loaded; predictions run the regression
    Loaded,
    /// Artifacts missing or failed to load; every prediction falls back.
    /// Permanent for the lifetime of this estimator.
    Degraded,
}

/// Biomass estimator backed by a pre-trained regression model.
///
/// Construct once at process start and share; the model and scaler are
/// read-only after load, so `&AgbEstimator` is safe across threads with no
/// locking. Predictions never fail the caller: any internal error is
/// absorbed into a bounded fallback draw tagged
/// [`EstimateSource::Fallback`].
pub struct AgbEstimator {
    model: Option<RegressionModel>,
    scaler: Option<FeatureScaler>,
}

impl AgbEstimator {
    /// Build from already-loaded artifacts (dependency injection seam for
    /// tests and embedders).
    pub fn new(model: RegressionModel, scaler: FeatureScaler) -> Self {
        Self {
            model: Some(model),
            scaler: Some(scaler),
        }
    }

    /// Estimator with no artifacts: every prediction takes the fallback
    /// path.
    pub fn degraded() -> Self {
        Self {
            model: None,
            scaler: None,
        }
    }

    /// Load model and scaler artifacts once.
    ///
    /// Load failure does not propagate: the estimator comes up degraded and
    /// stays degraded for its lifetime, so callers always get an estimate.
    pub fn from_artifacts<P: AsRef<Path>>(model_path: P, scaler_path: P) -> Self {
        let model = match ArtifactReader::read_model(model_path.as_ref()) {
            Ok(model) => Some(model),
            Err(e) => {
                log::warn!(
                    "Failed to load model from {}: {}",
                    model_path.as_ref().display(),
                    e
                );
                None
            }
        };
        let scaler = match ArtifactReader::read_scaler(scaler_path.as_ref()) {
            Ok(scaler) => Some(scaler),
            Err(e) => {
                log::warn!(
                    "Failed to load scaler from {}: {}",
                    scaler_path.as_ref().display(),
                    e
                );
                None
            }
        };

        let estimator = Self { model, scaler };
        match estimator.state() {
            EstimatorState::Loaded => log::info!("Production model loaded, ready for estimation"),
            EstimatorState::Degraded => {
                log::warn!("Estimator starting degraded; all predictions will use fallback")
            }
        }
        estimator
    }

    pub fn state(&self) -> EstimatorState {
        if self.model.is_some() && self.scaler.is_some() {
            EstimatorState::Loaded
        } else {
            EstimatorState::Degraded
        }
    }

    /// Estimate biomass for a complete feature vector.
    ///
    /// Ordering, scaling, or inference failures are logged and absorbed
    /// into a uniform draw from [[`FALLBACK_MIN`], [`FALLBACK_MAX`]].
    pub fn predict(&self, features: &FeatureVector) -> Estimate {
        match self.try_predict(features) {
            Ok(agb) => {
                log::debug!("Biomass estimate: {:.2} Mg/ha", agb);
                Estimate {
                    agb_mg_ha: agb,
                    source: EstimateSource::Model,
                }
            }
            Err(e) => {
                log::warn!("Prediction degraded to fallback: {}", e);
                self.fallback_estimate()
            }
        }
    }

    /// Coordinate-accepting overload: synthesize features, then predict.
    ///
    /// Only coordinate validation can error; feature-source failures are
    /// absorbed like any other internal failure.
    pub fn predict_at(
        &self,
        source: &dyn FeatureSource,
        lat: f64,
        lon: f64,
    ) -> AgbResult<Estimate> {
        features::validate_coordinates(lat, lon)?;
        match source.sample(lat, lon) {
            Ok(raw) => Ok(self.predict(&features::derive_indices(&raw))),
            Err(e) => {
                log::warn!("Feature source failed at ({}, {}): {}", lat, lon, e);
                Ok(self.fallback_estimate())
            }
        }
    }

    /// Estimate biomass for a batch of points.
    pub fn predict_many(
        &self,
        source: &dyn FeatureSource,
        points: &[GeoPoint],
    ) -> AgbResult<Vec<Estimate>> {
        points
            .iter()
            .map(|p| self.predict_at(source, p.lat, p.lon))
            .collect()
    }

    /// Batch estimation across worker threads.
    #[cfg(feature = "parallel")]
    pub fn predict_many_parallel(
        &self,
        source: &dyn FeatureSource,
        points: &[GeoPoint],
    ) -> AgbResult<Vec<Estimate>> {
        use rayon::prelude::*;

        log::debug!("Parallel batch estimation over {} points", points.len());
        points
            .par_iter()
            .map(|p| self.predict_at(source, p.lat, p.lon))
            .collect()
    }

    fn try_predict(&self, features: &FeatureVector) -> AgbResult<f64> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AgbError::ModelUnavailable("No model loaded".to_string()))?;
        let scaler = self
            .scaler
            .as_ref()
            .ok_or_else(|| AgbError::ModelUnavailable("No scaler loaded".to_string()))?;

        let ordered = features.to_array()?;
        let scaled = scaler.transform(&ordered)?;
        let raw = model.predict(&scaled)?;

        if !raw.is_finite() {
            return Err(AgbError::Processing(format!(
                "Model produced non-finite estimate: {}",
                raw
            )));
        }

        // Clamp to the range the model was trained on
        Ok(raw.clamp(AGB_MIN, AGB_MAX))
    }

    fn fallback_estimate(&self) -> Estimate {
        let agb = rand::thread_rng().gen_range(FALLBACK_MIN..=FALLBACK_MAX);
        Estimate {
            agb_mg_ha: agb,
            source: EstimateSource::Fallback,
        }
    }
}
