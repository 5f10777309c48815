use crate::types::{AgbError, AgbResult, Channel};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Trained linear regression artifact.
///
/// The JSON document is the cleaned export of the production training run:
/// one coefficient per channel in [`Channel::ORDERED`] order, plus the
/// intercept. `feature_names` is carried in the artifact precisely so a
/// stale or reordered export fails at load instead of predicting garbage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RegressionModel {
    /// Run the regression on an already-scaled feature array.
    pub fn predict(&self, scaled: &Array1<f64>) -> AgbResult<f64> {
        if scaled.len() != self.coefficients.len() {
            return Err(AgbError::Processing(format!(
                "Feature array length {} does not match model ({} coefficients)",
                scaled.len(),
                self.coefficients.len()
            )));
        }
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        Ok(coefficients.dot(scaled) + self.intercept)
    }

    /// Check the artifact against the crate's channel ordering.
    pub fn validate(&self) -> AgbResult<()> {
        if self.coefficients.len() != Channel::ORDERED.len() {
            return Err(AgbError::Artifact(format!(
                "Model has {} coefficients, expected {}",
                self.coefficients.len(),
                Channel::ORDERED.len()
            )));
        }
        if self.feature_names.len() != Channel::ORDERED.len() {
            return Err(AgbError::Artifact(format!(
                "Model names {} features, expected {}",
                self.feature_names.len(),
                Channel::ORDERED.len()
            )));
        }
        for (i, channel) in Channel::ORDERED.iter().enumerate() {
            if self.feature_names[i] != channel.name() {
                return Err(AgbError::Artifact(format!(
                    "Model feature order mismatch at index {}: artifact has '{}', expected '{}'",
                    i, self.feature_names[i], channel
                )));
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AgbError::Artifact(
                "Model contains non-finite coefficients".to_string(),
            ));
        }
        Ok(())
    }
}

/// Feature standardization artifact: per-channel mean and scale fitted
/// alongside the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureScaler {
    /// Standardize an ordered feature array: (x - mean) / scale.
    pub fn transform(&self, features: &Array1<f64>) -> AgbResult<Array1<f64>> {
        if features.len() != self.mean.len() {
            return Err(AgbError::Processing(format!(
                "Feature array length {} does not match scaler ({} channels)",
                features.len(),
                self.mean.len()
            )));
        }
        let mean = ArrayView1::from(self.mean.as_slice());
        let scale = ArrayView1::from(self.scale.as_slice());
        Ok((features - &mean) / &scale)
    }

    pub fn validate(&self) -> AgbResult<()> {
        if self.mean.len() != Channel::ORDERED.len() || self.scale.len() != Channel::ORDERED.len() {
            return Err(AgbError::Artifact(format!(
                "Scaler has {} means and {} scales, expected {}",
                self.mean.len(),
                self.scale.len(),
                Channel::ORDERED.len()
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(AgbError::Artifact(
                "Scaler contains non-finite means".to_string(),
            ));
        }
        // Zero or negative scales would blow up the transform
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(AgbError::Artifact(
                "Scaler scales must be finite and positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reader for model and scaler artifacts
pub struct ArtifactReader;

impl ArtifactReader {
    /// Read and validate a regression model artifact.
    pub fn read_model<P: AsRef<Path>>(path: P) -> AgbResult<RegressionModel> {
        log::info!("Reading regression model from: {}", path.as_ref().display());

        let file = File::open(path.as_ref())?;
        let model: RegressionModel = serde_json::from_reader(BufReader::new(file))?;
        model.validate()?;

        log::debug!(
            "Model loaded: {} coefficients, intercept {:.4}",
            model.coefficients.len(),
            model.intercept
        );
        Ok(model)
    }

    /// Read and validate a feature scaler artifact.
    pub fn read_scaler<P: AsRef<Path>>(path: P) -> AgbResult<FeatureScaler> {
        log::info!("Reading feature scaler from: {}", path.as_ref().display());

        let file = File::open(path.as_ref())?;
        let scaler: FeatureScaler = serde_json::from_reader(BufReader::new(file))?;
        scaler.validate()?;

        log::debug!("Scaler loaded: {} channels", scaler.mean.len());
        Ok(scaler)
    }
}
