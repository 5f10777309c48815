use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Above-ground biomass value in megagrams per hectare
pub type AgbValue = f64;

/// Model input channels, in the exact order the regression model and
/// feature scaler were fit on.
///
/// Every ordered array in the crate is built by iterating
/// [`Channel::ORDERED`]; the ordering exists nowhere else. Reordering this
/// list without refitting the artifacts silently corrupts predictions,
/// which is why artifact loading cross-checks its `feature_names` against
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Blue reflectance (Sentinel-2 B2)
    B2,
    /// Green reflectance (B3)
    B3,
    /// Red reflectance (B4)
    B4,
    /// Near-infrared reflectance (B8)
    B8,
    /// Short-wave infrared reflectance (B11)
    B11,
    /// Short-wave infrared reflectance (B12)
    B12,
    /// Radar backscatter, HH polarization
    HH,
    /// Radar backscatter, HV polarization
    HV,
    /// Terrain elevation in meters
    Elevation,
    Longitude,
    Latitude,
    /// Normalized difference vegetation index
    Ndvi,
    /// Enhanced vegetation index
    Evi,
    /// Normalized burn ratio
    Nbr,
    /// Modified soil-adjusted vegetation index
    Msavi,
    /// HH / HV backscatter ratio
    SarRatio,
    /// HH - HV backscatter difference
    SarDiff,
    /// ln(HH / HV), zero when either channel is non-positive
    SarLogRatio,
    /// B11 / B12 band ratio
    B11B12Ratio,
    /// B8 / B4 band ratio
    B8B4Ratio,
    /// Squared elevation
    ElevationSquared,
}

impl Channel {
    /// The authoritative channel ordering for model inference.
    pub const ORDERED: [Channel; 21] = [
        Channel::B2,
        Channel::B3,
        Channel::B4,
        Channel::B8,
        Channel::B11,
        Channel::B12,
        Channel::HH,
        Channel::HV,
        Channel::Elevation,
        Channel::Longitude,
        Channel::Latitude,
        Channel::Ndvi,
        Channel::Evi,
        Channel::Nbr,
        Channel::Msavi,
        Channel::SarRatio,
        Channel::SarDiff,
        Channel::SarLogRatio,
        Channel::B11B12Ratio,
        Channel::B8B4Ratio,
        Channel::ElevationSquared,
    ];

    /// Channel name as spelled in model/scaler artifacts.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::B2 => "B2",
            Channel::B3 => "B3",
            Channel::B4 => "B4",
            Channel::B8 => "B8",
            Channel::B11 => "B11",
            Channel::B12 => "B12",
            Channel::HH => "HH",
            Channel::HV => "HV",
            Channel::Elevation => "elevation",
            Channel::Longitude => "longitude",
            Channel::Latitude => "latitude",
            Channel::Ndvi => "NDVI",
            Channel::Evi => "EVI",
            Channel::Nbr => "NBR",
            Channel::Msavi => "MSAVI",
            Channel::SarRatio => "SAR_ratio",
            Channel::SarDiff => "SAR_diff",
            Channel::SarLogRatio => "SAR_log_ratio",
            Channel::B11B12Ratio => "B11_B12_ratio",
            Channel::B8B4Ratio => "B8_B4_ratio",
            Channel::ElevationSquared => "elevation_squared",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw measured channels for one location, before index derivation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawChannels {
    pub b2: f64,
    pub b3: f64,
    pub b4: f64,
    pub b8: f64,
    pub b11: f64,
    pub b12: f64,
    pub hh: f64,
    pub hv: f64,
    pub elevation: f64,
    pub longitude: f64,
    pub latitude: f64,
}

/// Complete per-location feature set keyed by channel
#[derive(Debug, Clone, Default)]
pub struct FeatureVector {
    values: HashMap<Channel, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self {
            values: HashMap::with_capacity(Channel::ORDERED.len()),
        }
    }

    pub fn insert(&mut self, channel: Channel, value: f64) {
        self.values.insert(channel, value);
    }

    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.values.get(&channel).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the ordered inference array per [`Channel::ORDERED`].
    ///
    /// Fails if any channel is missing; the estimator absorbs that failure
    /// into its fallback path.
    pub fn to_array(&self) -> AgbResult<Array1<f64>> {
        let mut ordered = Vec::with_capacity(Channel::ORDERED.len());
        for channel in Channel::ORDERED {
            let value = self.values.get(&channel).copied().ok_or_else(|| {
                AgbError::Processing(format!("Feature vector missing channel: {}", channel))
            })?;
            ordered.push(value);
        }
        Ok(Array1::from_vec(ordered))
    }
}

/// Geographic point (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Where an estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    /// Scaled features ran through the regression model
    Model,
    /// Bounded pseudo-random draw after a model/scaler failure
    Fallback,
}

impl std::fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateSource::Model => write!(f, "model"),
            EstimateSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A single biomass estimate, tagged with its provenance
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Estimate {
    /// Above-ground biomass in Mg/ha
    pub agb_mg_ha: AgbValue,
    pub source: EstimateSource,
}

/// Carbon figures derived from a biomass value
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CarbonMetrics {
    /// Carbon stock in tonnes of carbon per hectare
    pub carbon_stock_t: f64,
    /// CO2-equivalent in tonnes per hectare
    pub co2_equivalent_t: f64,
}

/// Fixed output units for all responses
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Units {
    pub biomass: &'static str,
    pub carbon: &'static str,
    pub co2: &'static str,
}

impl Units {
    pub const fn standard() -> Self {
        Self {
            biomass: "Mg/ha",
            carbon: "t C",
            co2: "t CO2e",
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::standard()
    }
}

/// Point prediction response, rounded at the boundary
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Above-ground biomass in Mg/ha, within [2, 135] (model) or [10, 60] (fallback)
    pub agb_estimate: f64,
    pub carbon_stock: f64,
    pub co2_equivalent: f64,
    pub source: EstimateSource,
    pub units: Units,
}

/// Polygon prediction response: per-hectare figures plus area totals
#[derive(Debug, Clone, Serialize)]
pub struct PolygonEstimate {
    pub agb_per_hectare: f64,
    pub carbon_per_hectare: f64,
    pub co2_per_hectare: f64,
    pub total_carbon: f64,
    pub total_co2: f64,
    pub area_hectares: f64,
    pub source: EstimateSource,
    pub units: Units,
}

/// Error types for the estimation pipeline
#[derive(Debug, thiserror::Error)]
pub enum AgbError {
    /// Malformed caller input; maps to a 4xx-equivalent upstream
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model or scaler unavailable; absorbed by the fallback policy,
    /// never surfaced to callers
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Malformed or inconsistent model/scaler artifact
    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for estimation operations
pub type AgbResult<T> = Result<T, AgbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_ordering_matches_artifact_spelling() {
        let names: Vec<&str> = Channel::ORDERED.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "B2");
        assert_eq!(names[8], "elevation");
        assert_eq!(names[10], "latitude");
        assert_eq!(names[17], "SAR_log_ratio");
        assert_eq!(names[20], "elevation_squared");
    }

    #[test]
    fn test_feature_vector_ordering() {
        let mut fv = FeatureVector::new();
        for (i, channel) in Channel::ORDERED.iter().enumerate() {
            fv.insert(*channel, i as f64);
        }
        let array = fv.to_array().expect("complete vector");
        assert_eq!(array.len(), 21);
        for (i, value) in array.iter().enumerate() {
            assert_eq!(*value, i as f64);
        }
    }

    #[test]
    fn test_feature_vector_missing_channel() {
        let mut fv = FeatureVector::new();
        fv.insert(Channel::B2, 0.1);
        assert!(fv.to_array().is_err());
    }

    #[test]
    fn test_geo_point_wire_format() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"lat": -1.29, "lng": 36.82}"#).expect("vertex json");
        assert_eq!(point.lat, -1.29);
        assert_eq!(point.lon, 36.82);
    }
}
