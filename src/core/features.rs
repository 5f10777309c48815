use crate::types::{AgbError, AgbResult, Channel, FeatureVector, RawChannels};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Guard added to every denominator during index derivation
const EPS: f64 = 1e-8;

/// Validate WGS84 coordinates before any feature work.
pub fn validate_coordinates(lat: f64, lon: f64) -> AgbResult<()> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(AgbError::Validation(format!(
            "Coordinates must be finite numbers, got ({}, {})",
            lat, lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(AgbError::Validation(format!(
            "Latitude {} outside [-90, 90]",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(AgbError::Validation(format!(
            "Longitude {} outside [-180, 180]",
            lon
        )));
    }
    Ok(())
}

/// Source of raw spectral/radar/terrain channels for a location.
///
/// The pipeline only ever sees this trait, so the synthetic placeholder can
/// be swapped for a real remote-sensing retrieval service without touching
/// the estimator. A real implementation would be the one place in the crate
/// doing network I/O and should come with its own timeout/retry contract.
pub trait FeatureSource: Send + Sync {
    fn sample(&self, lat: f64, lon: f64) -> AgbResult<RawChannels>;
}

/// Biomass regime bands used by the synthetic placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BiomassRegime {
    /// ~30% of draws: degraded or cleared land
    Low,
    /// ~30%: regenerating canopy
    Developing,
    /// ~25%: established stands
    Viable,
    /// ~15%: dense, mature canopy
    Premium,
}

impl BiomassRegime {
    fn from_uniform(level: f64) -> Self {
        if level < 0.3 {
            BiomassRegime::Low
        } else if level < 0.6 {
            BiomassRegime::Developing
        } else if level < 0.85 {
            BiomassRegime::Viable
        } else {
            BiomassRegime::Premium
        }
    }

    /// Base near-infrared reflectance for this regime
    fn base_nir(&self) -> f64 {
        match self {
            BiomassRegime::Low => 0.2,
            BiomassRegime::Developing => 0.35,
            BiomassRegime::Viable => 0.5,
            BiomassRegime::Premium => 0.65,
        }
    }
}

/// Randomized stand-in for real remote-sensing retrieval.
///
/// Draws a biomass regime, fixes a base NIR reflectance with jitter, and
/// derives the remaining bands and radar channels through fixed linear
/// relationships. Produces a realistic spread of biomass predictions for
/// demos; replace with a real [`FeatureSource`] for production use.
pub struct SyntheticFeatureSource {
    rng: Mutex<StdRng>,
}

impl SyntheticFeatureSource {
    /// Entropy-seeded source for demo traffic.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic source for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SyntheticFeatureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for SyntheticFeatureSource {
    fn sample(&self, lat: f64, lon: f64) -> AgbResult<RawChannels> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AgbError::Processing("Synthetic source RNG lock poisoned".to_string()))?;

        let regime = BiomassRegime::from_uniform(rng.gen::<f64>());
        let b8 = match regime {
            // Low band gets a skewed jitter so it can reach toward the
            // developing band but not collapse to zero reflectance
            BiomassRegime::Low => regime.base_nir() + rng.gen_range(-0.05..0.1),
            _ => regime.base_nir() + rng.gen_range(-0.1..0.1),
        };
        log::debug!("Synthetic regime {:?} at ({:.4}, {:.4}), B8={:.3}", regime, lat, lon, b8);

        // Visible bands scale down from NIR
        let b4 = b8 * 0.6;
        let b3 = b4 * 0.8;
        let b2 = b3 * 0.9;

        // SWIR bands
        let b11 = 0.15 + rng.gen_range(-0.05..0.05);
        let b12 = 0.12 + rng.gen_range(-0.04..0.04);

        // Backscatter rises with canopy density
        let sar_base = -17.0 + b8 * 10.0;
        let hh = sar_base + rng.gen_range(-2.0..2.0);
        let hv = sar_base - 3.0 + rng.gen_range(-2.0..2.0);

        Ok(RawChannels {
            b2,
            b3,
            b4,
            b8,
            b11,
            b12,
            hh,
            hv,
            elevation: 500.0 + lat.abs() * 100.0,
            longitude: lon,
            latitude: lat,
        })
    }
}

/// Constant-channel source: the same reflectances for every location.
///
/// Useful for wiring tests and as a deterministic stand-in when the
/// synthetic spread is unwanted.
pub struct FixedFeatureSource;

impl FeatureSource for FixedFeatureSource {
    fn sample(&self, lat: f64, lon: f64) -> AgbResult<RawChannels> {
        Ok(RawChannels {
            b2: 822.0,
            b3: 1212.0,
            b4: 1510.0,
            b8: 2958.0,
            b11: 4034.0,
            b12: 3024.5,
            hh: 2804.0,
            hv: 1292.0,
            elevation: 42.0,
            longitude: lon,
            latitude: lat,
        })
    }
}

/// Compute the derived vegetation/radar indices from raw channels.
///
/// Formulas must match the ones used during model training exactly. Every
/// denominator carries the 1e-8 guard and the MSAVI discriminant is clamped
/// at zero, so all indices are finite for any finite input.
pub fn derive_indices(raw: &RawChannels) -> FeatureVector {
    let mut features = FeatureVector::new();

    features.insert(Channel::B2, raw.b2);
    features.insert(Channel::B3, raw.b3);
    features.insert(Channel::B4, raw.b4);
    features.insert(Channel::B8, raw.b8);
    features.insert(Channel::B11, raw.b11);
    features.insert(Channel::B12, raw.b12);
    features.insert(Channel::HH, raw.hh);
    features.insert(Channel::HV, raw.hv);
    features.insert(Channel::Elevation, raw.elevation);
    features.insert(Channel::Longitude, raw.longitude);
    features.insert(Channel::Latitude, raw.latitude);

    // Vegetation indices
    let ndvi = (raw.b8 - raw.b4) / (raw.b8 + raw.b4 + EPS);
    let evi = 2.5 * (raw.b8 - raw.b4) / (raw.b8 + 6.0 * raw.b4 - 7.5 * raw.b2 + 1.0 + EPS);
    let nbr = (raw.b8 - raw.b12) / (raw.b8 + raw.b12 + EPS);
    let msavi_disc = (2.0 * raw.b8 + 1.0).powi(2) - 8.0 * (raw.b8 - raw.b4);
    let msavi = (2.0 * raw.b8 + 1.0 - msavi_disc.max(0.0).sqrt()) / 2.0;
    features.insert(Channel::Ndvi, ndvi);
    features.insert(Channel::Evi, evi);
    features.insert(Channel::Nbr, nbr);
    features.insert(Channel::Msavi, msavi);

    // Radar features. The log ratio is recomputed from the raw channels so
    // the non-positive guard applies to the measurements, not the guarded
    // ratio above it.
    features.insert(Channel::SarRatio, raw.hh / (raw.hv + EPS));
    features.insert(Channel::SarDiff, raw.hh - raw.hv);
    let sar_log_ratio = if raw.hh > 0.0 && raw.hv > 0.0 {
        (raw.hh / raw.hv).ln()
    } else {
        0.0
    };
    features.insert(Channel::SarLogRatio, sar_log_ratio);

    // Band ratios
    features.insert(Channel::B11B12Ratio, raw.b11 / (raw.b12 + EPS));
    features.insert(Channel::B8B4Ratio, raw.b8 / (raw.b4 + EPS));

    // Topographic
    features.insert(Channel::ElevationSquared, raw.elevation * raw.elevation);

    features
}

/// Full synthesis step: validate coordinates, sample raw channels, derive
/// indices. Output covers every channel in [`Channel::ORDERED`].
pub fn synthesize(
    source: &dyn FeatureSource,
    lat: f64,
    lon: f64,
) -> AgbResult<FeatureVector> {
    validate_coordinates(lat, lon)?;
    let raw = source.sample(lat, lon)?;
    Ok(derive_indices(&raw))
}
