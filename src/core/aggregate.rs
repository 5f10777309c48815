use crate::core::carbon;
use crate::core::estimator::AgbEstimator;
use crate::core::features::{validate_coordinates, FeatureSource};
use crate::types::{AgbError, AgbResult, GeoPoint, PolygonEstimate, Units};

/// Arithmetic mean of vertex coordinates.
///
/// This is the unweighted vertex average, not the area-weighted (shoelace)
/// centroid, so it drifts on irregular shapes with uneven vertex spacing.
/// Kept as-is: the consumers draw near-convex plot boundaries.
pub fn centroid(vertices: &[GeoPoint]) -> AgbResult<GeoPoint> {
    if vertices.len() < 3 {
        return Err(AgbError::Validation(format!(
            "Need at least 3 coordinates for a polygon, got {}",
            vertices.len()
        )));
    }

    let n = vertices.len() as f64;
    let lat = vertices.iter().map(|v| v.lat).sum::<f64>() / n;
    let lon = vertices.iter().map(|v| v.lon).sum::<f64>() / n;
    Ok(GeoPoint::new(lat, lon))
}

/// Estimate per-hectare metrics at the polygon centroid and scale carbon
/// figures by the supplied area.
///
/// Validation failures (too few vertices, out-of-range vertices, non-finite
/// area) surface before any inference runs. `area_hectares <= 0` is not an
/// error; it simply zeroes the totals.
pub fn aggregate(
    estimator: &AgbEstimator,
    source: &dyn FeatureSource,
    vertices: &[GeoPoint],
    area_hectares: f64,
) -> AgbResult<PolygonEstimate> {
    for vertex in vertices {
        validate_coordinates(vertex.lat, vertex.lon)?;
    }
    let center = centroid(vertices)?;
    if !area_hectares.is_finite() {
        return Err(AgbError::Validation(format!(
            "Area must be a finite number of hectares, got {}",
            area_hectares
        )));
    }

    log::debug!(
        "Polygon centroid ({:.4}, {:.4}), {} vertices, {} ha",
        center.lat,
        center.lon,
        vertices.len(),
        area_hectares
    );

    let estimate = estimator.predict_at(source, center.lat, center.lon)?;
    let per_hectare = carbon::convert(estimate.agb_mg_ha);

    let effective_area = area_hectares.max(0.0);
    Ok(PolygonEstimate {
        agb_per_hectare: estimate.agb_mg_ha,
        carbon_per_hectare: per_hectare.carbon_stock_t,
        co2_per_hectare: per_hectare.co2_equivalent_t,
        total_carbon: per_hectare.carbon_stock_t * effective_area,
        total_co2: per_hectare.co2_equivalent_t * effective_area,
        area_hectares,
        source: estimate.source,
        units: Units::standard(),
    })
}
