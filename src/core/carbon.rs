use crate::types::CarbonMetrics;

/// Fraction of dry biomass mass attributable to elemental carbon
/// (IPCC default). The single canonical constant for every
/// biomass-to-carbon conversion in the crate.
pub const CARBON_FRACTION: f64 = 0.47;

/// CO2:C molar mass ratio (44/12)
pub const CO2_PER_TONNE_CARBON: f64 = 3.67;

/// Convert a biomass value (Mg/ha) to carbon stock and CO2-equivalent.
///
/// Pure stoichiometry, full precision; rounding happens only at the
/// response boundary.
pub fn convert(agb_mg_per_ha: f64) -> CarbonMetrics {
    let carbon_stock_t = agb_mg_per_ha * CARBON_FRACTION;
    CarbonMetrics {
        carbon_stock_t,
        co2_equivalent_t: carbon_stock_t * CO2_PER_TONNE_CARBON,
    }
}

/// Round to 2 decimal places for response payloads.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
