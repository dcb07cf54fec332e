// ahu-core/src/units.rs

use uom::si::f64::{
    Power as UomPower, Ratio as UomRatio, ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Canonical unit types (SI, f64) behind the reporting conversions
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Absolute temperature in kelvin for a Celsius reading.
#[inline]
pub fn celsius_to_kelvin(t: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    celsius(t).get::<kelvin>()
}

/// Heat flow in kilowatts for a value in watts.
#[inline]
pub fn watts_to_kw(q: f64) -> f64 {
    use uom::si::power::kilowatt;
    watts(q).get::<kilowatt>()
}

/// Humidity ratio in g/kg for a value in kg/kg.
#[inline]
pub fn per_mille(w: f64) -> f64 {
    use uom::si::ratio::per_mille;
    unitless(w).get::<per_mille>()
}

/// Relative humidity in percent for a fraction.
#[inline]
pub fn percent(phi: f64) -> f64 {
    use uom::si::ratio::percent;
    unitless(phi).get::<percent>()
}

pub mod constants {
    /// Specific heat of dry air, J/(kg K).
    pub const AIR_SPECIFIC_HEAT: f64 = 1e3;
    /// Latent heat of vaporization of water, J/kg.
    pub const LATENT_HEAT: f64 = 2496e3;
    /// Standard atmospheric pressure at sea level, Pa.
    pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporting_conversions() {
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < 1e-9);
        assert!((watts_to_kw(150_021.0) - 150.021).abs() < 1e-9);
        assert!((per_mille(6.4025e-3) - 6.4025).abs() < 1e-9);
        assert!((percent(0.49) - 49.0).abs() < 1e-9);
    }
}
