//! Psychrometric state of a network node.

use ahu_core::units::constants::{AIR_SPECIFIC_HEAT, LATENT_HEAT};

use crate::error::{PsychroError, PsychroResult};
use crate::properties;

/// A point on the psychrometric chart: temperature (°C) and humidity ratio
/// (kg/kg).
///
/// Derived attributes are computed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsyState {
    pub temperature: f64,
    pub humidity_ratio: f64,
}

impl PsyState {
    /// Validates that both values are finite and the humidity ratio is not
    /// negative.
    pub fn new(temperature: f64, humidity_ratio: f64) -> PsychroResult<Self> {
        if !temperature.is_finite() {
            return Err(PsychroError::domain("temperature", temperature));
        }
        if !humidity_ratio.is_finite() || humidity_ratio < 0.0 {
            return Err(PsychroError::domain("humidity ratio", humidity_ratio));
        }
        Ok(Self {
            temperature,
            humidity_ratio,
        })
    }

    pub fn from_relative_humidity(
        temperature: f64,
        relative_humidity: f64,
        altitude: f64,
    ) -> PsychroResult<Self> {
        let w = properties::humidity_ratio(temperature, relative_humidity, altitude)?;
        Self::new(temperature, w)
    }

    /// Saturated state at `temperature`.
    pub fn saturated(temperature: f64, altitude: f64) -> PsychroResult<Self> {
        Self::from_relative_humidity(temperature, 1.0, altitude)
    }

    pub fn relative_humidity(&self, altitude: f64) -> PsychroResult<f64> {
        properties::relative_humidity(self.temperature, self.humidity_ratio, altitude)
    }

    pub fn specific_volume(&self, altitude: f64) -> PsychroResult<f64> {
        properties::specific_volume(self.temperature, self.humidity_ratio, altitude)
    }

    /// Linear enthalpy `c·θ + l·w` used by the balance equations, J/kg.
    pub fn enthalpy(&self) -> f64 {
        AIR_SPECIFIC_HEAT * self.temperature + LATENT_HEAT * self.humidity_ratio
    }

    /// Humidity ratio above saturation (positive when supersaturated).
    pub fn saturation_excess(&self, altitude: f64) -> PsychroResult<f64> {
        let ws = properties::saturation_humidity_ratio(self.temperature, altitude)?;
        Ok(self.humidity_ratio - ws)
    }

    pub fn is_supersaturated(&self, altitude: f64) -> PsychroResult<bool> {
        Ok(self.saturation_excess(altitude)? > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_humidity_ratio() {
        assert!(PsyState::new(20.0, -1e-6).is_err());
        assert!(PsyState::new(f64::INFINITY, 0.01).is_err());
        assert!(PsyState::new(20.0, 0.0).is_ok());
    }

    #[test]
    fn saturated_state_has_unit_relative_humidity() {
        let s = PsyState::saturated(12.0, 0.0).unwrap();
        assert!((s.relative_humidity(0.0).unwrap() - 1.0).abs() < 1e-9);
        assert!(s.saturation_excess(0.0).unwrap().abs() < 1e-15);
        assert!(!s.is_supersaturated(0.0).unwrap());
    }

    #[test]
    fn mixed_fog_is_supersaturated() {
        // Equal parts of 0 °C/80 % and 32 °C/95 % air.
        let a = PsyState::from_relative_humidity(0.0, 0.8, 0.0).unwrap();
        let b = PsyState::from_relative_humidity(32.0, 0.95, 0.0).unwrap();
        let mix = PsyState::new(
            0.5 * (a.temperature + b.temperature),
            0.5 * (a.humidity_ratio + b.humidity_ratio),
        )
        .unwrap();
        assert!(mix.is_supersaturated(0.0).unwrap());
    }

    #[test]
    fn enthalpy_is_linear() {
        let s = PsyState::new(20.0, 0.01).unwrap();
        assert!((s.enthalpy() - (20_000.0 + 24_960.0)).abs() < 1e-9);
    }
}
