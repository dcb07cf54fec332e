//! Operating parameters of one design point.

use ahu_core::numeric::{ensure_finite, ensure_fraction, ensure_non_negative};
use ahu_core::units::constants::AIR_SPECIFIC_HEAT;
use ahu_psychro::{PsyState, humidity_ratio};

use crate::error::{ElementError, ElementResult};

/// Default proportional gain of the indoor controllers.
pub const DEFAULT_GAIN: f64 = 1e10;

/// Temperature and relative humidity of an air stream or setpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirCondition {
    pub temperature: f64,
    pub relative_humidity: f64,
}

impl AirCondition {
    pub fn new(temperature: f64, relative_humidity: f64) -> Self {
        Self {
            temperature,
            relative_humidity,
        }
    }

    pub fn state(&self, altitude: f64) -> ElementResult<PsyState> {
        Ok(PsyState::from_relative_humidity(
            self.temperature,
            self.relative_humidity,
            altitude,
        )?)
    }
}

/// How much outdoor air enters the unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutdoorAir {
    /// Fraction α of the supply flow.
    Fraction(f64),
    /// Absolute dry-air flow, kg/s.
    Flow(f64),
}

/// Steady-state envelope of the conditioned building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Overall conductance, W/K.
    pub ua: f64,
    /// Infiltration dry-air flow, kg/s.
    pub infiltration: f64,
    /// Auxiliary sensible load, W.
    pub sensible_load: f64,
    /// Auxiliary latent load, W.
    pub latent_load: f64,
}

/// Controller row encoding.
///
/// `Proportional(k)` writes `k·x + Q = k·setpoint`; the controlled variable
/// then misses its setpoint by `Q/k`, so `k` acts as a tolerance knob.
/// `Exact` writes `x = setpoint`. `Off` writes `Q = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gain {
    Exact,
    Proportional(f64),
    Off,
}

impl Default for Gain {
    fn default() -> Self {
        Gain::Proportional(DEFAULT_GAIN)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerGains {
    pub temperature: Gain,
    pub humidity: Gain,
}

/// Scalars of one network solve.
///
/// The free-parameter search works on a copy and changes only the parameter
/// under search.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingParameters {
    /// Supply dry-air mass flow `m`, kg/s.
    pub supply_flow: f64,
    pub outdoor_air: OutdoorAir,
    /// Coil by-pass fraction `β`.
    pub bypass: f64,
    pub outdoor: AirCondition,
    pub indoor_setpoint: AirCondition,
    pub envelope: Envelope,
    pub gains: ControllerGains,
    /// Altitude of the site, m.
    pub altitude: f64,
}

impl OperatingParameters {
    /// All outdoor air, no by-pass, default gains, sea level.
    pub fn new(
        supply_flow: f64,
        outdoor: AirCondition,
        indoor_setpoint: AirCondition,
        envelope: Envelope,
    ) -> Self {
        Self {
            supply_flow,
            outdoor_air: OutdoorAir::Fraction(1.0),
            bypass: 0.0,
            outdoor,
            indoor_setpoint,
            envelope,
            gains: ControllerGains::default(),
            altitude: 0.0,
        }
    }

    pub fn with_outdoor_air(mut self, outdoor_air: OutdoorAir) -> Self {
        self.outdoor_air = outdoor_air;
        self
    }

    pub fn with_bypass(mut self, bypass: f64) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn with_gains(mut self, gains: ControllerGains) -> Self {
        self.gains = gains;
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Reject non-finite or out-of-range scalars before any row is written.
    pub fn validate(&self) -> ElementResult<()> {
        ensure_non_negative(self.supply_flow, "supply flow")?;
        ensure_fraction(self.bypass, "bypass")?;
        match self.outdoor_air {
            OutdoorAir::Fraction(alpha) => {
                ensure_fraction(alpha, "outdoor air fraction")?;
            }
            OutdoorAir::Flow(mo) => {
                // The recirculated share `m − mo` must stay non-negative.
                if ensure_non_negative(mo, "outdoor air flow")? > self.supply_flow {
                    return Err(ElementError::InvalidArg {
                        what: "outdoor air flow exceeds supply flow",
                    });
                }
            }
        }
        ensure_finite(self.outdoor.temperature, "outdoor temperature")?;
        ensure_finite(self.indoor_setpoint.temperature, "indoor setpoint temperature")?;
        ensure_non_negative(self.envelope.ua, "UA")?;
        ensure_non_negative(self.envelope.infiltration, "infiltration")?;
        ensure_finite(self.envelope.sensible_load, "sensible load")?;
        ensure_finite(self.envelope.latent_load, "latent load")?;
        ensure_finite(self.altitude, "altitude")?;
        for gain in [self.gains.temperature, self.gains.humidity] {
            if let Gain::Proportional(k) = gain {
                if !(k.is_finite() && k > 0.0) {
                    return Err(ElementError::InvalidArg {
                        what: "controller gain",
                    });
                }
            }
        }
        Ok(())
    }

    /// Outdoor dry-air flow, kg/s.
    pub fn outdoor_flow(&self) -> f64 {
        match self.outdoor_air {
            OutdoorAir::Fraction(alpha) => alpha * self.supply_flow,
            OutdoorAir::Flow(mo) => mo,
        }
    }

    /// Recirculated dry-air flow, kg/s.
    pub fn recirculated_flow(&self) -> f64 {
        self.supply_flow - self.outdoor_flow()
    }

    pub fn outdoor_state(&self) -> ElementResult<PsyState> {
        self.outdoor.state(self.altitude)
    }

    /// Humidity ratio of the indoor setpoint.
    pub fn indoor_humidity_setpoint(&self) -> ElementResult<f64> {
        Ok(humidity_ratio(
            self.indoor_setpoint.temperature,
            self.indoor_setpoint.relative_humidity,
            self.altitude,
        )?)
    }
}

/// Which part of the supply flow crosses an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Share {
    /// The whole supply flow `m`.
    Supply,
    /// Outdoor air, `α·m` or the absolute outdoor flow.
    OutdoorAir,
    /// Recirculated indoor air, `m` minus the outdoor flow.
    Recirculated,
    /// Air by-passing a coil or humidifier, `β·m`.
    Bypass,
    /// Air treated by a coil or humidifier, `(1 − β)·m`.
    Treated,
}

impl Share {
    /// Dry-air flow of this share, kg/s.
    pub fn flow(self, params: &OperatingParameters) -> f64 {
        let m = params.supply_flow;
        match self {
            Share::Supply => m,
            Share::OutdoorAir => params.outdoor_flow(),
            Share::Recirculated => params.recirculated_flow(),
            Share::Bypass => params.bypass * m,
            Share::Treated => (1.0 - params.bypass) * m,
        }
    }
}

/// Supply flow that holds the indoor setpoint at design conditions when air
/// is supplied at `supply_temperature`:
/// `QsZ = (UA + mi·c)(θO − θI) + Qsa`, `m = −QsZ / (c(θS − θI))`.
pub fn design_supply_flow(
    design: &OperatingParameters,
    supply_temperature: f64,
) -> ElementResult<f64> {
    let supply_temperature = ensure_finite(supply_temperature, "supply temperature")?;
    let env = &design.envelope;
    let indoor = design.indoor_setpoint.temperature;
    let delta_supply = supply_temperature - indoor;
    if delta_supply == 0.0 {
        return Err(ElementError::InvalidArg {
            what: "supply temperature equals indoor setpoint",
        });
    }
    let zone_load = (env.ua + env.infiltration * AIR_SPECIFIC_HEAT)
        * (design.outdoor.temperature - indoor)
        + env.sensible_load;
    let m = -zone_load / (AIR_SPECIFIC_HEAT * delta_supply);
    if m < 0.0 {
        return Err(ElementError::InvalidArg {
            what: "supply temperature on the wrong side of the indoor setpoint",
        });
    }
    Ok(m)
}
