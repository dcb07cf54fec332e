//! Moist-air property functions.
//!
//! Temperatures are in °C, humidity ratios in kg of vapor per kg of dry air,
//! pressures in Pa and altitudes in m. Every function is pure.

use ahu_core::numeric::ensure_finite;
use ahu_core::units::{celsius_to_kelvin, constants::SEA_LEVEL_PRESSURE};

use crate::error::{PsychroError, PsychroResult};

/// Molar mass of water vapor, kg/kmol.
pub const MOLAR_MASS_VAPOR: f64 = 18.015_28;
/// Molar mass of dry air, kg/kmol.
pub const MOLAR_MASS_DRY_AIR: f64 = 28.9645;
/// Universal gas constant, J/(kmol K).
pub const GAS_CONSTANT: f64 = 8320.0;
/// Ratio of molar masses, `Mv / Mda`.
pub const MOLAR_MASS_RATIO: f64 = MOLAR_MASS_VAPOR / MOLAR_MASS_DRY_AIR;

// Hyland-Wexler saturation pressure over liquid water.
const C8: f64 = -5.800_220_6e3;
const C9: f64 = 1.391_499_3;
const C10: f64 = -4.864_023_9e-2;
const C11: f64 = 4.176_476_8e-5;
const C12: f64 = -1.445_209_3e-8;
const C13: f64 = 6.545_967_3;

/// Bracket of the inverse temperature lookup, °C.
pub const INVERSE_BRACKET: (f64, f64) = (-40.0, 90.0);

const INVERSE_MAX_ITER: usize = 100;
const INVERSE_TOL: f64 = 1e-9;

/// Static pressure of the standard atmosphere at `altitude`.
pub fn pressure_at_altitude(altitude: f64) -> PsychroResult<f64> {
    let z = ensure_finite(altitude, "altitude")?;
    let base = 1.0 - 2.25577e-5 * z;
    if base <= 0.0 {
        return Err(PsychroError::domain("altitude", altitude));
    }
    Ok(SEA_LEVEL_PRESSURE * base.powf(5.2559))
}

fn absolute_temperature(temperature: f64) -> PsychroResult<f64> {
    let t = ensure_finite(temperature, "temperature")?;
    let abs_t = celsius_to_kelvin(t);
    if abs_t <= 0.0 {
        return Err(PsychroError::domain("temperature", temperature));
    }
    Ok(abs_t)
}

/// Saturation vapor pressure, Pa.
pub fn saturation_pressure(temperature: f64) -> PsychroResult<f64> {
    let tk = absolute_temperature(temperature)?;
    Ok((C8 / tk + C9 + C10 * tk + C11 * tk * tk + C12 * tk * tk * tk + C13 * tk.ln()).exp())
}

/// `d ln(pvs) / dT`, 1/K.
fn log_saturation_pressure_slope(tk: f64) -> f64 {
    -C8 / (tk * tk) + C10 + 2.0 * C11 * tk + 3.0 * C12 * tk * tk + C13 / tk
}

/// Humidity ratio of air at `temperature` and `relative_humidity`.
///
/// Fails with [`PsychroError::Domain`] when the vapor pressure `φ·pvs(t)`
/// reaches the static pressure.
pub fn humidity_ratio(
    temperature: f64,
    relative_humidity: f64,
    altitude: f64,
) -> PsychroResult<f64> {
    let phi = ensure_finite(relative_humidity, "relative humidity")?;
    if phi < 0.0 {
        return Err(PsychroError::domain("relative humidity", phi));
    }
    let p = pressure_at_altitude(altitude)?;
    let pv = phi * saturation_pressure(temperature)?;
    if pv >= p {
        return Err(PsychroError::domain("vapor pressure", pv));
    }
    Ok(MOLAR_MASS_RATIO * pv / (p - pv))
}

/// Humidity ratio on the saturation curve.
pub fn saturation_humidity_ratio(temperature: f64, altitude: f64) -> PsychroResult<f64> {
    humidity_ratio(temperature, 1.0, altitude)
}

/// Slope `dw/dt` of the saturation curve at `temperature`, kg/(kg K).
///
/// Exact derivative of `humidity_ratio(t, 1.0)`:
/// `(Mv/Mda) · p · pvs'(t) / (p − pvs(t))²`.
pub fn saturation_slope(temperature: f64, altitude: f64) -> PsychroResult<f64> {
    let p = pressure_at_altitude(altitude)?;
    let tk = absolute_temperature(temperature)?;
    let pvs = saturation_pressure(temperature)?;
    if pvs >= p {
        return Err(PsychroError::domain("saturation pressure", pvs));
    }
    let dpvs = pvs * log_saturation_pressure_slope(tk);
    Ok(MOLAR_MASS_RATIO * p * dpvs / ((p - pvs) * (p - pvs)))
}

fn check_humidity_ratio(w: f64) -> PsychroResult<f64> {
    let w = ensure_finite(w, "humidity ratio")?;
    if w < 0.0 {
        return Err(PsychroError::domain("humidity ratio", w));
    }
    Ok(w)
}

/// Relative humidity of air at `temperature` with humidity ratio `w`.
pub fn relative_humidity(temperature: f64, w: f64, altitude: f64) -> PsychroResult<f64> {
    let w = check_humidity_ratio(w)?;
    let p = pressure_at_altitude(altitude)?;
    let pvs = saturation_pressure(temperature)?;
    Ok(p * w / (pvs * (MOLAR_MASS_RATIO + w)))
}

/// Specific volume of moist air, m³ per kg of dry air.
pub fn specific_volume(temperature: f64, w: f64, altitude: f64) -> PsychroResult<f64> {
    let w = check_humidity_ratio(w)?;
    let p = pressure_at_altitude(altitude)?;
    let tk = absolute_temperature(temperature)?;
    Ok(GAS_CONSTANT / MOLAR_MASS_VAPOR * (MOLAR_MASS_RATIO + w) * tk / p)
}

/// Temperature at which air of relative humidity `relative_humidity` holds
/// humidity ratio `w`.
///
/// Newton iteration from 20 °C, safeguarded by bisection inside
/// [`INVERSE_BRACKET`]. Temperatures where the vapor pressure would exceed
/// the static pressure count as lying above the root.
pub fn temperature_from_w_phi(
    w: f64,
    relative_humidity: f64,
    altitude: f64,
) -> PsychroResult<f64> {
    let w = check_humidity_ratio(w)?;
    let phi = ensure_finite(relative_humidity, "relative humidity")?;
    if phi <= 0.0 {
        return Err(PsychroError::domain("relative humidity", phi));
    }
    let p = pressure_at_altitude(altitude)?;
    let (mut lo, mut hi) = INVERSE_BRACKET;

    // Residual and derivative; `None` above the physically valid range.
    let eval = |t: f64| -> PsychroResult<Option<(f64, f64)>> {
        let tk = absolute_temperature(t)?;
        let pv = phi * saturation_pressure(t)?;
        if pv >= p {
            return Ok(None);
        }
        let f = MOLAR_MASS_RATIO * pv / (p - pv) - w;
        let df =
            MOLAR_MASS_RATIO * p * pv * log_saturation_pressure_slope(tk) / ((p - pv) * (p - pv));
        Ok(Some((f, df)))
    };

    let no_root = PsychroError::NoRoot {
        what: "temperature from humidity ratio",
        lo,
        hi,
    };
    match eval(lo)? {
        Some((f_lo, _)) if f_lo <= 0.0 => {}
        _ => return Err(no_root),
    }
    if let Some((f_hi, _)) = eval(hi)? {
        if f_hi < 0.0 {
            return Err(no_root);
        }
    }

    let mut t = 20.0_f64.clamp(lo, hi);
    for _ in 0..INVERSE_MAX_ITER {
        let Some((f, df)) = eval(t)? else {
            hi = t;
            t = 0.5 * (lo + hi);
            continue;
        };
        if f.abs() < 1e-14 {
            return Ok(t);
        }
        if f > 0.0 {
            hi = t;
        } else {
            lo = t;
        }
        let newton = t - f / df;
        let next = if df > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if (next - t).abs() < INVERSE_TOL {
            return Ok(next);
        }
        t = next;
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_err(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs()
    }

    #[test]
    fn saturation_pressure_reference_values() {
        assert!(rel_err(saturation_pressure(0.0).unwrap(), 611.2) < 1e-3);
        assert!(rel_err(saturation_pressure(20.0).unwrap(), 2338.8) < 1e-3);
        assert!(rel_err(saturation_pressure(-1.0).unwrap(), 568.2) < 1e-3);
    }

    #[test]
    fn saturation_pressure_is_monotonic() {
        let mut prev = saturation_pressure(-20.0).unwrap();
        for i in 1..=80 {
            let p = saturation_pressure(-20.0 + i as f64).unwrap();
            assert!(p > prev);
            prev = p;
        }
    }

    #[test]
    fn humidity_ratio_reference_values() {
        assert!(rel_err(humidity_ratio(-1.0, 1.0, 0.0).unwrap(), 3.5076e-3) < 1e-3);
        assert!(rel_err(humidity_ratio(18.0, 0.5, 0.0).unwrap(), 6.4010e-3) < 1e-3);
        assert!(rel_err(humidity_ratio(26.0, 0.5, 0.0).unwrap(), 1.0496e-2) < 1e-3);
    }

    #[test]
    fn altitude_lowers_pressure_and_raises_w() {
        let p = pressure_at_altitude(1000.0).unwrap();
        assert!(rel_err(p, 89_874.5) < 1e-4);
        let w = humidity_ratio(20.0, 0.5, 1000.0).unwrap();
        assert!(rel_err(w, 8.1996e-3) < 1e-3);
        assert!(w > humidity_ratio(20.0, 0.5, 0.0).unwrap());
    }

    #[test]
    fn invalid_relative_humidity_is_domain_error() {
        assert!(matches!(
            humidity_ratio(20.0, -0.1, 0.0),
            Err(PsychroError::Domain { .. })
        ));
        // φ·pvs(t) above the static pressure
        assert!(matches!(
            humidity_ratio(20.0, 50.0, 0.0),
            Err(PsychroError::Domain { .. })
        ));
        assert!(matches!(
            humidity_ratio(f64::NAN, 0.5, 0.0),
            Err(PsychroError::Domain { .. })
        ));
    }

    #[test]
    fn slope_matches_finite_difference() {
        for t in [-10.0, 0.0, 5.0, 15.0, 30.0, 45.0] {
            let h = 1e-4;
            let fd = (saturation_humidity_ratio(t + h, 0.0).unwrap()
                - saturation_humidity_ratio(t - h, 0.0).unwrap())
                / (2.0 * h);
            let exact = saturation_slope(t, 0.0).unwrap();
            assert!(rel_err(exact, fd) < 1e-6, "t = {t}: {exact} vs {fd}");
        }
    }

    #[test]
    fn specific_volume_reference_value() {
        let v = specific_volume(20.0, 0.0073, 0.0).unwrap();
        assert!(rel_err(v, 0.84081) < 1e-4);
        assert!(specific_volume(20.0, -0.001, 0.0).is_err());
    }

    #[test]
    fn inverse_recovers_reference_temperature() {
        let t = temperature_from_w_phi(3.5076e-3, 1.0, 0.0).unwrap();
        assert!((t - (-1.0)).abs() < 1e-2);
    }

    #[test]
    fn inverse_fails_without_root() {
        // Dry air has no dew point.
        assert!(matches!(
            temperature_from_w_phi(0.0, 0.5, 0.0),
            Err(PsychroError::NoRoot { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn saturation_consistency(t in -20.0_f64..50.0, phi in 0.001_f64..=1.0) {
            let w = humidity_ratio(t, phi, 0.0).unwrap();
            let back = relative_humidity(t, w, 0.0).unwrap();
            prop_assert!((back - phi).abs() < 1e-6);
        }

        #[test]
        fn inverse_round_trip(t in -20.0_f64..50.0, phi in 0.05_f64..=1.0) {
            let w = humidity_ratio(t, phi, 0.0).unwrap();
            let back = temperature_from_w_phi(w, phi, 0.0).unwrap();
            prop_assert!((back - t).abs() < 1e-3);
        }

        #[test]
        fn humidity_ratio_grows_with_temperature(t in -20.0_f64..49.0, phi in 0.1_f64..=1.0) {
            let w0 = humidity_ratio(t, phi, 0.0).unwrap();
            let w1 = humidity_ratio(t + 1.0, phi, 0.0).unwrap();
            prop_assert!(w1 > w0);
            prop_assert!(saturation_slope(t, 0.0).unwrap() > 0.0);
        }
    }
}
