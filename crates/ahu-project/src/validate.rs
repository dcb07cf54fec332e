//! Project validation logic.

use std::collections::HashSet;

use ahu_core::{AhuError, ensure_finite, ensure_fraction, ensure_non_negative};

use crate::schema::{
    AirConditionDef, DesignPointDef, GainDef, OutdoorAirDef, Project, SaturationDef, SearchDef,
    SupplyFlowDef, SweepDef, SweepVariableDef, TargetDef,
};

/// Highest file version this crate reads.
pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field} in design point '{design_point}'")]
    MissingField {
        field: &'static str,
        design_point: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(point: &str, field: &str, value: f64, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: format!("{point}.{field}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Lift a numeric check from `ahu_core` into a field-tagged validation error.
fn check(
    point: &str,
    field: &'static str,
    value: f64,
    f: fn(f64, &'static str) -> Result<f64, AhuError>,
) -> Result<(), ValidationError> {
    f(value, field)
        .map(|_| ())
        .map_err(|e| invalid(point, field, value, e))
}

fn positive(point: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    check(point, field, value, ensure_finite)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(point, field, value, "must be positive"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut ids = HashSet::new();
    for point in &project.design_points {
        if !ids.insert(point.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: point.id.clone(),
                context: "design_points".to_string(),
            });
        }
        validate_design_point(point)?;
    }

    let mut sweep_ids = HashSet::new();
    for sweep in &project.sweeps {
        if !sweep_ids.insert(sweep.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: sweep.id.clone(),
                context: "sweeps".to_string(),
            });
        }
        if !ids.contains(sweep.design_point_id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: sweep.design_point_id.clone(),
                context: format!("sweep '{}'", sweep.id),
            });
        }
        validate_sweep(sweep)?;
    }

    Ok(())
}

fn validate_condition(
    point: &str,
    condition: &AirConditionDef,
    temperature: &'static str,
    humidity: &'static str,
) -> Result<(), ValidationError> {
    check(point, temperature, condition.temperature_c, ensure_finite)?;
    check(point, humidity, condition.relative_humidity, ensure_fraction)
}

pub(crate) fn validate_design_point(point: &DesignPointDef) -> Result<(), ValidationError> {
    let id = point.id.as_str();
    validate_condition(id, &point.outdoor, "outdoor.temperature_c", "outdoor.relative_humidity")?;
    if let crate::schema::UnitDef::Mixing { second_inlet } = &point.unit {
        validate_condition(
            id,
            second_inlet,
            "unit.second_inlet.temperature_c",
            "unit.second_inlet.relative_humidity",
        )?;
    }

    if point.unit.has_zone() {
        let setpoint = point
            .indoor_setpoint
            .as_ref()
            .ok_or_else(|| ValidationError::MissingField {
                field: "indoor_setpoint",
                design_point: point.id.clone(),
            })?;
        validate_condition(
            id,
            setpoint,
            "indoor_setpoint.temperature_c",
            "indoor_setpoint.relative_humidity",
        )?;
        let envelope = point
            .envelope
            .as_ref()
            .ok_or_else(|| ValidationError::MissingField {
                field: "envelope",
                design_point: point.id.clone(),
            })?;
        check(id, "envelope.ua_w_per_k", envelope.ua_w_per_k, ensure_non_negative)?;
        check(
            id,
            "envelope.infiltration_kg_s",
            envelope.infiltration_kg_s,
            ensure_non_negative,
        )?;
        check(id, "envelope.sensible_load_w", envelope.sensible_load_w, ensure_finite)?;
        check(id, "envelope.latent_load_w", envelope.latent_load_w, ensure_finite)?;
    }

    match point.supply {
        SupplyFlowDef::Fixed { flow_kg_s } => {
            check(id, "supply.flow_kg_s", flow_kg_s, ensure_non_negative)?;
        }
        SupplyFlowDef::Design {
            supply_temperature_c,
            infiltration_kg_s,
        } => {
            if !point.unit.has_zone() {
                return Err(invalid(
                    id,
                    "supply.supply_temperature_c",
                    supply_temperature_c,
                    "design sizing needs a conditioned zone",
                ));
            }
            check(id, "supply.supply_temperature_c", supply_temperature_c, ensure_finite)?;
            if let Some(mi) = infiltration_kg_s {
                check(id, "supply.infiltration_kg_s", mi, ensure_non_negative)?;
            }
        }
    }

    match point.outdoor_air {
        OutdoorAirDef::Fraction { alpha } => {
            check(id, "outdoor_air.alpha", alpha, ensure_fraction)?;
        }
        OutdoorAirDef::Flow { flow_kg_s } => {
            check(id, "outdoor_air.flow_kg_s", flow_kg_s, ensure_non_negative)?;
            if let SupplyFlowDef::Fixed { flow_kg_s: m } = point.supply {
                if flow_kg_s > m {
                    return Err(invalid(
                        id,
                        "outdoor_air.flow_kg_s",
                        flow_kg_s,
                        "exceeds the supply flow",
                    ));
                }
            }
        }
    }
    check(id, "bypass", point.bypass, ensure_fraction)?;
    check(id, "altitude_m", point.altitude_m, ensure_finite)?;

    for (field, gain) in [
        ("gains.temperature", point.gains.temperature),
        ("gains.humidity", point.gains.humidity),
    ] {
        if let GainDef::Proportional { gain } = gain {
            positive(id, field, gain)?;
        }
    }

    validate_saturation(id, &point.saturation)?;
    if let Some(search) = &point.search {
        validate_search(id, search)?;
    }
    Ok(())
}

fn validate_saturation(point: &str, s: &SaturationDef) -> Result<(), ValidationError> {
    check(point, "saturation.initial_temperature_c", s.initial_temperature_c, ensure_finite)?;
    if let Some(tol) = s.tolerance {
        positive(point, "saturation.tolerance", tol)?;
    }
    if s.max_iterations == 0 {
        return Err(invalid(
            point,
            "saturation.max_iterations",
            0.0,
            "at least one iteration",
        ));
    }
    if !(s.damping > 0.0 && s.damping <= 1.0) {
        return Err(invalid(point, "saturation.damping", s.damping, "must be in (0, 1]"));
    }
    if let Some(budget) = s.time_budget_s {
        positive(point, "saturation.time_budget_s", budget)?;
    }
    Ok(())
}

fn validate_search(point: &str, s: &SearchDef) -> Result<(), ValidationError> {
    if s.target.node().is_empty() {
        return Err(ValidationError::MissingReference {
            id: String::new(),
            context: format!("search target of '{point}'"),
        });
    }
    match &s.target {
        TargetDef::Temperature { setpoint_c, .. } => {
            check(point, "search.target.setpoint_c", *setpoint_c, ensure_finite)?;
        }
        TargetDef::HumidityRatio { setpoint, .. } => {
            check(point, "search.target.setpoint", *setpoint, ensure_non_negative)?;
        }
        TargetDef::RelativeHumidity { setpoint, .. } => {
            check(point, "search.target.setpoint", *setpoint, ensure_fraction)?;
        }
    }
    if let Some([lo, hi]) = s.bounds {
        check(point, "search.bounds", lo, ensure_finite)?;
        check(point, "search.bounds", hi, ensure_finite)?;
        if lo >= hi {
            return Err(invalid(point, "search.bounds", hi, "upper bound not above lower"));
        }
    }
    if let Some(x0) = s.initial_guess {
        check(point, "search.initial_guess", x0, ensure_finite)?;
    }
    if let Some(threshold) = s.cost_threshold {
        positive(point, "search.cost_threshold", threshold)?;
    }
    if let Some(budget) = s.time_budget_s {
        positive(point, "search.time_budget_s", budget)?;
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepDef) -> Result<(), ValidationError> {
    if sweep.values.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.values", sweep.id),
            value: "[]".to_string(),
            reason: "a sweep needs at least one value".to_string(),
        });
    }
    let f: fn(f64, &'static str) -> Result<f64, AhuError> = match sweep.variable {
        SweepVariableDef::OutdoorTemperature => ensure_finite,
        SweepVariableDef::OutdoorRelativeHumidity
        | SweepVariableDef::OutdoorAirFraction
        | SweepVariableDef::Bypass => ensure_fraction,
        SweepVariableDef::SupplyFlow => ensure_non_negative,
    };
    for &v in &sweep.values {
        check(&sweep.id, sweep.variable.label(), v, f)?;
    }
    Ok(())
}
