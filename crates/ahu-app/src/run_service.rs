//! Design-point execution: single runs, whole projects, and sweeps.

use ahu_core::Timer;
use ahu_elements::{OperatingParameters, OutdoorAir};
use ahu_project::schema::{Project, SweepVariableDef};
use ahu_solver::{FreeParameter, NetworkSolution, find_parameter, solve};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::compile::{CompiledPoint, Variant, compile_design_point, nodes};
use crate::error::{AppError, AppResult};
use crate::project_service;
use crate::report::{Report, build_report};

/// Outcome of the free-parameter search of a design point.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    pub parameter: FreeParameter,
    pub value: f64,
    pub cost: f64,
    pub evaluations: usize,
}

/// Response from a design-point run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub id: String,
    pub name: String,
    /// Layout actually solved.
    pub variant: Variant,
    /// Parameters of the accepted solution (search value substituted).
    pub params: OperatingParameters,
    pub solution: NetworkSolution,
    pub search: Option<SearchSummary>,
    pub report: Report,
    pub solve_time_s: f64,
}

/// One value of a sweep and its run.
#[derive(Debug)]
pub struct SweepPoint {
    pub value: f64,
    pub result: AppResult<RunResponse>,
}

#[derive(Debug)]
pub struct SweepResponse {
    pub sweep_id: String,
    pub design_point_id: String,
    pub variable: SweepVariableDef,
    /// In the order of the sweep values.
    pub points: Vec<SweepPoint>,
}

/// Run a compiled design point with its own parameters.
pub fn run_point(point: &CompiledPoint) -> AppResult<RunResponse> {
    run_point_with(point, &point.params)
}

/// Run a compiled design point with substituted parameters.
///
/// `params` is only read, so one compiled point can be run concurrently
/// with different parameters.
pub fn run_point_with(
    point: &CompiledPoint,
    params: &OperatingParameters,
) -> AppResult<RunResponse> {
    let timer = Timer::start("design point");
    let id = point.id.as_str();

    let (variant, solution, search, params) = if let Some(search) = &point.search {
        let outcome = find_parameter(
            &point.topology,
            params,
            search.parameter,
            search.target,
            &search.config,
        )
        .map_err(|e| AppError::solver(id, e))?;
        let summary = SearchSummary {
            parameter: outcome.parameter,
            value: outcome.value,
            cost: outcome.cost,
            evaluations: outcome.evaluations,
        };
        (point.variant, outcome.solution, Some(summary), outcome.params)
    } else if point.condensation.is_some() {
        let (variant, solution) = solve_mixing(point, params)?;
        (variant, solution, None, params.clone())
    } else {
        let solution =
            solve(&point.topology, params, &point.saturation).map_err(|e| AppError::solver(id, e))?;
        (point.variant, solution, None, params.clone())
    };

    let topology = match (variant, &point.condensation) {
        (Variant::MixingWithCondensation, Some(c)) => &c.topology,
        _ => &point.topology,
    };
    let report = build_report(topology, &solution, params.altitude)
        .map_err(|e| AppError::solver(id, e))?;
    let solve_time_s = timer.stop();

    info!(
        point = id,
        %variant,
        supply_flow = params.supply_flow,
        iterations = solution.iterations,
        solve_time_s,
        "design point solved"
    );
    Ok(RunResponse {
        id: point.id.clone(),
        name: point.name.clone(),
        variant,
        params,
        solution,
        search,
        report,
        solve_time_s,
    })
}

/// Solve the plain mix; redo it with condensation when the mixed state
/// lies above the saturation curve.
fn solve_mixing(
    point: &CompiledPoint,
    params: &OperatingParameters,
) -> AppResult<(Variant, NetworkSolution)> {
    let id = point.id.as_str();
    let plain = solve(&point.topology, params, &point.saturation)
        .map_err(|e| AppError::solver(id, e))?;
    let mixed = point
        .topology
        .node_by_name(nodes::MIXED)
        .map_err(|e| AppError::solver(id, e))?;
    let state = plain
        .state(mixed)
        .map_err(|e| AppError::solver(id, e))?
        .ok_or_else(|| AppError::compile(id, "mixed node has no state"))?;
    let supersaturated = state
        .is_supersaturated(params.altitude)
        .map_err(|e| AppError::psychro(id, e))?;

    let Some(condensation) = point.condensation.as_ref().filter(|_| supersaturated) else {
        return Ok((Variant::Mixing, plain));
    };
    let start = 0.5 * (params.outdoor.temperature + condensation.second_inlet.temperature);
    debug!(point = id, start, "mixed state supersaturated, adding condensation");
    let config = point.saturation.clone().starting_at(start);
    let solution =
        solve(&condensation.topology, params, &config).map_err(|e| AppError::solver(id, e))?;
    Ok((Variant::MixingWithCondensation, solution))
}

/// Compile and run one design point of a project.
pub fn run_design_point(project: &Project, id: &str) -> AppResult<RunResponse> {
    let def = project_service::get_design_point(project, id)?;
    let point = compile_design_point(def)?;
    run_point(&point)
}

/// Run every design point of a project in parallel.
///
/// Results keep the order of the project file; a failing point does not
/// stop the others.
pub fn run_all(project: &Project) -> Vec<(String, AppResult<RunResponse>)> {
    project
        .design_points
        .par_iter()
        .map(|def| {
            let result = compile_design_point(def).and_then(|point| run_point(&point));
            if let Err(e) = &result {
                warn!(point = %def.id, error = %e, "design point failed");
            }
            (def.id.clone(), result)
        })
        .collect()
}

/// Fail with [`AppError::RunsFailed`] when any run of a batch failed.
///
/// The individual failures are logged by the batch runners already.
pub fn check_runs<'a, I>(results: I) -> AppResult<()>
where
    I: IntoIterator<Item = &'a AppResult<RunResponse>>,
{
    let (failed, total) = results
        .into_iter()
        .fold((0, 0), |(failed, total), r| (failed + usize::from(r.is_err()), total + 1));
    if failed == 0 {
        Ok(())
    } else {
        Err(AppError::RunsFailed { failed, total })
    }
}

/// Substitute one sweep value into a copy of `params`.
pub fn apply_sweep_value(
    params: &OperatingParameters,
    variable: SweepVariableDef,
    value: f64,
) -> OperatingParameters {
    let mut params = params.clone();
    match variable {
        SweepVariableDef::OutdoorTemperature => params.outdoor.temperature = value,
        SweepVariableDef::OutdoorRelativeHumidity => params.outdoor.relative_humidity = value,
        SweepVariableDef::SupplyFlow => params.supply_flow = value,
        SweepVariableDef::OutdoorAirFraction => params.outdoor_air = OutdoorAir::Fraction(value),
        SweepVariableDef::Bypass => params.bypass = value,
    }
    params
}

/// Run a sweep of a project: the design point is compiled once and every
/// value is solved in parallel on its own parameters.
pub fn run_sweep(project: &Project, sweep_id: &str) -> AppResult<SweepResponse> {
    let sweep = project_service::get_sweep(project, sweep_id)?;
    let def = project_service::get_design_point(project, &sweep.design_point_id)?;
    let point = compile_design_point(def)?;
    info!(
        sweep = sweep_id,
        point = %point.id,
        variable = sweep.variable.label(),
        values = sweep.values.len(),
        "running sweep"
    );

    let points = sweep
        .values
        .par_iter()
        .map(|&value| {
            let params = apply_sweep_value(&point.params, sweep.variable, value);
            SweepPoint {
                value,
                result: run_point_with(&point, &params),
            }
        })
        .collect();

    Ok(SweepResponse {
        sweep_id: sweep.id.clone(),
        design_point_id: sweep.design_point_id.clone(),
        variable: sweep.variable,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahu_elements::{AirCondition, Envelope};

    #[test]
    fn batch_fails_when_any_run_failed() {
        let none: Vec<AppResult<RunResponse>> = Vec::new();
        assert!(check_runs(&none).is_ok());

        let results = vec![
            Err(AppError::DesignPointNotFound("a".to_string())),
            Err(AppError::SweepNotFound("b".to_string())),
        ];
        assert!(matches!(
            check_runs(&results),
            Err(AppError::RunsFailed { failed: 2, total: 2 })
        ));
    }

    #[test]
    fn sweep_values_touch_a_copy() {
        let base = OperatingParameters::new(
            4.84,
            AirCondition::new(-1.0, 1.0),
            AirCondition::new(18.0, 0.5),
            Envelope {
                ua: 935.83,
                infiltration: 2.12,
                sensible_load: 0.0,
                latent_load: 0.0,
            },
        );
        let swept = apply_sweep_value(&base, SweepVariableDef::OutdoorTemperature, 5.0);
        assert_eq!(swept.outdoor.temperature, 5.0);
        assert_eq!(base.outdoor.temperature, -1.0);

        let swept = apply_sweep_value(&base, SweepVariableDef::OutdoorAirFraction, 0.3);
        assert_eq!(swept.outdoor_air, OutdoorAir::Fraction(0.3));
        assert_eq!(
            apply_sweep_value(&base, SweepVariableDef::Bypass, 0.2).bypass,
            0.2
        );
    }
}
