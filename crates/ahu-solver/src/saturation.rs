//! Saturation-linearization iterator.
//!
//! A cooling-coil or adiabatic-humidifier outlet lies on the tangent to the
//! saturation curve at the linearization temperature `t0`. After each linear
//! solve `t0` moves to the solved outlet temperature until the tangent point
//! and the solved point agree.

use ahu_core::Deadline;
use ahu_elements::OperatingParameters;
use ahu_psychro::saturation_humidity_ratio;
use tracing::{debug, warn};

use crate::assemble::boundary_states;
use crate::error::{SolverError, SolverResult};
use crate::linear::LinearConfig;
use crate::solution::NetworkSolution;
use crate::solve::solve_linearized_with;
use crate::topology::Topology;

/// Initial linearization temperature, °C.
pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 5.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Tolerance on successive linearization temperatures, °C.
pub const TEMPERATURE_TOLERANCE: f64 = 0.01;
/// Tolerance on the humidity ratio off the saturation curve, kg/kg.
pub const HUMIDITY_TOLERANCE: f64 = 1e-5;

/// What decides that the iteration has converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceCriterion {
    /// `|θ_out − t0|`
    Temperature,
    /// `|w_sat(θ_out) − w_out|`
    HumidityRatio,
}

impl ConvergenceCriterion {
    pub fn default_tolerance(self) -> f64 {
        match self {
            ConvergenceCriterion::Temperature => TEMPERATURE_TOLERANCE,
            ConvergenceCriterion::HumidityRatio => HUMIDITY_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaturationConfig {
    pub initial_temperature: f64,
    pub criterion: ConvergenceCriterion,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Relaxation `λ` of `t0 ← t0 + λ(θ_out − t0)`, in (0, 1].
    pub damping: f64,
    /// Wall-clock budget in seconds.
    pub time_budget: Option<f64>,
    pub linear: LinearConfig,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            criterion: ConvergenceCriterion::Temperature,
            tolerance: TEMPERATURE_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            damping: 1.0,
            time_budget: None,
            linear: LinearConfig::default(),
        }
    }
}

impl SaturationConfig {
    /// Start the iteration at `temperature`.
    pub fn starting_at(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Converge on the humidity ratio instead of the temperature.
    pub fn humidity_driven(mut self) -> Self {
        self.criterion = ConvergenceCriterion::HumidityRatio;
        self.tolerance = HUMIDITY_TOLERANCE;
        self
    }

    fn validate(&self) -> SolverResult<()> {
        if !self.initial_temperature.is_finite() {
            return Err(SolverError::ProblemSetup {
                what: format!("initial temperature {}", self.initial_temperature),
            });
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(SolverError::ProblemSetup {
                what: format!("tolerance {}", self.tolerance),
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("damping {} outside (0, 1]", self.damping),
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::ProblemSetup {
                what: "max_iterations must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Iterate the linearization until the saturated node sits on the curve.
///
/// Topologies without a saturated node are solved once. On failure the
/// iterate with the smallest residual is returned inside the error.
pub fn iterate(
    topology: &Topology,
    params: &OperatingParameters,
    config: &SaturationConfig,
    deadline: &Deadline,
) -> SolverResult<NetworkSolution> {
    config.validate()?;
    params.validate()?;
    let known = boundary_states(topology, params)?;

    let Some((_, node)) = topology.saturated() else {
        return solve_linearized_with(
            topology,
            params,
            config.initial_temperature,
            &known,
            &config.linear,
        );
    };
    let layout = topology.network().layout();
    let (t_col, w_col) = match (layout.temperature_column(node), layout.humidity_column(node)) {
        (Some(t), Some(w)) => (t, w),
        _ => {
            return Err(SolverError::ProblemSetup {
                what: format!("saturated node {node} is not free"),
            });
        }
    };

    let mut t0 = config.initial_temperature;
    let mut best: Option<NetworkSolution> = None;

    for iteration in 1..=config.max_iterations {
        if deadline.is_expired() {
            warn!(
                iteration,
                elapsed_s = deadline.elapsed().as_secs_f64(),
                "saturation iteration out of time"
            );
            return Err(SolverError::DeadlineExceeded {
                what: "saturation iteration",
                best: best.map(Box::new),
            });
        }

        let mut solution = solve_linearized_with(topology, params, t0, &known, &config.linear)?;
        let t_out = solution.values()[t_col];
        let w_out = solution.values()[w_col];
        let residual = match config.criterion {
            ConvergenceCriterion::Temperature => (t_out - t0).abs(),
            ConvergenceCriterion::HumidityRatio => {
                (saturation_humidity_ratio(t_out, params.altitude)? - w_out).abs()
            }
        };
        solution.iterations = iteration;
        solution.residual = residual;
        debug!(iteration, t0, t_out, w_out, residual, "saturation iteration");

        if residual <= config.tolerance {
            return Ok(solution);
        }
        if best.as_ref().is_none_or(|b| residual < b.residual) {
            best = Some(solution);
        }
        t0 += config.damping * (t_out - t0);
    }

    match best {
        Some(best) => {
            warn!(
                iterations = config.max_iterations,
                residual = best.residual,
                "saturation iteration did not converge"
            );
            Err(SolverError::NonConvergence {
                iterations: config.max_iterations,
                residual: best.residual,
                best: Box::new(best),
            })
        }
        None => Err(SolverError::ProblemSetup {
            what: "no saturation iteration was run".to_string(),
        }),
    }
}
