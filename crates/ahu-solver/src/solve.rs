//! High-level solver interface.

use ahu_core::Deadline;
use ahu_elements::OperatingParameters;
use ahu_psychro::PsyState;

use crate::assemble::{assemble_with, boundary_states};
use crate::error::SolverResult;
use crate::linear::{LinearConfig, solve_linear};
use crate::saturation::{SaturationConfig, iterate};
use crate::solution::NetworkSolution;
use crate::topology::Topology;

/// Solve the network for one set of parameters.
///
/// This function:
/// 1. Validates the parameters and resolves the boundary states
/// 2. Assembles and solves the balance system at the initial linearization
///    temperature
/// 3. Repeats around the solved outlet temperature while the topology holds
///    a node on the saturation curve
///
/// The parameters are only read; concurrent solves of the same topology
/// with different parameters are independent.
pub fn solve(
    topology: &Topology,
    params: &OperatingParameters,
    config: &SaturationConfig,
) -> SolverResult<NetworkSolution> {
    let deadline = Deadline::from_secs(config.time_budget);
    iterate(topology, params, config, &deadline)
}

/// [`solve`] under a deadline shared with an enclosing loop.
pub fn solve_with_deadline(
    topology: &Topology,
    params: &OperatingParameters,
    config: &SaturationConfig,
    deadline: &Deadline,
) -> SolverResult<NetworkSolution> {
    iterate(topology, params, config, deadline)
}

/// One assemble-and-solve at a fixed linearization temperature.
pub fn solve_linearized(
    topology: &Topology,
    params: &OperatingParameters,
    linearization_temperature: f64,
    config: &LinearConfig,
) -> SolverResult<NetworkSolution> {
    params.validate()?;
    let known = boundary_states(topology, params)?;
    solve_linearized_with(topology, params, linearization_temperature, &known, config)
}

pub(crate) fn solve_linearized_with(
    topology: &Topology,
    params: &OperatingParameters,
    linearization_temperature: f64,
    known: &[Option<PsyState>],
    config: &LinearConfig,
) -> SolverResult<NetworkSolution> {
    let (matrix, rhs) = assemble_with(topology, params, linearization_temperature, known)?;
    let x = solve_linear(&matrix, &rhs, config)?;
    Ok(NetworkSolution::new(
        topology.network().layout(),
        x,
        known.to_vec(),
        linearization_temperature,
    ))
}
