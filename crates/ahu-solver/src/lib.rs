//! Steady-state solver for air-handling networks.
//!
//! The unknowns are the temperature and humidity ratio of every free node
//! plus the heat and vapor flows of the elements. All balances are linear
//! except the saturation curve at a cooling coil or adiabatic humidifier,
//! which is linearized around a temperature that is iterated to a fixed
//! point. An outer 1-D search chooses the supply flow or the by-pass
//! fraction when a target output is given instead.

pub mod assemble;
pub mod error;
pub mod linear;
pub mod saturation;
pub mod search;
pub mod solution;
pub mod solve;
pub mod topology;

pub use assemble::{assemble, boundary_states};
pub use error::{SolverError, SolverResult};
pub use linear::{LinearConfig, condition_number, solve_linear};
pub use saturation::{ConvergenceCriterion, SaturationConfig};
pub use search::{
    FreeParameter, RootEstimate, RootMethod, RootOptions, SearchConfig, SearchOutcome, Target,
    find_parameter, find_root,
};
pub use solution::NetworkSolution;
pub use solve::{solve, solve_linearized, solve_with_deadline};
pub use topology::{Topology, TopologyBuilder};
