//! Error types for solver operations.

use ahu_core::AhuError;
use ahu_elements::ElementError;
use ahu_network::NetworkError;
use ahu_psychro::PsychroError;
use thiserror::Error;

use crate::search::FreeParameter;
use crate::solution::NetworkSolution;

/// Errors that can occur while assembling, solving or searching.
///
/// The iterative failures carry the best estimate found so far, so a caller
/// can decide whether a near-converged answer is acceptable.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Singular balance system (condition number {condition:.3e})")]
    SingularSystem { condition: f64 },

    #[error("Saturation iteration did not converge in {iterations} iterations (residual {residual:.3e})")]
    NonConvergence {
        iterations: usize,
        residual: f64,
        best: Box<NetworkSolution>,
    },

    #[error(
        "No feasible {parameter}: best value {best_value:.6} with cost {best_cost:.3e}"
    )]
    NoFeasibleParameter {
        parameter: FreeParameter,
        best_value: f64,
        best_cost: f64,
        best: Option<Box<NetworkSolution>>,
    },

    #[error("Deadline exceeded during {what}")]
    DeadlineExceeded {
        what: &'static str,
        best: Option<Box<NetworkSolution>>,
    },

    #[error("Element error: {0}")]
    Element(ElementError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Psychrometric error: {0}")]
    Psychro(#[from] PsychroError),

    #[error("Numeric error: {0}")]
    Core(#[from] AhuError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<ElementError> for SolverError {
    fn from(e: ElementError) -> Self {
        match e {
            ElementError::Psychro(p) => SolverError::Psychro(p),
            ElementError::Network(n) => SolverError::Network(n),
            other => SolverError::Element(other),
        }
    }
}

impl SolverError {
    /// Best solution attached to an iterative failure, if any.
    pub fn best_solution(&self) -> Option<&NetworkSolution> {
        match self {
            SolverError::NonConvergence { best, .. } => Some(best),
            SolverError::NoFeasibleParameter { best, .. }
            | SolverError::DeadlineExceeded { best, .. } => best.as_deref(),
            _ => None,
        }
    }
}

impl From<SolverError> for AhuError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { .. } => AhuError::InvalidArg {
                what: "problem setup",
            },
            SolverError::SingularSystem { .. } => AhuError::Invariant {
                what: "singular system",
            },
            SolverError::NonConvergence { .. } => AhuError::Invariant {
                what: "saturation iteration",
            },
            SolverError::NoFeasibleParameter { .. } => AhuError::Invariant {
                what: "parameter search",
            },
            SolverError::DeadlineExceeded { .. } => AhuError::Invariant { what: "deadline" },
            SolverError::Element(e) => e.into(),
            SolverError::Network(e) => e.into(),
            SolverError::Psychro(e) => e.into(),
            SolverError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psychro_errors_surface_unchanged() {
        let domain = PsychroError::Domain {
            what: "relative humidity",
            value: 2.0,
        };
        let err: SolverError = ElementError::Psychro(domain.clone()).into();
        assert!(matches!(err, SolverError::Psychro(ref p) if *p == domain));
        assert!(err.best_solution().is_none());
    }
}
