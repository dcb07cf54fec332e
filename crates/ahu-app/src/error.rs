//! Error types for the ahu-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to load project {path}: {source}")]
    ProjectLoad {
        path: PathBuf,
        source: ahu_project::ProjectError,
    },

    #[error("Failed to save project {path}: {source}")]
    ProjectSave {
        path: PathBuf,
        source: ahu_project::ProjectError,
    },

    #[error("Project validation failed: {0}")]
    Validation(#[from] ahu_project::ValidationError),

    #[error("Design point not found: {0}")]
    DesignPointNotFound(String),

    #[error("Sweep not found: {0}")]
    SweepNotFound(String),

    #[error("{failed} of {total} runs failed")]
    RunsFailed { failed: usize, total: usize },

    #[error("Design point '{point}' could not be compiled: {message}")]
    Compile { point: String, message: String },

    #[error("Design point '{point}': {source}")]
    Solver {
        point: String,
        source: ahu_solver::SolverError,
    },

    #[error("Design point '{point}': {source}")]
    Element {
        point: String,
        source: ahu_elements::ElementError,
    },

    #[error("Design point '{point}': {source}")]
    Psychro {
        point: String,
        source: ahu_psychro::PsychroError,
    },
}

impl AppError {
    pub(crate) fn compile(point: &str, message: impl Into<String>) -> Self {
        AppError::Compile {
            point: point.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn solver(point: &str, source: ahu_solver::SolverError) -> Self {
        AppError::Solver {
            point: point.to_string(),
            source,
        }
    }

    pub(crate) fn element(point: &str, source: ahu_elements::ElementError) -> Self {
        AppError::Element {
            point: point.to_string(),
            source,
        }
    }

    pub(crate) fn psychro(point: &str, source: ahu_psychro::PsychroError) -> Self {
        AppError::Psychro {
            point: point.to_string(),
            source,
        }
    }

    /// Solver failure underneath, if any.
    pub fn solver_error(&self) -> Option<&ahu_solver::SolverError> {
        match self {
            AppError::Solver { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for ahu-app operations.
pub type AppResult<T> = Result<T, AppError>;
