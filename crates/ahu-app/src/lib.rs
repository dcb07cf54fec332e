//! Shared application service layer for the air-handling unit solver.
//!
//! This crate sits between the project files and the solver: it loads and
//! validates projects, compiles design points into catalog topologies, runs
//! them (one at a time, all at once, or as sweeps), and turns solutions into
//! report rows for the CLI.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod report;
pub mod run_service;

// Re-export key types for convenience
pub use compile::{
    CompiledPoint, CompiledSearch, Condensation, Variant, build_topology, compile_design_point,
    operating_parameters, saturation_config,
};
pub use error::{AppError, AppResult};
pub use project_service::{
    DesignPointSummary, get_design_point, get_sweep, list_design_points, load_project,
    save_project, validate_project,
};
pub use report::{LoadRow, NodeRow, Report, build_report};
pub use run_service::{
    RunResponse, SearchSummary, SweepPoint, SweepResponse, apply_sweep_value, check_runs, run_all,
    run_design_point, run_point, run_point_with, run_sweep,
};
