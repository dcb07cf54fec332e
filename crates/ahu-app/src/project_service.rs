//! Project loading, saving, validation, and introspection.

use std::path::Path;

use ahu_project::schema::{DesignPointDef, Project, SweepDef};

use crate::compile::Variant;
use crate::error::{AppError, AppResult};

/// Summary of a design point for listing.
#[derive(Debug, Clone)]
pub struct DesignPointSummary {
    pub id: String,
    pub name: String,
    pub variant: Variant,
    pub has_search: bool,
    pub sweeps: usize,
}

/// Load a project file (YAML, or JSON by extension); it is validated on load.
pub fn load_project(path: &Path) -> AppResult<Project> {
    ahu_project::load(path).map_err(|source| AppError::ProjectLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a project as YAML.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    ahu_project::save_yaml(path, project).map_err(|source| AppError::ProjectSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate a project already in memory.
pub fn validate_project(project: &Project) -> AppResult<()> {
    ahu_project::validate_project(project)?;
    Ok(())
}

/// List all design points in the project with summaries.
pub fn list_design_points(project: &Project) -> Vec<DesignPointSummary> {
    project
        .design_points
        .iter()
        .map(|point| DesignPointSummary {
            id: point.id.clone(),
            name: point.name.clone(),
            variant: Variant::of(&point.unit),
            has_search: point.search.is_some(),
            sweeps: project
                .sweeps
                .iter()
                .filter(|s| s.design_point_id == point.id)
                .count(),
        })
        .collect()
}

pub fn get_design_point<'a>(project: &'a Project, id: &str) -> AppResult<&'a DesignPointDef> {
    project
        .design_point(id)
        .ok_or_else(|| AppError::DesignPointNotFound(id.to_string()))
}

pub fn get_sweep<'a>(project: &'a Project, id: &str) -> AppResult<&'a SweepDef> {
    project
        .sweep(id)
        .ok_or_else(|| AppError::SweepNotFound(id.to_string()))
}

