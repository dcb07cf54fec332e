use std::path::Path;

#[test]
fn sample_projects_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../projects");
    for name in ["design_points.yaml"] {
        let path = root.join(name);
        let project = ahu_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        ahu_project::validate_project(&project)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
        assert!(!project.design_points.is_empty());
    }
}
