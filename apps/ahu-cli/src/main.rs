use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

use ahu_app::{AppResult, Report, RunResponse, Variant, project_service, run_service};

#[derive(Parser)]
#[command(name = "ahu")]
#[command(about = "Steady-state air-handling unit design-point solver", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// List design points and sweeps of a project, or the unit catalog
    List {
        /// Path to the project file; omit to list the unit catalog
        project_path: Option<PathBuf>,
    },
    /// Solve design points
    Run {
        /// Path to the project file
        project_path: PathBuf,
        /// Design point ID; omit to run every design point in parallel
        point_id: Option<String>,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a sweep defined in the project
    Sweep {
        /// Path to the project file
        project_path: PathBuf,
        /// Sweep ID
        sweep_id: String,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::List { project_path } => match project_path {
            Some(path) => cmd_list(&path),
            None => {
                cmd_catalog();
                Ok(())
            }
        },
        Commands::Run {
            project_path,
            point_id,
            json,
        } => cmd_run(&project_path, point_id.as_deref(), json),
        Commands::Sweep {
            project_path,
            sweep_id,
            json,
        } => cmd_sweep(&project_path, &sweep_id, json),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!(
        "✓ Project is valid ({} design points, {} sweeps)",
        project.design_points.len(),
        project.sweeps.len()
    );
    Ok(())
}

fn cmd_catalog() {
    println!("Unit catalog:");
    for variant in Variant::ALL {
        println!("  {:<26} {}", variant.name(), variant.description());
    }
}

fn cmd_list(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let points = project_service::list_design_points(&project);

    if points.is_empty() {
        println!("No design points found in project");
    } else {
        println!("Design points in project:");
        for point in points {
            let search = if point.has_search { ", search" } else { "" };
            println!(
                "  {} - {} ({}{}, {} sweeps)",
                point.id, point.name, point.variant, search, point.sweeps
            );
        }
    }
    if !project.sweeps.is_empty() {
        println!("Sweeps:");
        for sweep in &project.sweeps {
            println!(
                "  {} - {} over {} values of {}",
                sweep.id,
                sweep.design_point_id,
                sweep.values.len(),
                sweep.variable.label()
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RunJson<'a> {
    id: &'a str,
    variant: &'static str,
    supply_flow_kg_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_value: Option<f64>,
    saturation_iterations: usize,
    report: &'a Report,
}

impl<'a> From<&'a RunResponse> for RunJson<'a> {
    fn from(run: &'a RunResponse) -> Self {
        Self {
            id: &run.id,
            variant: run.variant.name(),
            supply_flow_kg_s: run.params.supply_flow,
            search_value: run.search.as_ref().map(|s| s.value),
            saturation_iterations: run.solution.iterations,
            report: &run.report,
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("✗ Could not serialize results: {e}"),
    }
}

fn cmd_run(project_path: &Path, point_id: Option<&str>, json: bool) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;

    let Some(point_id) = point_id else {
        let results = run_service::run_all(&project);
        if json {
            let ok: Vec<RunJson> = results
                .iter()
                .filter_map(|(_, r)| r.as_ref().ok().map(RunJson::from))
                .collect();
            print_json(&ok);
        }
        for (id, result) in &results {
            match result {
                Ok(run) if !json => print_run(run),
                Ok(_) => {}
                Err(e) => eprintln!("✗ {id}: {e}"),
            }
        }
        return run_service::check_runs(results.iter().map(|(_, r)| r));
    };

    let run = run_service::run_design_point(&project, point_id)?;
    if json {
        print_json(&RunJson::from(&run));
    } else {
        print_run(&run);
    }
    Ok(())
}

fn cmd_sweep(project_path: &Path, sweep_id: &str, json: bool) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let sweep = run_service::run_sweep(&project, sweep_id)?;

    if json {
        #[derive(Serialize)]
        struct SweepJson<'a> {
            value: f64,
            #[serde(skip_serializing_if = "Option::is_none")]
            run: Option<RunJson<'a>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }
        let rows: Vec<SweepJson> = sweep
            .points
            .iter()
            .map(|p| SweepJson {
                value: p.value,
                run: p.result.as_ref().ok().map(RunJson::from),
                error: p.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        print_json(&rows);
        return run_service::check_runs(sweep.points.iter().map(|p| &p.result));
    }

    println!(
        "Sweep {} of {} over {}:",
        sweep.sweep_id,
        sweep.design_point_id,
        sweep.variable.label()
    );
    for point in &sweep.points {
        println!("\n── {} = {}", sweep.variable.label(), point.value);
        match &point.result {
            Ok(run) => print_run(run),
            Err(e) => eprintln!("✗ {e}"),
        }
    }
    run_service::check_runs(sweep.points.iter().map(|p| &p.result))
}

fn print_run(run: &RunResponse) {
    println!("\n✓ {} - {} [{}]", run.id, run.name, run.variant);
    println!("  Supply flow: {:.4} kg/s", run.params.supply_flow);
    if let Some(search) = &run.search {
        println!(
            "  Search: {} = {:.5} (cost {:.3e}, {} evaluations)",
            search.parameter, search.value, search.cost, search.evaluations
        );
    }
    if run.solution.iterations > 0 {
        println!(
            "  Saturation iterations: {} (residual {:.3e})",
            run.solution.iterations, run.solution.residual
        );
    }

    println!(
        "\n  {:<14} {:>8} {:>10} {:>8} {:>10}",
        "node", "θ [°C]", "w [g/kg]", "φ [%]", "v [m³/kg]"
    );
    for row in &run.report.nodes {
        println!(
            "  {:<14} {:>8.2} {:>10.2} {:>8.1} {:>10.4}",
            row.node,
            row.temperature_c,
            row.humidity_ratio_g_per_kg,
            row.relative_humidity_pct,
            row.specific_volume
        );
    }

    println!("\n  {:<14} {:>12} {:>10}", "load", "Q [W]", "Q [kW]");
    for row in &run.report.loads {
        println!("  {:<14} {:>12.1} {:>10.2}", row.label, row.watts, row.kilowatts);
    }
    println!("  Solved in {:.3}s", run.solve_time_s);
}
