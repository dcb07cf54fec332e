//! Tabular rows of a solved design point.

use ahu_core::{per_mille, percent, watts_to_kw};
use ahu_solver::{NetworkSolution, SolverResult, Topology};
use serde::Serialize;

/// State of one node in reporting units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub node: String,
    pub temperature_c: f64,
    pub humidity_ratio_g_per_kg: f64,
    pub relative_humidity_pct: f64,
    /// Specific volume, m³/kg dry air.
    pub specific_volume: f64,
}

/// One heat or vapor flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRow {
    pub label: String,
    pub watts: f64,
    pub kilowatts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub nodes: Vec<NodeRow>,
    pub loads: Vec<LoadRow>,
}

impl Report {
    pub fn node(&self, name: &str) -> Option<&NodeRow> {
        self.nodes.iter().find(|n| n.node == name)
    }

    pub fn load(&self, label: &str) -> Option<&LoadRow> {
        self.loads.iter().find(|l| l.label == label)
    }
}

/// Node rows in declaration order, boundary nodes included, then loads.
pub fn build_report(
    topology: &Topology,
    solution: &NetworkSolution,
    altitude: f64,
) -> SolverResult<Report> {
    let mut nodes = Vec::new();
    for node in topology.network().nodes() {
        let Some(state) = solution.state(node.id)? else {
            continue;
        };
        nodes.push(NodeRow {
            node: node.name.clone(),
            temperature_c: state.temperature,
            humidity_ratio_g_per_kg: per_mille(state.humidity_ratio),
            relative_humidity_pct: percent(state.relative_humidity(altitude)?),
            specific_volume: state.specific_volume(altitude)?,
        });
    }
    let loads = solution
        .loads()
        .map(|(label, q)| LoadRow {
            label: label.to_string(),
            watts: q,
            kilowatts: watts_to_kw(q),
        })
        .collect();
    Ok(Report { nodes, loads })
}
