//! Coefficient assembly.

use ahu_elements::{OperatingParameters, RowBlock, StampContext};
use ahu_network::NodeKind;
use ahu_psychro::PsyState;
use nalgebra::{DMatrix, DVector};

use crate::error::SolverResult;
use crate::topology::Topology;

/// Known state of every boundary node, by node slot; `None` for free nodes.
pub fn boundary_states(
    topology: &Topology,
    params: &OperatingParameters,
) -> SolverResult<Vec<Option<PsyState>>> {
    let outdoor = params.outdoor_state()?;
    topology
        .network()
        .nodes()
        .iter()
        .map(|node| match node.kind {
            NodeKind::Free => Ok(None),
            NodeKind::Outdoor => Ok(Some(outdoor)),
            NodeKind::Given {
                temperature,
                relative_humidity,
            } => Ok(Some(PsyState::from_relative_humidity(
                temperature,
                relative_humidity,
                params.altitude,
            )?)),
        })
        .collect()
}

/// Build the square system `A·x = b` of the topology for one set of
/// parameters, with the saturation curve linearized at
/// `linearization_temperature`.
///
/// Rows are laid out element by element in declaration order.
pub fn assemble(
    topology: &Topology,
    params: &OperatingParameters,
    linearization_temperature: f64,
) -> SolverResult<(DMatrix<f64>, DVector<f64>)> {
    params.validate()?;
    let known = boundary_states(topology, params)?;
    assemble_with(topology, params, linearization_temperature, &known)
}

pub(crate) fn assemble_with(
    topology: &Topology,
    params: &OperatingParameters,
    linearization_temperature: f64,
    known: &[Option<PsyState>],
) -> SolverResult<(DMatrix<f64>, DVector<f64>)> {
    let layout = topology.network().layout();
    let n = topology.size();
    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    let ctx = StampContext {
        params,
        linearization_temperature,
        outdoor: params.outdoor_state()?,
        layout,
    };

    for block in topology.blocks() {
        let (id, element, nodes, first, count) = block?;
        let mut rows = RowBlock::new(&mut matrix, &mut rhs, first, count, layout, known);
        element.stamp(id, nodes, &ctx, &mut rows)?;
    }

    Ok((matrix, rhs))
}
