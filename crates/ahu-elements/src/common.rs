//! Helpers shared by the element implementations.

use ahu_core::{ElementId, NodeId};
use ahu_network::ElementNodes;
use ahu_psychro::{saturation_humidity_ratio, saturation_slope};

use crate::error::{ElementError, ElementResult};
use crate::traits::{RowBlock, StampContext};

pub use ahu_core::units::constants::{AIR_SPECIFIC_HEAT, LATENT_HEAT};

/// Require exactly `inlets` inlets, `outlets` outlets and `sensors` sensors.
pub fn expect_ports(
    element: &'static str,
    nodes: &ElementNodes,
    inlets: usize,
    outlets: usize,
    sensors: usize,
) -> ElementResult<()> {
    let checks = [
        (nodes.inlets.len(), inlets, "inlets"),
        (nodes.outlets.len(), outlets, "outlets"),
        (nodes.sensors.len(), sensors, "sensed nodes"),
    ];
    for (found, expected, what) in checks {
        if found != expected {
            return Err(ElementError::PortArity {
                element,
                expected: what,
                found,
            });
        }
    }
    Ok(())
}

/// First node of a port group, or an arity error.
pub fn first(element: &'static str, nodes: &[NodeId], what: &'static str) -> ElementResult<NodeId> {
    nodes.first().copied().ok_or(ElementError::PortArity {
        element,
        expected: what,
        found: 0,
    })
}

/// Tangent to the saturation curve at the linearization temperature `t0`:
/// `w'(t0)·θ − w = w'(t0)·t0 − w_sat(t0)`.
pub fn stamp_saturation_tangent(
    rows: &mut RowBlock<'_>,
    row: usize,
    node: NodeId,
    ctx: &StampContext<'_>,
) -> ElementResult<()> {
    let t0 = ctx.linearization_temperature;
    let altitude = ctx.params.altitude;
    let slope = saturation_slope(t0, altitude)?;
    let w0 = saturation_humidity_ratio(t0, altitude)?;
    rows.temperature(row, node, slope)?;
    rows.humidity_ratio(row, node, -1.0)?;
    rows.constant(row, slope * t0 - w0)
}

/// Sensible and latent balance of a stream of `flow` crossing from `inlet`
/// to `outlet`, with heat `Qs` (slot `sensible`) and vapor-borne heat `Ql`
/// (slot `latent`) added to the air. `None` means no exchange in that row.
pub fn stamp_stream(
    rows: &mut RowBlock<'_>,
    first_row: usize,
    flow: f64,
    inlet: NodeId,
    outlet: NodeId,
    exchange: (Option<AuxRef>, Option<AuxRef>),
) -> ElementResult<()> {
    let (sensible, latent) = exchange;
    let sensible_row = first_row;
    let latent_row = first_row + 1;

    rows.temperature(sensible_row, outlet, flow * AIR_SPECIFIC_HEAT)?;
    rows.temperature(sensible_row, inlet, -flow * AIR_SPECIFIC_HEAT)?;
    if let Some(q) = sensible {
        rows.aux(sensible_row, q.element, q.slot, -1.0)?;
    }

    rows.humidity_ratio(latent_row, outlet, flow * LATENT_HEAT)?;
    rows.humidity_ratio(latent_row, inlet, -flow * LATENT_HEAT)?;
    if let Some(q) = latent {
        rows.aux(latent_row, q.element, q.slot, -1.0)?;
    }
    Ok(())
}

/// Reference to an auxiliary unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxRef {
    pub element: ElementId,
    pub slot: usize,
}

impl AuxRef {
    pub fn new(element: ElementId, slot: usize) -> Self {
        Self { element, slot }
    }
}
