//! Vapor (steam) and adiabatic (spray) humidifiers.

use ahu_core::{ElementId, NodeId};
use ahu_network::ElementNodes;

use crate::common::{
    AIR_SPECIFIC_HEAT, AuxRef, LATENT_HEAT, expect_ports, first, stamp_saturation_tangent,
    stamp_stream,
};
use crate::error::ElementResult;
use crate::params::Share;
use crate::traits::{BalanceElement, RowBlock, StampContext};

/// Isothermal vapor humidifier: latent heat `Ql` only.
#[derive(Debug, Clone)]
pub struct VaporHumidifier {
    share: Share,
}

impl VaporHumidifier {
    pub const LATENT: usize = 0;

    pub fn new(share: Share) -> Self {
        Self { share }
    }
}

impl BalanceElement for VaporHumidifier {
    fn name(&self) -> &'static str {
        "vapor humidifier"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn aux_labels(&self) -> &'static [&'static str] {
        &["Ql"]
    }

    fn check_ports(&self, nodes: &ElementNodes) -> ElementResult<()> {
        expect_ports(self.name(), nodes, 1, 1, 0)
    }

    fn stamp(
        &self,
        id: ElementId,
        nodes: &ElementNodes,
        ctx: &StampContext<'_>,
        rows: &mut RowBlock<'_>,
    ) -> ElementResult<()> {
        let inlet = first(self.name(), &nodes.inlets, "an inlet")?;
        let outlet = first(self.name(), &nodes.outlets, "an outlet")?;
        stamp_stream(
            rows,
            0,
            self.share.flow(ctx.params),
            inlet,
            outlet,
            (None, Some(AuxRef::new(id, Self::LATENT))),
        )
    }
}

/// Adiabatic humidifier (or adiabatic condensation of fog) leaving the air
/// saturated: constant enthalpy `c·θ + l·w` and the saturation tangent.
#[derive(Debug, Clone, Default)]
pub struct AdiabaticHumidifier;

impl AdiabaticHumidifier {
    pub fn new() -> Self {
        Self
    }
}

impl BalanceElement for AdiabaticHumidifier {
    fn name(&self) -> &'static str {
        "adiabatic humidifier"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn check_ports(&self, nodes: &ElementNodes) -> ElementResult<()> {
        expect_ports(self.name(), nodes, 1, 1, 0)
    }

    fn stamp(
        &self,
        _id: ElementId,
        nodes: &ElementNodes,
        ctx: &StampContext<'_>,
        rows: &mut RowBlock<'_>,
    ) -> ElementResult<()> {
        let inlet = first(self.name(), &nodes.inlets, "an inlet")?;
        let outlet = first(self.name(), &nodes.outlets, "an outlet")?;
        rows.temperature(0, inlet, AIR_SPECIFIC_HEAT)?;
        rows.humidity_ratio(0, inlet, LATENT_HEAT)?;
        rows.temperature(0, outlet, -AIR_SPECIFIC_HEAT)?;
        rows.humidity_ratio(0, outlet, -LATENT_HEAT)?;
        stamp_saturation_tangent(rows, 1, outlet, ctx)
    }

    fn saturated_node(&self, nodes: &ElementNodes) -> Option<NodeId> {
        nodes.outlets.first().copied()
    }
}
