//! Heating and cooling coils.

use ahu_core::{ElementId, NodeId};
use ahu_network::ElementNodes;

use crate::common::{AuxRef, expect_ports, first, stamp_saturation_tangent, stamp_stream};
use crate::error::ElementResult;
use crate::params::Share;
use crate::traits::{BalanceElement, RowBlock, StampContext};

/// Dry heating coil: sensible heat `Qs` only, humidity ratio unchanged.
#[derive(Debug, Clone)]
pub struct HeatingCoil {
    share: Share,
}

impl HeatingCoil {
    pub const SENSIBLE: usize = 0;

    pub fn new(share: Share) -> Self {
        Self { share }
    }
}

impl BalanceElement for HeatingCoil {
    fn name(&self) -> &'static str {
        "heating coil"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn aux_labels(&self) -> &'static [&'static str] {
        &["Qs"]
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
            (Some(AuxRef::new(id, Self::SENSIBLE)), None),
        )
    }
}

/// Wet cooling coil.
///
/// The leaving air is modeled at the apparatus dew point, on the tangent to
/// the saturation curve at the linearization temperature. Unknowns are the
/// total, sensible and latent heat added to the air (negative when cooling).
#[derive(Debug, Clone)]
pub struct CoolingCoil {
    share: Share,
}

impl CoolingCoil {
    pub const TOTAL: usize = 0;
    pub const SENSIBLE: usize = 1;
    pub const LATENT: usize = 2;

    pub fn new(share: Share) -> Self {
        Self { share }
    }
}

impl BalanceElement for CoolingCoil {
    fn name(&self) -> &'static str {
        "cooling coil"
    }

    fn equation_count(&self) -> usize {
        4
    }

    fn aux_labels(&self) -> &'static [&'static str] {
        &["Qt", "Qs", "Ql"]
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
            (
                Some(AuxRef::new(id, Self::SENSIBLE)),
                Some(AuxRef::new(id, Self::LATENT)),
            ),
        )?;
        stamp_saturation_tangent(rows, 2, outlet, ctx)?;
        // Qt = Qs + Ql
        rows.aux(3, id, Self::TOTAL, 1.0)?;
        rows.aux(3, id, Self::SENSIBLE, -1.0)?;
        rows.aux(3, id, Self::LATENT, -1.0)
    }

    fn saturated_node(&self, nodes: &ElementNodes) -> Option<NodeId> {
        nodes.outlets.first().copied()
    }
}
