//! Adiabatic mixing box.

use ahu_core::ElementId;
use ahu_network::ElementNodes;

use crate::common::{AIR_SPECIFIC_HEAT, LATENT_HEAT, expect_ports, first};
use crate::error::{ElementError, ElementResult};
use crate::params::Share;
use crate::traits::{BalanceElement, RowBlock, StampContext};

/// Mixes its inlet streams into one outlet.
///
/// Inlet `i` carries the flow of `shares[i]`; the outlet carries their sum.
/// Rows: `Σf·c·θ_out − Σ f_i·c·θ_i = 0` and the same with `l·w`.
#[derive(Debug, Clone)]
pub struct Mixing {
    shares: Vec<Share>,
}

impl Mixing {
    pub fn new(shares: Vec<Share>) -> Self {
        Self { shares }
    }

    /// Outdoor air mixed with recirculated indoor air.
    pub fn outdoor_and_recirculated() -> Self {
        Self::new(vec![Share::OutdoorAir, Share::Recirculated])
    }

    /// By-passed air rejoining the treated stream.
    pub fn bypass_and_treated() -> Self {
        Self::new(vec![Share::Bypass, Share::Treated])
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }
}

impl BalanceElement for Mixing {
    fn name(&self) -> &'static str {
        "mixing box"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn check_ports(&self, nodes: &ElementNodes) -> ElementResult<()> {
        if self.shares.len() < 2 {
            return Err(ElementError::InvalidArg {
                what: "mixing box needs at least two streams",
            });
        }
        expect_ports(self.name(), nodes, self.shares.len(), 1, 0)
    }

    fn stamp(
        &self,
        _id: ElementId,
        nodes: &ElementNodes,
        ctx: &StampContext<'_>,
        rows: &mut RowBlock<'_>,
    ) -> ElementResult<()> {
        let outlet = first(self.name(), &nodes.outlets, "an outlet")?;
        let mut total = 0.0;
        for (&share, &inlet) in self.shares.iter().zip(&nodes.inlets) {
            let flow = share.flow(ctx.params);
            total += flow;
            rows.temperature(0, inlet, -flow * AIR_SPECIFIC_HEAT)?;
            rows.humidity_ratio(1, inlet, -flow * LATENT_HEAT)?;
        }
        rows.temperature(0, outlet, total * AIR_SPECIFIC_HEAT)?;
        rows.humidity_ratio(1, outlet, total * LATENT_HEAT)?;
        Ok(())
    }
}
