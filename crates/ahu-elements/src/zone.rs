//! Thermal zone and building envelope.
//!
//! The zone carries the supply air to the indoor node and exchanges the
//! loads `QsTZ`, `QlTZ` with it. The building closes the balance: the same
//! loads equal the envelope losses plus the auxiliary gains,
//! `(UA + mi·c)·θI + QsTZ = (UA + mi·c)·θO + Qsa` and
//! `mi·l·wI + QlTZ = mi·l·wO + Qla`.

use ahu_core::ElementId;
use ahu_network::ElementNodes;

use crate::common::{
    AIR_SPECIFIC_HEAT, AuxRef, LATENT_HEAT, expect_ports, first, stamp_stream,
};
use crate::error::ElementResult;
use crate::params::Share;
use crate::traits::{BalanceElement, RowBlock, StampContext};

/// Supply air crossing the conditioned space.
#[derive(Debug, Clone)]
pub struct ThermalZone {
    share: Share,
}

impl ThermalZone {
    pub const SENSIBLE: usize = 0;
    pub const LATENT: usize = 1;

    pub fn new() -> Self {
        Self {
            share: Share::Supply,
        }
    }
}

impl Default for ThermalZone {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceElement for ThermalZone {
    fn name(&self) -> &'static str {
        "thermal zone"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn aux_labels(&self) -> &'static [&'static str] {
        &["Qs", "Ql"]
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
        let supply = first(self.name(), &nodes.inlets, "a supply inlet")?;
        let indoor = first(self.name(), &nodes.outlets, "an indoor outlet")?;
        stamp_stream(
            rows,
            0,
            self.share.flow(ctx.params),
            supply,
            indoor,
            (
                Some(AuxRef::new(id, Self::SENSIBLE)),
                Some(AuxRef::new(id, Self::LATENT)),
            ),
        )
    }
}

/// Envelope balance of the building around the indoor node it senses.
#[derive(Debug, Clone)]
pub struct Building {
    zone: ElementId,
}

impl Building {
    /// `zone` is the thermal zone whose loads the envelope balances.
    pub fn new(zone: ElementId) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> ElementId {
        self.zone
    }
}

impl BalanceElement for Building {
    fn name(&self) -> &'static str {
        "building"
    }

    fn equation_count(&self) -> usize {
        2
    }

    fn check_ports(&self, nodes: &ElementNodes) -> ElementResult<()> {
        expect_ports(self.name(), nodes, 0, 0, 1)
    }

    fn stamp(
        &self,
        _id: ElementId,
        nodes: &ElementNodes,
        ctx: &StampContext<'_>,
        rows: &mut RowBlock<'_>,
    ) -> ElementResult<()> {
        let indoor = first(self.name(), &nodes.sensors, "a sensed indoor node")?;
        let env = &ctx.params.envelope;
        let conductance = env.ua + env.infiltration * AIR_SPECIFIC_HEAT;
        let moisture = env.infiltration * LATENT_HEAT;

        rows.temperature(0, indoor, conductance)?;
        rows.aux(0, self.zone, ThermalZone::SENSIBLE, 1.0)?;
        rows.constant(0, conductance * ctx.outdoor.temperature + env.sensible_load)?;

        rows.humidity_ratio(1, indoor, moisture)?;
        rows.aux(1, self.zone, ThermalZone::LATENT, 1.0)?;
        rows.constant(1, moisture * ctx.outdoor.humidity_ratio + env.latent_load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AirCondition, Envelope, OperatingParameters};
    use ahu_network::{NetworkBuilder, PortKind};
    use ahu_psychro::PsyState;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn building_rows_balance_envelope_losses() {
        let mut b = NetworkBuilder::new();
        let s = b.add_given_node("supply", 30.0, 0.3);
        let i = b.add_node("indoor");
        let tz = b.add_element(
            "TZ",
            &[(s, PortKind::Inlet), (i, PortKind::Outlet)],
            &["Qs", "Ql"],
        );
        let bl = b.add_element("BL", &[(i, PortKind::Sensor)], &[]);
        let net = b.build().unwrap();

        let p = OperatingParameters::new(
            4.84,
            AirCondition::new(-1.0, 1.0),
            AirCondition::new(18.0, 0.5),
            Envelope {
                ua: 935.83,
                infiltration: 2.12,
                sensible_load: 500.0,
                latent_load: 100.0,
            },
        );
        let outdoor = p.outdoor_state().unwrap();
        let ctx = StampContext {
            params: &p,
            linearization_temperature: 5.0,
            outdoor,
            layout: net.layout(),
        };
        let known = vec![Some(PsyState::new(30.0, 0.008).unwrap()), None];
        let building = Building::new(tz);
        let nodes = net.element_nodes(bl).unwrap();
        building.check_ports(&nodes).unwrap();

        let n = net.layout().len();
        let mut a = DMatrix::zeros(2, n);
        let mut rhs = DVector::zeros(2);
        let mut rows = RowBlock::new(&mut a, &mut rhs, 0, 2, net.layout(), &known);
        building.stamp(bl, &nodes, &ctx, &mut rows).unwrap();

        let g = 935.83 + 2.12 * AIR_SPECIFIC_HEAT;
        assert!((a[(0, 0)] - g).abs() < 1e-9);
        assert_eq!(a[(0, 2)], 1.0);
        assert!((rhs[0] - (g * -1.0 + 500.0)).abs() < 1e-9);
        assert!((a[(1, 1)] - 2.12 * LATENT_HEAT).abs() < 1e-6);
        assert_eq!(a[(1, 3)], 1.0);
        let expected = 2.12 * LATENT_HEAT * outdoor.humidity_ratio + 100.0;
        assert!((rhs[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn zone_and_building_port_arity() {
        let one = ElementNodes {
            inlets: vec![],
            outlets: vec![],
            sensors: vec![ahu_core::NodeId::from_index(0)],
        };
        assert!(Building::new(ElementId::from_index(0)).check_ports(&one).is_ok());
        assert!(ThermalZone::new().check_ports(&one).is_err());
    }
}
