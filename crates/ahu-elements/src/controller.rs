//! Indoor controllers written as balance rows.

use ahu_core::ElementId;
use ahu_network::ElementNodes;

use crate::common::{AuxRef, expect_ports, first};
use crate::error::ElementResult;
use crate::params::Gain;
use crate::traits::{BalanceElement, RowBlock, StampContext};

/// Indoor variable held at its setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlledVariable {
    Temperature,
    HumidityRatio,
}

/// Drives an actuator (a heat or vapor flow of another element) so that the
/// sensed node sits at the indoor setpoint.
///
/// The row depends on the gain selected in the operating parameters:
/// `k·x + Q = k·x_sp` for `Proportional(k)`, `x = x_sp` for `Exact`, and
/// `Q = 0` for `Off`.
#[derive(Debug, Clone)]
pub struct Controller {
    variable: ControlledVariable,
    actuator: AuxRef,
}

impl Controller {
    pub fn new(variable: ControlledVariable, actuator: AuxRef) -> Self {
        Self { variable, actuator }
    }

    pub fn temperature(actuator: AuxRef) -> Self {
        Self::new(ControlledVariable::Temperature, actuator)
    }

    pub fn humidity_ratio(actuator: AuxRef) -> Self {
        Self::new(ControlledVariable::HumidityRatio, actuator)
    }

    pub fn variable(&self) -> ControlledVariable {
        self.variable
    }

    pub fn actuator(&self) -> AuxRef {
        self.actuator
    }
}

impl BalanceElement for Controller {
    fn name(&self) -> &'static str {
        match self.variable {
            ControlledVariable::Temperature => "temperature controller",
            ControlledVariable::HumidityRatio => "humidity controller",
        }
    }

    fn equation_count(&self) -> usize {
        1
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
        let sensed = first(self.name(), &nodes.sensors, "a sensed node")?;
        let params = ctx.params;
        let (gain, setpoint) = match self.variable {
            ControlledVariable::Temperature => {
                (params.gains.temperature, params.indoor_setpoint.temperature)
            }
            ControlledVariable::HumidityRatio => {
                (params.gains.humidity, params.indoor_humidity_setpoint()?)
            }
        };
        let q = self.actuator;

        let sense = |rows: &mut RowBlock<'_>, coef: f64| match self.variable {
            ControlledVariable::Temperature => rows.temperature(0, sensed, coef),
            ControlledVariable::HumidityRatio => rows.humidity_ratio(0, sensed, coef),
        };
        match gain {
            Gain::Proportional(k) => {
                sense(rows, k)?;
                rows.aux(0, q.element, q.slot, 1.0)?;
                rows.constant(0, k * setpoint)
            }
            Gain::Exact => {
                sense(rows, 1.0)?;
                rows.constant(0, setpoint)
            }
            Gain::Off => rows.aux(0, q.element, q.slot, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AirCondition, Envelope, OperatingParameters};
    use ahu_network::{NetworkBuilder, PortKind};
    use ahu_psychro::PsyState;
    use nalgebra::{DMatrix, DVector};

    fn params(gain: Gain) -> OperatingParameters {
        let mut p = OperatingParameters::new(
            1.0,
            AirCondition::new(0.0, 0.5),
            AirCondition::new(20.0, 0.5),
            Envelope {
                ua: 0.0,
                infiltration: 0.0,
                sensible_load: 0.0,
                latent_load: 0.0,
            },
        );
        p.gains.temperature = gain;
        p
    }

    fn stamp_row(gain: Gain) -> (DMatrix<f64>, DVector<f64>) {
        let mut b = NetworkBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        let hc = b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &["Qs"]);
        let k = b.add_element("K", &[(s, PortKind::Sensor)], &[]);
        let net = b.build().unwrap();

        let p = params(gain);
        let outdoor = p.outdoor_state().unwrap();
        let ctx = StampContext {
            params: &p,
            linearization_temperature: 5.0,
            outdoor,
            layout: net.layout(),
        };
        let known: Vec<Option<PsyState>> = vec![Some(outdoor), None];
        let controller = Controller::temperature(AuxRef::new(hc, 0));
        let nodes = net.element_nodes(k).unwrap();
        controller.check_ports(&nodes).unwrap();

        let mut a = DMatrix::zeros(1, 3);
        let mut rhs = DVector::zeros(1);
        let mut rows = RowBlock::new(&mut a, &mut rhs, 0, 1, net.layout(), &known);
        controller.stamp(k, &nodes, &ctx, &mut rows).unwrap();
        (a, rhs)
    }

    #[test]
    fn proportional_row() {
        let (a, rhs) = stamp_row(Gain::Proportional(1e10));
        assert_eq!(a[(0, 0)], 1e10);
        assert_eq!(a[(0, 1)], 0.0);
        assert_eq!(a[(0, 2)], 1.0);
        assert_eq!(rhs[0], 2e11);
    }

    #[test]
    fn exact_row() {
        let (a, rhs) = stamp_row(Gain::Exact);
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(a[(0, 2)], 0.0);
        assert_eq!(rhs[0], 20.0);
    }

    #[test]
    fn off_row() {
        let (a, rhs) = stamp_row(Gain::Off);
        assert_eq!(a[(0, 0)], 0.0);
        assert_eq!(a[(0, 2)], 1.0);
        assert_eq!(rhs[0], 0.0);
    }
}
