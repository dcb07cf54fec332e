//! Solution of one network solve.

use ahu_core::{ElementId, NodeId};
use ahu_network::{Unknown, UnknownLayout};
use ahu_psychro::PsyState;
use nalgebra::DVector;

use crate::error::SolverResult;

/// Values of every unknown plus the known boundary states.
///
/// Produced whole by each solve; never updated in place.
#[derive(Debug, Clone)]
pub struct NetworkSolution {
    layout: UnknownLayout,
    values: DVector<f64>,
    /// Boundary states by node slot.
    known: Vec<Option<PsyState>>,
    /// Linearization temperature of the last solve, °C.
    pub linearization_temperature: f64,
    /// Saturation iterations performed (0 without a saturated node).
    pub iterations: usize,
    /// Saturation residual of the last iteration (0 without a saturated node).
    pub residual: f64,
}

impl NetworkSolution {
    pub(crate) fn new(
        layout: &UnknownLayout,
        values: DVector<f64>,
        known: Vec<Option<PsyState>>,
        linearization_temperature: f64,
    ) -> Self {
        Self {
            layout: layout.clone(),
            values,
            known,
            linearization_temperature,
            iterations: 0,
            residual: 0.0,
        }
    }

    /// Raw unknown vector in layout order.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// Symbolic label of each entry of [`values`](Self::values).
    pub fn labels(&self) -> &[String] {
        self.layout.labels()
    }

    /// Value of an unknown by label (`"supply.t"`, `"HC.Qs"`, ...).
    pub fn value(&self, label: &str) -> Option<f64> {
        self.layout.column_of(label).map(|c| self.values[c])
    }

    pub fn temperature(&self, node: NodeId) -> Option<f64> {
        match self.layout.temperature_column(node) {
            Some(col) => Some(self.values[col]),
            None => self.boundary(node).map(|s| s.temperature),
        }
    }

    pub fn humidity_ratio(&self, node: NodeId) -> Option<f64> {
        match self.layout.humidity_column(node) {
            Some(col) => Some(self.values[col]),
            None => self.boundary(node).map(|s| s.humidity_ratio),
        }
    }

    /// State of a node; fails if the solved humidity ratio is negative.
    pub fn state(&self, node: NodeId) -> SolverResult<Option<PsyState>> {
        match (self.temperature(node), self.humidity_ratio(node)) {
            (Some(t), Some(w)) => Ok(Some(PsyState::new(t, w)?)),
            _ => Ok(None),
        }
    }

    /// Auxiliary heat or vapor flow of an element, W.
    pub fn aux(&self, element: ElementId, slot: usize) -> SolverResult<f64> {
        let col = self.layout.aux_column(element, slot)?;
        Ok(self.values[col])
    }

    /// Auxiliary unknowns with their labels, in layout order.
    pub fn loads(&self) -> impl Iterator<Item = (&str, f64)> {
        self.layout
            .unknowns()
            .iter()
            .zip(self.layout.labels())
            .zip(self.values.iter())
            .filter(|((u, _), _)| matches!(u, Unknown::Aux { .. }))
            .map(|((_, label), v)| (label.as_str(), *v))
    }

    fn boundary(&self, node: NodeId) -> Option<PsyState> {
        self.known.get(node.slot()).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearConfig;
    use crate::solve::solve_linearized;
    use crate::topology::TopologyBuilder;
    use ahu_elements::{AirCondition, Envelope, HeatingCoil, OperatingParameters, Share};
    use ahu_elements::{AuxRef, Controller, Gain};
    use ahu_network::PortKind;

    #[test]
    fn reads_free_and_boundary_nodes() {
        let mut b = TopologyBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        let hc = b.add_element(
            "HC",
            &[(o, PortKind::Inlet), (s, PortKind::Outlet)],
            HeatingCoil::new(Share::Supply),
        );
        b.add_element(
            "K",
            &[(s, PortKind::Sensor)],
            Controller::temperature(AuxRef::new(hc, HeatingCoil::SENSIBLE)),
        );
        let t = b.build().unwrap();

        let mut p = OperatingParameters::new(
            2.0,
            AirCondition::new(0.0, 0.5),
            AirCondition::new(20.0, 0.5),
            Envelope {
                ua: 0.0,
                infiltration: 0.0,
                sensible_load: 0.0,
                latent_load: 0.0,
            },
        );
        p.gains.temperature = Gain::Exact;
        let sol = solve_linearized(&t, &p, 5.0, &LinearConfig::default()).unwrap();

        assert_eq!(sol.temperature(o), Some(0.0));
        assert!((sol.temperature(s).unwrap() - 20.0).abs() < 1e-9);
        assert!((sol.humidity_ratio(s).unwrap() - sol.humidity_ratio(o).unwrap()).abs() < 1e-15);
        assert!((sol.aux(hc, 0).unwrap() - 40e3).abs() < 1e-6);
        assert!(sol.aux(hc, 1).is_err());
        let loads: Vec<_> = sol.loads().collect();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].0, "HC.Qs");
        assert!(sol.state(s).unwrap().is_some());
        assert_eq!(sol.labels(), ["supply.t", "supply.w", "HC.Qs"]);
    }
}
