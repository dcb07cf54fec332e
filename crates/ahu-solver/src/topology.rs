//! Topology: a network plus the behaviour of each of its elements.

use std::collections::HashMap;

use ahu_core::{ElementId, NodeId};
use ahu_elements::BalanceElement;
use ahu_network::{ElementNodes, Network, NetworkBuilder, PortKind};

use crate::error::{SolverError, SolverResult};

/// An element with its nodes, first row and row count.
pub(crate) type Block<'a> = (ElementId, &'a dyn BalanceElement, &'a ElementNodes, usize, usize);

/// Immutable description of one AHU variant.
///
/// Row ordering follows element declaration order; column ordering is the
/// network's [`ahu_network::UnknownLayout`]. Both are fixed at build time.
pub struct Topology {
    network: Network,
    elements: HashMap<ElementId, Box<dyn BalanceElement>>,
    element_nodes: Vec<ElementNodes>,
    row_offsets: Vec<usize>,
    saturated: Option<(ElementId, NodeId)>,
    indoor: Option<NodeId>,
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("nodes", &self.network.nodes().len())
            .field("elements", &self.network.elements().len())
            .field("unknowns", &self.network.layout().len())
            .field("saturated", &self.saturated)
            .finish()
    }
}

impl Topology {
    /// Pair a network with element behaviours and check that the system is
    /// square and carries at most one saturation row.
    pub fn new(
        network: Network,
        elements: HashMap<ElementId, Box<dyn BalanceElement>>,
    ) -> SolverResult<Self> {
        let mut element_nodes = Vec::with_capacity(network.elements().len());
        let mut row_offsets = Vec::with_capacity(network.elements().len() + 1);
        let mut saturated = None;
        let mut rows = 0;
        row_offsets.push(0);

        for info in network.elements() {
            let element = elements.get(&info.id).ok_or_else(|| SolverError::ProblemSetup {
                what: format!("Element '{}' has no behaviour", info.name),
            })?;
            let labels = element.aux_labels();
            let matches = labels.len() == info.aux.len()
                && labels.iter().zip(&info.aux).all(|(a, b)| *a == b.as_str());
            if !matches {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "Element '{}' declares unknowns {:?}, {} expects {:?}",
                        info.name,
                        info.aux,
                        element.name(),
                        labels
                    ),
                });
            }
            let nodes = network.element_nodes(info.id)?;
            element.check_ports(&nodes)?;
            if let Some(node) = element.saturated_node(&nodes) {
                if let Some((other, _)) = saturated {
                    return Err(SolverError::ProblemSetup {
                        what: format!(
                            "Elements {} and {} both constrain a node to saturation",
                            other, info.id
                        ),
                    });
                }
                saturated = Some((info.id, node));
            }
            rows += element.equation_count();
            row_offsets.push(rows);
            element_nodes.push(nodes);
        }

        if elements.len() != network.elements().len() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "{} behaviours for {} elements",
                    elements.len(),
                    network.elements().len()
                ),
            });
        }

        let unknowns = network.layout().len();
        if rows != unknowns {
            return Err(SolverError::ProblemSetup {
                what: format!("{rows} equations for {unknowns} unknowns"),
            });
        }

        Ok(Self {
            network,
            elements,
            element_nodes,
            row_offsets,
            saturated,
            indoor: None,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Number of equations, equal to the number of unknowns.
    pub fn size(&self) -> usize {
        self.network.layout().len()
    }

    pub fn element(&self, id: ElementId) -> Option<&dyn BalanceElement> {
        self.elements.get(&id).map(|e| e.as_ref())
    }

    /// Elements in row order with their nodes and first row.
    pub(crate) fn blocks(&self) -> impl Iterator<Item = SolverResult<Block<'_>>> {
        self.network.elements().iter().enumerate().map(|(i, info)| {
            let element = self.element(info.id).ok_or_else(|| SolverError::ProblemSetup {
                what: format!("Element '{}' has no behaviour", info.name),
            })?;
            let first = self.row_offsets[i];
            let count = self.row_offsets[i + 1] - first;
            Ok((info.id, element, &self.element_nodes[i], first, count))
        })
    }

    /// Element and node held on the saturation curve, if any.
    pub fn saturated(&self) -> Option<(ElementId, NodeId)> {
        self.saturated
    }

    /// Node standing for the conditioned space.
    pub fn indoor(&self) -> Option<NodeId> {
        self.indoor
    }

    pub fn with_indoor(mut self, node: NodeId) -> Self {
        self.indoor = Some(node);
        self
    }

    pub fn node_by_name(&self, name: &str) -> SolverResult<NodeId> {
        Ok(self.network.node_by_name(name)?)
    }

    pub fn element_by_name(&self, name: &str) -> SolverResult<ElementId> {
        Ok(self.network.element_by_name(name)?)
    }
}

/// Builds a network and its element behaviours together.
///
/// The auxiliary unknowns of each element are taken from its
/// [`BalanceElement::aux_labels`].
#[derive(Default)]
pub struct TopologyBuilder {
    network: NetworkBuilder,
    elements: HashMap<ElementId, Box<dyn BalanceElement>>,
    indoor: Option<NodeId>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.network.add_node(name)
    }

    pub fn add_outdoor_node(&mut self, name: impl Into<String>) -> NodeId {
        self.network.add_outdoor_node(name)
    }

    pub fn add_given_node(
        &mut self,
        name: impl Into<String>,
        temperature: f64,
        relative_humidity: f64,
    ) -> NodeId {
        self.network
            .add_given_node(name, temperature, relative_humidity)
    }

    /// Mark the node the indoor controllers and searches refer to.
    pub fn set_indoor(&mut self, node: NodeId) {
        self.indoor = Some(node);
    }

    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        ports: &[(NodeId, PortKind)],
        element: impl BalanceElement + 'static,
    ) -> ElementId {
        let id = self
            .network
            .add_element(name, ports, element.aux_labels());
        self.elements.insert(id, Box::new(element));
        id
    }

    pub fn build(self) -> SolverResult<Topology> {
        let network = self.network.build()?;
        let topology = Topology::new(network, self.elements)?;
        Ok(match self.indoor {
            Some(node) => topology.with_indoor(node),
            None => topology,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahu_elements::{AdiabaticHumidifier, CoolingCoil, HeatingCoil, Share};

    #[test]
    fn square_single_coil() {
        let mut b = TopologyBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        b.add_element(
            "HC",
            &[(o, PortKind::Inlet), (s, PortKind::Outlet)],
            HeatingCoil::new(Share::Supply),
        );
        // 2 node unknowns + Qs against 2 rows.
        let err = b.build().unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }

    #[test]
    fn two_saturation_rows_rejected() {
        let mut b = TopologyBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let n1 = b.add_node("1");
        let n2 = b.add_node("2");
        b.add_element(
            "CC",
            &[(o, PortKind::Inlet), (n1, PortKind::Outlet)],
            CoolingCoil::new(Share::Supply),
        );
        b.add_element(
            "AD",
            &[(n1, PortKind::Inlet), (n2, PortKind::Outlet)],
            AdiabaticHumidifier::new(),
        );
        let err = b.build().unwrap_err();
        assert!(
            matches!(err, SolverError::ProblemSetup { ref what } if what.contains("saturation"))
        );
    }

    #[test]
    fn saturated_node_is_recorded() {
        let mut b = TopologyBuilder::new();
        let i = b.add_given_node("in", 30.0, 0.2);
        let o = b.add_node("out");
        let ad = b.add_element(
            "AD",
            &[(i, PortKind::Inlet), (o, PortKind::Outlet)],
            AdiabaticHumidifier::new(),
        );
        b.set_indoor(o);
        let t = b.build().unwrap();
        assert_eq!(t.saturated(), Some((ad, o)));
        assert_eq!(t.indoor(), Some(o));
        assert_eq!(t.size(), 2);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut b = TopologyBuilder::new();
        let i = b.add_given_node("in", 30.0, 0.2);
        let j = b.add_given_node("in2", 20.0, 0.2);
        let o = b.add_node("out");
        b.add_element(
            "AD",
            &[(i, PortKind::Inlet), (j, PortKind::Inlet), (o, PortKind::Outlet)],
            AdiabaticHumidifier::new(),
        );
        assert!(matches!(b.build(), Err(SolverError::Element(_))));
    }
}
