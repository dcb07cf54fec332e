//! Incremental network builder.

use std::collections::HashMap;

use ahu_core::{ElementId, NodeId, PortId};

use crate::error::NetworkResult;
use crate::layout::UnknownLayout;
use crate::network::{Element, Network, Node, NodeKind, Port, PortKind};
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// Use `add_*node` and `add_element` to build up the network, then call
/// `build()` to validate and freeze it into an immutable `Network`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    ports: Vec<Port>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
            kind,
        });
        id
    }

    /// Add a node whose state is solved for.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(name, NodeKind::Free)
    }

    /// Add a node carrying the outdoor condition.
    pub fn add_outdoor_node(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(name, NodeKind::Outdoor)
    }

    /// Add an inlet node with a fixed state.
    pub fn add_given_node(
        &mut self,
        name: impl Into<String>,
        temperature: f64,
        relative_humidity: f64,
    ) -> NodeId {
        self.push_node(
            name,
            NodeKind::Given {
                temperature,
                relative_humidity,
            },
        )
    }

    /// Add an element attached to `ports` (node, role) in the given order,
    /// declaring one auxiliary unknown per entry of `aux`.
    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        ports: &[(NodeId, PortKind)],
        aux: &[&str],
    ) -> ElementId {
        let element_id = ElementId::from_index(self.elements.len() as u32);
        let mut port_ids = Vec::with_capacity(ports.len());
        for &(node, kind) in ports {
            let port_id = PortId::from_index(self.ports.len() as u32);
            self.ports.push(Port {
                id: port_id,
                element: element_id,
                node,
                kind,
            });
            port_ids.push(port_id);
        }
        self.elements.push(Element {
            id: element_id,
            name: name.into(),
            ports: port_ids,
            aux: aux.iter().map(|s| s.to_string()).collect(),
        });
        element_id
    }

    /// Validate and freeze the network.
    pub fn build(self) -> NetworkResult<Network> {
        validate::validate_structure(&self.nodes, &self.elements, &self.ports)?;

        let (node_port_offsets, node_ports) = Self::build_adjacency(&self.nodes, &self.ports);
        validate::validate_adjacency(&self.nodes, &self.ports, &node_port_offsets, &node_ports)?;
        validate::validate_flow(&self.nodes, &self.ports)?;

        let layout = UnknownLayout::new(&self.nodes, &self.elements);

        Ok(Network {
            nodes: self.nodes,
            elements: self.elements,
            ports: self.ports,
            node_port_offsets,
            node_ports,
            layout,
        })
    }

    fn build_adjacency(nodes: &[Node], ports: &[Port]) -> (Vec<usize>, Vec<PortId>) {
        let mut node_to_ports: HashMap<NodeId, Vec<PortId>> = HashMap::new();
        for port in ports {
            node_to_ports.entry(port.node).or_default().push(port.id);
        }
        for ports_list in node_to_ports.values_mut() {
            ports_list.sort_by_key(|p| p.index());
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat_ports = Vec::new();
        offsets.push(0);
        for node in nodes {
            if let Some(ports_list) = node_to_ports.get(&node.id) {
                flat_ports.extend_from_slice(ports_list);
            }
            offsets.push(flat_ports.len());
        }

        (offsets, flat_ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_outdoor_node("outdoor");
        let n2 = builder.add_node("supply");
        let e1 = builder.add_element(
            "HC",
            &[(n1, PortKind::Inlet), (n2, PortKind::Outlet)],
            &["Qs"],
        );

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(e1.index(), 0);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.elements.len(), 1);
        assert_eq!(builder.ports.len(), 2);
    }

    #[test]
    fn builder_build_simple() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_outdoor_node("outdoor");
        let n2 = builder.add_node("supply");
        builder.add_element(
            "HC",
            &[(n1, PortKind::Inlet), (n2, PortKind::Outlet)],
            &["Qs"],
        );

        let network = builder.build().unwrap();
        assert_eq!(network.nodes().len(), 2);
        assert_eq!(network.elements().len(), 1);
        assert_eq!(network.ports().len(), 2);
        assert_eq!(network.node_ports(n1).len(), 1);
        assert_eq!(network.node_ports(n2).len(), 1);
    }
}
