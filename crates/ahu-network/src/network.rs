//! Core network data structures.

use ahu_core::{ElementId, NodeId, PortId};

use crate::error::{NetworkError, NetworkResult};
use crate::layout::UnknownLayout;

/// Role of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Air entering the element.
    Inlet,
    /// Air leaving the element; the element's equations determine this node.
    Outlet,
    /// Node read by the element without any air flow (zone envelope, controller).
    Sensor,
}

/// Whether a node's state is solved for or known in advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Temperature and humidity ratio are unknowns of the linear system.
    Free,
    /// State equals the outdoor condition of the operating parameters.
    Outdoor,
    /// Fixed inlet state.
    Given {
        temperature: f64,
        relative_humidity: f64,
    },
}

impl NodeKind {
    pub fn is_free(&self) -> bool {
        matches!(self, NodeKind::Free)
    }
}

/// A psychrometric node: one point on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

/// A port connects an element to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub element: ElementId,
    pub node: NodeId,
    pub kind: PortKind,
}

/// A balance element: mixing box, coil, humidifier, zone, building or controller.
///
/// Ports are stored in declaration order (inlets, then outlets, then sensors).
/// `aux` names the heat or vapor flows the element adds to the unknown vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub ports: Vec<PortId>,
    pub aux: Vec<String>,
}

/// Node sets of one element, grouped by port kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementNodes {
    pub inlets: Vec<NodeId>,
    pub outlets: Vec<NodeId>,
    pub sensors: Vec<NodeId>,
}

/// The network: a validated, immutable collection of nodes, elements and ports,
/// with the layout of the unknown vector fixed at build time.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
    pub(crate) ports: Vec<Port>,

    /// Node i's ports are in node_ports[node_port_offsets[i]..node_port_offsets[i+1]].
    pub(crate) node_port_offsets: Vec<usize>,
    pub(crate) node_ports: Vec<PortId>,

    pub(crate) layout: UnknownLayout,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.slot())
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot())
    }

    /// Port IDs incident to a node.
    pub fn node_ports(&self, node_id: NodeId) -> &[PortId] {
        let idx = node_id.slot();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_port_offsets[idx];
        let end = self.node_port_offsets[idx + 1];
        &self.node_ports[start..end]
    }

    /// Look up a node by name.
    pub fn node_by_name(&self, name: &str) -> NetworkResult<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.id)
            .ok_or(NetworkError::IdNotFound { what: "node name" })
    }

    /// Look up an element by name.
    pub fn element_by_name(&self, name: &str) -> NetworkResult<ElementId> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id)
            .ok_or(NetworkError::IdNotFound {
                what: "element name",
            })
    }

    /// Nodes attached to an element, grouped by port kind.
    pub fn element_nodes(&self, id: ElementId) -> NetworkResult<ElementNodes> {
        let element = self
            .element(id)
            .ok_or(NetworkError::IdNotFound { what: "ElementId" })?;
        let mut nodes = ElementNodes::default();
        for &port_id in &element.ports {
            let port = self
                .port(port_id)
                .ok_or(NetworkError::IdNotFound { what: "PortId" })?;
            match port.kind {
                PortKind::Inlet => nodes.inlets.push(port.node),
                PortKind::Outlet => nodes.outlets.push(port.node),
                PortKind::Sensor => nodes.sensors.push(port.node),
            }
        }
        Ok(nodes)
    }

    /// Element whose outlet is `node`, if any.
    pub fn producer(&self, node: NodeId) -> Option<ElementId> {
        self.node_ports(node)
            .iter()
            .filter_map(|&p| self.port(p))
            .find(|p| p.kind == PortKind::Outlet)
            .map(|p| p.element)
    }

    /// Layout of the unknown vector.
    pub fn layout(&self) -> &UnknownLayout {
        &self.layout
    }
}
