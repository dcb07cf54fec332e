//! Network validation logic.

use std::collections::HashSet;

use ahu_core::{NodeId, PortId};

use crate::error::{NetworkError, NetworkResult};
use crate::network::{Element, Node, Port, PortKind};

/// All references exist, ports are consistent, names are unique.
pub(crate) fn validate_structure(
    nodes: &[Node],
    elements: &[Element],
    ports: &[Port],
) -> NetworkResult<()> {
    for (i, port) in ports.iter().enumerate() {
        if port.id.slot() != i {
            return Err(NetworkError::InconsistentAdjacency {
                port: port.id,
                node: port.node,
            });
        }
        if port.node.slot() >= nodes.len() {
            return Err(NetworkError::InvalidNodeRef {
                port: port.id,
                node: port.node,
            });
        }
        if port.element.slot() >= elements.len() {
            return Err(NetworkError::InvalidElementRef {
                port: port.id,
                element: port.element,
            });
        }
    }

    for element in elements {
        if element.ports.is_empty() {
            return Err(NetworkError::EmptyElement {
                element: element.id,
            });
        }
        for &port_id in &element.ports {
            let port = ports
                .get(port_id.slot())
                .ok_or(NetworkError::InvalidElementRef {
                    port: port_id,
                    element: element.id,
                })?;
            if port.element != element.id {
                return Err(NetworkError::PortElementMismatch {
                    port: port_id,
                    expected: element.id,
                    actual: port.element,
                });
            }
        }
    }

    let mut names = HashSet::new();
    for node in nodes {
        if !names.insert(node.name.as_str()) {
            return Err(NetworkError::DuplicateName {
                what: "node",
                name: node.name.clone(),
            });
        }
    }
    let mut names = HashSet::new();
    for element in elements {
        if !names.insert(element.name.as_str()) {
            return Err(NetworkError::DuplicateName {
                what: "element",
                name: element.name.clone(),
            });
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    ports: &[Port],
    node_port_offsets: &[usize],
    node_ports: &[PortId],
) -> NetworkResult<()> {
    if node_port_offsets.len() != nodes.len() + 1 {
        return Err(NetworkError::InconsistentAdjacency {
            port: PortId::from_index(0),
            node: nodes.first().map_or(NodeId::from_index(0), |n| n.id),
        });
    }

    for node in nodes {
        let idx = node.id.slot();
        let start = node_port_offsets[idx];
        let end = node_port_offsets[idx + 1];

        for &port_id in &node_ports[start..end] {
            match ports.get(port_id.slot()) {
                Some(port) if port.node == node.id => {}
                _ => {
                    return Err(NetworkError::InconsistentAdjacency {
                        port: port_id,
                        node: node.id,
                    });
                }
            }
        }
    }

    let mut ports_in_adj: HashSet<PortId> = HashSet::new();
    for &port_id in node_ports {
        if !ports_in_adj.insert(port_id) {
            return Err(NetworkError::InconsistentAdjacency {
                port: port_id,
                node: ports[port_id.slot()].node,
            });
        }
    }
    for port in ports {
        if !ports_in_adj.contains(&port.id) {
            return Err(NetworkError::InconsistentAdjacency {
                port: port.id,
                node: port.node,
            });
        }
    }

    Ok(())
}

/// Every free node is the outlet of exactly one element; boundary nodes are
/// never outlets.
pub(crate) fn validate_flow(nodes: &[Node], ports: &[Port]) -> NetworkResult<()> {
    let mut producers = vec![0usize; nodes.len()];
    for port in ports.iter().filter(|p| p.kind == PortKind::Outlet) {
        let node = &nodes[port.node.slot()];
        if !node.kind.is_free() {
            return Err(NetworkError::BoundaryOutlet {
                node: node.id,
                element: port.element,
            });
        }
        producers[port.node.slot()] += 1;
    }

    for node in nodes.iter().filter(|n| n.kind.is_free()) {
        match producers[node.id.slot()] {
            0 => return Err(NetworkError::UnproducedNode { node: node.id }),
            1 => {}
            _ => return Err(NetworkError::MultipleProducers { node: node.id }),
        }
    }

    Ok(())
}
