//! Layout of the unknown vector.
//!
//! Free nodes contribute a temperature and a humidity-ratio column each, in
//! node declaration order; auxiliary heat and vapor flows follow in element
//! declaration order. The ordering depends only on the network, so every
//! solve of the same network indexes unknowns identically.

use ahu_core::{ElementId, NodeId};

use crate::error::{NetworkError, NetworkResult};
use crate::network::{Element, Node};

/// What one entry of the solution vector stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unknown {
    Temperature(NodeId),
    HumidityRatio(NodeId),
    Aux { element: ElementId, slot: usize },
}

/// Column assignment for every unknown, with a symbolic label per column.
#[derive(Debug, Clone, Default)]
pub struct UnknownLayout {
    /// Temperature column per node slot; the humidity ratio follows it.
    node_columns: Vec<Option<usize>>,
    /// First auxiliary column per element slot.
    aux_offsets: Vec<usize>,
    aux_counts: Vec<usize>,
    unknowns: Vec<Unknown>,
    labels: Vec<String>,
}

impl UnknownLayout {
    pub(crate) fn new(nodes: &[Node], elements: &[Element]) -> Self {
        let mut layout = UnknownLayout::default();

        for node in nodes {
            if node.kind.is_free() {
                layout.node_columns.push(Some(layout.unknowns.len()));
                layout.push(Unknown::Temperature(node.id), format!("{}.t", node.name));
                layout.push(Unknown::HumidityRatio(node.id), format!("{}.w", node.name));
            } else {
                layout.node_columns.push(None);
            }
        }

        for element in elements {
            layout.aux_offsets.push(layout.unknowns.len());
            layout.aux_counts.push(element.aux.len());
            for (slot, name) in element.aux.iter().enumerate() {
                layout.push(
                    Unknown::Aux {
                        element: element.id,
                        slot,
                    },
                    format!("{}.{}", element.name, name),
                );
            }
        }

        layout
    }

    fn push(&mut self, unknown: Unknown, label: String) {
        self.unknowns.push(unknown);
        self.labels.push(label);
    }

    /// Number of unknowns (and of equations in a square system).
    pub fn len(&self) -> usize {
        self.unknowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unknowns.is_empty()
    }

    /// Temperature column of a node, `None` for boundary nodes.
    pub fn temperature_column(&self, node: NodeId) -> Option<usize> {
        self.node_columns.get(node.slot()).copied().flatten()
    }

    /// Humidity-ratio column of a node, `None` for boundary nodes.
    pub fn humidity_column(&self, node: NodeId) -> Option<usize> {
        self.temperature_column(node).map(|c| c + 1)
    }

    /// Column of an element's auxiliary unknown.
    pub fn aux_column(&self, element: ElementId, slot: usize) -> NetworkResult<usize> {
        let idx = element.slot();
        let (offset, len) = match (self.aux_offsets.get(idx), self.aux_counts.get(idx)) {
            (Some(&o), Some(&n)) => (o, n),
            _ => return Err(NetworkError::IdNotFound { what: "ElementId" }),
        };
        if slot >= len {
            return Err(NetworkError::AuxSlotOob {
                element,
                slot,
                len,
            });
        }
        Ok(offset + slot)
    }

    pub fn unknown(&self, column: usize) -> Option<Unknown> {
        self.unknowns.get(column).copied()
    }

    pub fn unknowns(&self) -> &[Unknown] {
        &self.unknowns
    }

    /// Symbolic labels in column order (`supply.t`, `supply.w`, `heating coil.Qs`, ...).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;
    use crate::network::PortKind;

    #[test]
    fn free_nodes_then_aux() {
        let mut b = NetworkBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        let hc = b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &["Qs"]);
        let net = b.build().unwrap();
        let layout = net.layout();

        assert_eq!(layout.len(), 3);
        assert_eq!(layout.temperature_column(o), None);
        assert_eq!(layout.temperature_column(s), Some(0));
        assert_eq!(layout.humidity_column(s), Some(1));
        assert_eq!(layout.aux_column(hc, 0).unwrap(), 2);
        assert_eq!(layout.labels(), ["supply.t", "supply.w", "HC.Qs"]);
        assert_eq!(layout.column_of("HC.Qs"), Some(2));
        assert_eq!(layout.unknown(1), Some(Unknown::HumidityRatio(s)));
    }

    #[test]
    fn aux_slot_out_of_range() {
        let mut b = NetworkBuilder::new();
        let o = b.add_outdoor_node("outdoor");
        let s = b.add_node("supply");
        let hc = b.add_element("HC", &[(o, PortKind::Inlet), (s, PortKind::Outlet)], &["Qs"]);
        let net = b.build().unwrap();

        assert!(matches!(
            net.layout().aux_column(hc, 1),
            Err(NetworkError::AuxSlotOob { slot: 1, len: 1, .. })
        ));
        assert!(
            net.layout()
                .aux_column(ElementId::from_index(9), 0)
                .is_err()
        );
    }
}
