//! Network-specific error types.

use ahu_core::{AhuError, ElementId, NodeId, PortId};

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A port refers to a node that doesn't exist.
    InvalidNodeRef { port: PortId, node: NodeId },

    /// A port refers to an element that doesn't exist.
    InvalidElementRef { port: PortId, element: ElementId },

    /// An element has no ports at all.
    EmptyElement { element: ElementId },

    /// A port's element field doesn't match the element containing it.
    PortElementMismatch {
        port: PortId,
        expected: ElementId,
        actual: ElementId,
    },

    /// A boundary node (outdoor or given state) is written by an element.
    BoundaryOutlet { node: NodeId, element: ElementId },

    /// A free node is not the outlet of any element.
    UnproducedNode { node: NodeId },

    /// A free node is the outlet of more than one element.
    MultipleProducers { node: NodeId },

    /// Two nodes or two elements share a name.
    DuplicateName { what: &'static str, name: String },

    /// Adjacency list is inconsistent (port in node's list but port doesn't reference node).
    InconsistentAdjacency { port: PortId, node: NodeId },

    /// ID or name not found.
    IdNotFound { what: &'static str },

    /// Auxiliary unknown slot beyond what the element declares.
    AuxSlotOob {
        element: ElementId,
        slot: usize,
        len: usize,
    },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::InvalidNodeRef { port, node } => {
                write!(f, "Port {} refers to non-existent node {}", port, node)
            }
            NetworkError::InvalidElementRef { port, element } => {
                write!(f, "Port {} refers to non-existent element {}", port, element)
            }
            NetworkError::EmptyElement { element } => {
                write!(f, "Element {} has no ports", element)
            }
            NetworkError::PortElementMismatch {
                port,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Port {} should belong to element {} but references {}",
                    port, expected, actual
                )
            }
            NetworkError::BoundaryOutlet { node, element } => {
                write!(
                    f,
                    "Boundary node {} cannot be an outlet of element {}",
                    node, element
                )
            }
            NetworkError::UnproducedNode { node } => {
                write!(f, "Free node {} is not the outlet of any element", node)
            }
            NetworkError::MultipleProducers { node } => {
                write!(f, "Free node {} is the outlet of more than one element", node)
            }
            NetworkError::DuplicateName { what, name } => {
                write!(f, "Duplicate {} name '{}'", what, name)
            }
            NetworkError::InconsistentAdjacency { port, node } => {
                write!(
                    f,
                    "Port {} in node {}'s adjacency list but doesn't reference that node",
                    port, node
                )
            }
            NetworkError::IdNotFound { what } => {
                write!(f, "{} not found in network", what)
            }
            NetworkError::AuxSlotOob { element, slot, len } => {
                write!(
                    f,
                    "Element {} has {} auxiliary unknowns, slot {} requested",
                    element, len, slot
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for AhuError {
    fn from(err: NetworkError) -> Self {
        AhuError::Invariant {
            what: Box::leak(err.to_string().into_boxed_str()),
        }
    }
}
