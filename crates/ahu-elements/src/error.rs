//! Error types for element operations.

use ahu_core::{AhuError, NodeId};
use ahu_network::NetworkError;
use ahu_psychro::PsychroError;
use thiserror::Error;

/// Errors raised while validating parameters or stamping balance rows.
#[derive(Error, Debug, Clone)]
pub enum ElementError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("{element} expects {expected}, found {found}")]
    PortArity {
        element: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("Row {row} outside the element's block of {count}")]
    RowOutOfBlock { row: usize, count: usize },

    #[error("Node {node} has neither a column nor a known state")]
    UnresolvedNode { node: NodeId },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Psychro(#[from] PsychroError),
}

pub type ElementResult<T> = Result<T, ElementError>;

impl From<AhuError> for ElementError {
    fn from(e: AhuError) -> Self {
        match e {
            AhuError::NonFinite { what, .. }
            | AhuError::InvalidArg { what }
            | AhuError::IndexOob { what, .. }
            | AhuError::Invariant { what } => ElementError::InvalidArg { what },
        }
    }
}

impl From<ElementError> for AhuError {
    fn from(e: ElementError) -> Self {
        match e {
            ElementError::InvalidArg { what } => AhuError::InvalidArg { what },
            ElementError::PortArity { element, .. } => AhuError::InvalidArg { what: element },
            ElementError::RowOutOfBlock { row, count } => AhuError::IndexOob {
                what: "element row",
                index: row,
                len: count,
            },
            ElementError::UnresolvedNode { .. } => AhuError::Invariant {
                what: "unresolved node",
            },
            ElementError::Network(err) => err.into(),
            ElementError::Psychro(err) => err.into(),
        }
    }
}
