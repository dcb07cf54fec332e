//! ahu-network: topology layer of the air-handling unit solver.
//!
//! Provides:
//! - Network data structures (Node, Element, Port, Network)
//! - Incremental network builder with validation
//! - The layout of the unknown vector, with symbolic labels
//!
//! # Example
//!
//! ```
//! use ahu_network::{NetworkBuilder, PortKind};
//!
//! let mut builder = NetworkBuilder::new();
//! let outdoor = builder.add_outdoor_node("outdoor");
//! let supply = builder.add_node("supply");
//! builder.add_element(
//!     "heating coil",
//!     &[(outdoor, PortKind::Inlet), (supply, PortKind::Outlet)],
//!     &["Qs"],
//! );
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert_eq!(network.layout().len(), 3);
//! ```

pub mod builder;
pub mod error;
pub mod layout;
pub mod network;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use layout::{Unknown, UnknownLayout};
pub use network::{Element, ElementNodes, Network, Node, NodeKind, Port, PortKind};
