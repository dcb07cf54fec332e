//! ahu-core: shared foundation for the air-handling unit solver.
//!
//! Contains:
//! - units (uom SI types + constructors, reporting conversions)
//! - numeric (Real + argument checks)
//! - ids (compact IDs for nodes, ports and elements)
//! - timing (wall-clock deadlines and simple timers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{AhuError, AhuResult};
pub use ids::*;
pub use numeric::*;
pub use timing::{Deadline, Timer};
pub use units::*;
