//! ahu-elements: balance elements of air-handling networks.
//!
//! Provides the element types an AHU topology is made of:
//! - Mixing boxes weighted by flow shares
//! - Heating and cooling coils (the cooling coil on the saturation tangent)
//! - Vapor and adiabatic humidifiers
//! - Thermal zone and building envelope
//! - Indoor controllers with proportional, exact or disabled rows
//!
//! Every element implements [`BalanceElement`]: it writes its rows into a
//! [`RowBlock`] of the assembled system and is a deterministic function of
//! the [`OperatingParameters`] and the linearization temperature.
//!
//! # Example
//!
//! ```
//! use ahu_elements::{BalanceElement, HeatingCoil, Share};
//!
//! let coil = HeatingCoil::new(Share::Supply);
//! assert_eq!(coil.equation_count(), 2);
//! assert_eq!(coil.aux_labels(), ["Qs"]);
//! ```

pub mod coil;
pub mod common;
pub mod controller;
pub mod error;
pub mod humidifier;
pub mod mixing;
pub mod params;
pub mod traits;
pub mod zone;

// Re-exports
pub use coil::{CoolingCoil, HeatingCoil};
pub use common::AuxRef;
pub use controller::{ControlledVariable, Controller};
pub use error::{ElementError, ElementResult};
pub use humidifier::{AdiabaticHumidifier, VaporHumidifier};
pub use mixing::Mixing;
pub use params::{
    AirCondition, ControllerGains, DEFAULT_GAIN, Envelope, Gain, OperatingParameters, OutdoorAir,
    Share, design_supply_flow,
};
pub use traits::{BalanceElement, RowBlock, StampContext};
pub use zone::{Building, ThermalZone};
