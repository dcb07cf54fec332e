//! ahu-psychro: moist-air property provider.
//!
//! Provides:
//! - saturation pressure (Hyland-Wexler, over liquid water)
//! - humidity ratio from temperature and relative humidity, and its inverse
//! - exact slope of the saturation curve
//! - relative humidity and specific volume from temperature and humidity ratio
//! - [`PsyState`], a node state with derived attributes computed on demand
//!
//! All functions take an altitude in meters; the static pressure follows the
//! standard atmosphere.
//!
//! # Example
//!
//! ```
//! use ahu_psychro::{humidity_ratio, relative_humidity};
//!
//! let w = humidity_ratio(18.0, 0.5, 0.0).unwrap();
//! let phi = relative_humidity(18.0, w, 0.0).unwrap();
//! assert!((phi - 0.5).abs() < 1e-9);
//! ```

pub mod error;
pub mod properties;
pub mod state;

pub use error::{PsychroError, PsychroResult};
pub use properties::{
    humidity_ratio, pressure_at_altitude, relative_humidity, saturation_humidity_ratio,
    saturation_pressure, saturation_slope, specific_volume, temperature_from_w_phi,
};
pub use state::PsyState;
