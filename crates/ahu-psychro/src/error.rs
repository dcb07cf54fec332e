//! Psychrometric property errors.

use ahu_core::AhuError;
use thiserror::Error;

/// Result type for psychrometric operations.
pub type PsychroResult<T> = Result<T, PsychroError>;

/// Errors raised by the property functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsychroError {
    /// Input outside the domain of a correlation (negative or supersaturating
    /// relative humidity, negative humidity ratio, non-finite input, ...).
    #[error("Domain error for {what}: {value}")]
    Domain { what: &'static str, value: f64 },

    /// The inverse temperature lookup found no root in its bracket.
    #[error("No root for {what} in [{lo}, {hi}] °C")]
    NoRoot {
        what: &'static str,
        lo: f64,
        hi: f64,
    },
}

impl PsychroError {
    pub(crate) fn domain(what: &'static str, value: f64) -> Self {
        PsychroError::Domain { what, value }
    }
}

impl From<AhuError> for PsychroError {
    fn from(err: AhuError) -> Self {
        match err {
            AhuError::NonFinite { what, value } => PsychroError::Domain { what, value },
            AhuError::InvalidArg { what } | AhuError::Invariant { what } => {
                PsychroError::Domain { what, value: f64::NAN }
            }
            AhuError::IndexOob { what, index, .. } => PsychroError::Domain {
                what,
                value: index as f64,
            },
        }
    }
}

impl From<PsychroError> for AhuError {
    fn from(err: PsychroError) -> Self {
        match err {
            PsychroError::Domain { what, .. } => AhuError::InvalidArg { what },
            PsychroError::NoRoot { what, .. } => AhuError::Invariant { what },
        }
    }
}
