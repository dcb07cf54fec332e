use crate::AhuError;

/// Floating point type used throughout the solver.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, AhuError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AhuError::NonFinite { what, value: v })
    }
}

/// Accept a finite value in the closed unit interval (mixing, by-pass and
/// relative-humidity fractions).
pub fn ensure_fraction(v: Real, what: &'static str) -> Result<Real, AhuError> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(AhuError::InvalidArg { what })
    }
}

/// Accept a finite, non-negative value (flows, conductances).
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, AhuError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(AhuError::InvalidArg { what })
    }
}
