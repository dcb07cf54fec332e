//! Dense linear balance solver.
//!
//! The balance rows mix magnitudes from about 1 (auxiliary heat flows) to
//! 1e10 (proportional controllers). Rows and then columns are scaled to unit
//! max-norm before the condition number is estimated, so a well-posed system
//! with high-gain controllers is not mistaken for a singular one.

use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};

/// Largest accepted condition number of the equilibrated matrix.
pub const DEFAULT_CONDITION_LIMIT: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConfig {
    pub condition_limit: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            condition_limit: DEFAULT_CONDITION_LIMIT,
        }
    }
}

/// Solve the square system `matrix·x = rhs` by LU factorisation.
///
/// Fails with [`SolverError::SingularSystem`] when a row or column is all
/// zero, the condition number exceeds the limit, the factorisation fails or
/// the solution is not finite.
pub fn solve_linear(
    matrix: &DMatrix<f64>,
    rhs: &DVector<f64>,
    config: &LinearConfig,
) -> SolverResult<DVector<f64>> {
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "{}x{} matrix with {} right-hand sides",
                n,
                matrix.ncols(),
                rhs.len()
            ),
        });
    }
    if n == 0 {
        return Ok(DVector::zeros(0));
    }

    let row_scale = inverse_norms(matrix.row_iter().map(|r| r.amax()))?;
    let mut scaled = matrix.clone();
    for (i, s) in row_scale.iter().enumerate() {
        scaled.row_mut(i).scale_mut(*s);
    }
    let col_scale = inverse_norms(scaled.column_iter().map(|c| c.amax()))?;
    for (j, s) in col_scale.iter().enumerate() {
        scaled.column_mut(j).scale_mut(*s);
    }

    let condition = condition_number(&scaled);
    if condition.is_nan() || condition > config.condition_limit {
        return Err(SolverError::SingularSystem { condition });
    }

    let scaled_rhs = rhs.component_mul(&DVector::from_vec(row_scale));
    let y = scaled
        .lu()
        .solve(&scaled_rhs)
        .ok_or(SolverError::SingularSystem { condition })?;
    let x = y.component_mul(&DVector::from_vec(col_scale));

    if x.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::SingularSystem { condition });
    }
    Ok(x)
}

fn inverse_norms(norms: impl Iterator<Item = f64>) -> SolverResult<Vec<f64>> {
    norms
        .map(|m| {
            if m > 0.0 && m.is_finite() {
                Ok(1.0 / m)
            } else {
                Err(SolverError::SingularSystem {
                    condition: f64::INFINITY,
                })
            }
        })
        .collect()
}

/// 2-norm condition number from the singular values.
pub fn condition_number(matrix: &DMatrix<f64>) -> f64 {
    let sv = matrix.singular_values();
    let max = sv.max();
    let min = sv.min();
    if min > 0.0 { max / min } else { f64::INFINITY }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_small_system() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![3.0, 5.0]);
        let x = solve_linear(&a, &b, &LinearConfig::default()).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn high_gain_rows_are_not_singular() {
        // 1e10·t + Q = 1e10·18, 4840·t − Q = 4840·(−1)
        let a = DMatrix::from_row_slice(2, 2, &[1e10, 1.0, 4840.0, -1.0]);
        let b = DVector::from_vec(vec![1.8e11, -4840.0]);
        let x = solve_linear(&a, &b, &LinearConfig::default()).unwrap();
        assert!((x[0] - 18.0).abs() < 1e-4);
        assert!((x[1] - 4840.0 * 19.0).abs() < 1.0);
    }

    #[test]
    fn zero_row_is_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 0.0]);
        let b = DVector::from_vec(vec![1.0, 0.0]);
        assert!(matches!(
            solve_linear(&a, &b, &LinearConfig::default()),
            Err(SolverError::SingularSystem { .. })
        ));
    }

    #[test]
    fn dependent_rows_are_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_linear(&a, &b, &LinearConfig::default()),
            Err(SolverError::SingularSystem { .. })
        ));
    }

    #[test]
    fn shape_mismatch_is_a_setup_error() {
        let a = DMatrix::zeros(2, 3);
        let b = DVector::zeros(2);
        assert!(matches!(
            solve_linear(&a, &b, &LinearConfig::default()),
            Err(SolverError::ProblemSetup { .. })
        ));
    }
}
