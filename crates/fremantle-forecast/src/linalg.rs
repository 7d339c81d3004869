//! Small dense linear-algebra helpers for regression fits.

use ndarray::{Array1, Array2};

const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when the system is singular or the solution is not finite.
pub(crate) fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return None;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[[i, col]]
                    .abs()
                    .partial_cmp(&a[[j, col]].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if a[[pivot_row, col]].abs() < PIVOT_TOLERANCE {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot_row, k]];
                a[[pivot_row, k]] = tmp;
            }
            b.swap(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[[row, k]] * x[k];
        }
        x[row] = sum / a[[row, row]];
    }

    if x.iter().all(|v| v.is_finite()) { Some(x) } else { None }
}

/// Ordinary least squares: coefficients and residuals of `y ≈ X β`.
pub(crate) fn least_squares(
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Option<(Array1<f64>, Array1<f64>)> {
    if x.nrows() != y.len() || x.nrows() < x.ncols() {
        return None;
    }
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let beta = solve(xtx, xty)?;
    let residuals = y - &x.dot(&beta);
    Some((beta, residuals))
}

/// Diagonal entry `j` of `(XᵀX)⁻¹`, used for coefficient standard errors.
pub(crate) fn xtx_inverse_diagonal(x: &Array2<f64>, j: usize) -> Option<f64> {
    let xtx = x.t().dot(x);
    let n = xtx.nrows();
    if j >= n {
        return None;
    }
    let mut unit = Array1::<f64>::zeros(n);
    unit[j] = 1.0;
    let column = solve(xtx, unit)?;
    let value = column[j];
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve_known_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![5.0, 10.0];
        let x = solve(a, b).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_singular_returns_none() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve(a, b).is_none());
    }

    #[test]
    fn test_least_squares_exact_line() {
        // y = 2 + 3x fit exactly.
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![2.0, 5.0, 8.0, 11.0];
        let (beta, residuals) = least_squares(&x, &y).unwrap();
        assert_abs_diff_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(beta[1], 3.0, epsilon = 1e-10);
        for &r in residuals.iter() {
            assert_abs_diff_eq!(r, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_inverse_diagonal_identity() {
        let x = Array2::<f64>::eye(3);
        assert_abs_diff_eq!(xtx_inverse_diagonal(&x, 1).unwrap(), 1.0, epsilon = 1e-12);
    }
}
