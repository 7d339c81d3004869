//! Covariance matrix utilities.
//!
//! Everything the engine needs to keep covariance matrices inside the valid
//! cone: symmetric eigenvalue decomposition (cyclic Jacobi, stable for the
//! small matrices a portfolio produces), eigenvalue clipping, the
//! correlation/covariance split used by scenario adjustment, and a Cholesky
//! factorization tolerant of positive semi-definite input.

use crate::error::{ModelError, Result};
use ndarray::{Array1, Array2};

/// Default floor applied to clipped eigenvalues.
pub const EIGENVALUE_FLOOR: f64 = 1e-10;

/// Convergence tolerance on the off-diagonal Frobenius norm.
const JACOBI_TOLERANCE: f64 = 1e-12;

/// Maximum number of Jacobi sweeps.
const JACOBI_MAX_SWEEPS: usize = 64;

/// Result of a symmetric eigenvalue decomposition.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues, sorted in descending order.
    pub values: Array1<f64>,
    /// Eigenvectors, one per column, matching `values` order.
    pub vectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Reconstruct the matrix `V Λ Vᵀ` from the decomposition.
    pub fn reconstruct(&self) -> Array2<f64> {
        let scaled = &self.vectors * &self.values.view().insert_axis(ndarray::Axis(0));
        scaled.dot(&self.vectors.t())
    }
}

fn ensure_square(matrix: &Array2<f64>) -> Result<usize> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }
    Ok(n)
}

/// Eigenvalue decomposition of a symmetric matrix via cyclic Jacobi sweeps.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<EigenDecomposition> {
    let n = ensure_square(matrix)?;

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _sweep in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum();
        if off < JACOBI_TOLERANCE {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::EPSILON {
                    continue;
                }

                let tau = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
    }

    // Diagonal now holds the eigenvalues; sort descending with vectors.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        a[[j, j]]
            .partial_cmp(&a[[i, i]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }

    Ok(EigenDecomposition { values, vectors })
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = c * c * app - 2.0 * c * s * apq + s * s * aqq;
    a[[q, q]] = s * s * app + 2.0 * c * s * apq + c * c * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];
            a[[i, p]] = c * aip - s * aiq;
            a[[p, i]] = a[[i, p]];
            a[[i, q]] = s * aip + c * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];
        v[[i, p]] = c * vip - s * viq;
        v[[i, q]] = s * vip + c * viq;
    }
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(matrix: &Array2<f64>) -> Result<f64> {
    let decomp = symmetric_eigen(matrix)?;
    Ok(decomp
        .values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min))
}

/// Force exact symmetry: `(M + Mᵀ) / 2`.
pub fn symmetrize(matrix: &Array2<f64>) -> Array2<f64> {
    (matrix + &matrix.t()) / 2.0
}

/// Repair a covariance matrix by clipping eigenvalues below `floor`.
///
/// Decomposes, raises every eigenvalue below `floor` to `floor`, and
/// reconstructs. The result is symmetric positive semi-definite within
/// floating tolerance. This is the required repair step after estimation and
/// after scenario adjustment, kept separate so its effect is independently
/// testable.
pub fn clip_to_psd(cov: &Array2<f64>, floor: f64) -> Result<Array2<f64>> {
    let symmetric = symmetrize(cov);
    let mut decomp = symmetric_eigen(&symmetric)?;

    let needs_clip = decomp.values.iter().any(|&v| v < floor);
    if !needs_clip {
        return Ok(symmetric);
    }

    decomp.values.mapv_inplace(|v| v.max(floor));
    Ok(symmetrize(&decomp.reconstruct()))
}

/// Split a covariance matrix into standard deviations and a correlation matrix.
///
/// Zero-variance assets get zero correlation rows (unit diagonal), so a
/// degenerate asset survives the round trip unchanged.
pub fn correlation_parts(cov: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let n = ensure_square(cov)?;

    let std_devs = Array1::from_iter((0..n).map(|i| cov[[i, i]].max(0.0).sqrt()));
    let mut corr = Array2::<f64>::eye(n);
    for i in 0..n {
        for j in 0..n {
            if i != j && std_devs[i] > 0.0 && std_devs[j] > 0.0 {
                corr[[i, j]] = cov[[i, j]] / (std_devs[i] * std_devs[j]);
            } else if i != j {
                corr[[i, j]] = 0.0;
            }
        }
    }
    Ok((std_devs, corr))
}

/// Rebuild a covariance matrix from a correlation matrix and standard deviations.
pub fn covariance_from_correlation(
    corr: &Array2<f64>,
    std_devs: &Array1<f64>,
) -> Result<Array2<f64>> {
    let n = ensure_square(corr)?;
    if std_devs.len() != n {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: std_devs.len(),
        });
    }

    let mut cov = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            cov[[i, j]] = corr[[i, j]] * std_devs[i] * std_devs[j];
        }
    }
    Ok(cov)
}

/// Cholesky factorization tolerant of positive semi-definite input.
///
/// Returns the lower-triangular `L` with `L Lᵀ = M`. A pivot within `tol` of
/// zero is treated as exactly zero (the corresponding column is zeroed), so a
/// zero-variance asset factors cleanly. Returns `None` when a pivot is
/// negative beyond tolerance, signalling the caller to fall back to the
/// eigenvalue transform.
pub fn cholesky_psd(matrix: &Array2<f64>, tol: f64) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut d = matrix[[j, j]];
        for k in 0..j {
            d -= l[[j, k]] * l[[j, k]];
        }

        if d < -tol {
            return None;
        }
        if d <= tol {
            // Semi-definite pivot: the whole column collapses to zero.
            continue;
        }

        let pivot = d.sqrt();
        l[[j, j]] = pivot;
        for i in (j + 1)..n {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / pivot;
        }
    }
    Some(l)
}

/// Transform mapping independent standard normals to correlated draws.
///
/// Tries Cholesky first; falls back to `V √Λ` from the eigenvalue
/// decomposition (negative eigenvalues clipped to zero) for near-singular
/// matrices Cholesky cannot handle.
pub fn correlated_transform(cov: &Array2<f64>) -> Result<Array2<f64>> {
    if let Some(l) = cholesky_psd(cov, 1e-12) {
        return Ok(l);
    }

    let mut decomp = symmetric_eigen(cov)?;
    decomp.values.mapv_inplace(|v| v.max(0.0).sqrt());
    Ok(&decomp.vectors * &decomp.values.view().insert_axis(ndarray::Axis(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn matrix(n: usize, values: Vec<f64>) -> Array2<f64> {
        Array2::from_shape_vec((n, n), values).unwrap()
    }

    #[test]
    fn test_eigen_identity() {
        let decomp = symmetric_eigen(&Array2::<f64>::eye(3)).unwrap();
        for &v in decomp.values.iter() {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_eigen_known_values() {
        // [[1, 2], [2, 1]] has eigenvalues 3 and -1.
        let m = matrix(2, vec![1.0, 2.0, 2.0, 1.0]);
        let decomp = symmetric_eigen(&m).unwrap();
        assert_abs_diff_eq!(decomp.values[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.values[1], -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_eigen_reconstruction() {
        let m = matrix(3, vec![2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0]);
        let decomp = symmetric_eigen(&m).unwrap();
        let reconstructed = decomp.reconstruct();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(m[[i, j]], reconstructed[[i, j]], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_clip_to_psd_fixes_negative_eigenvalue() {
        let m = matrix(2, vec![1.0, 2.0, 2.0, 1.0]);
        let repaired = clip_to_psd(&m, EIGENVALUE_FLOOR).unwrap();

        let min_eig = min_eigenvalue(&repaired).unwrap();
        assert!(min_eig >= -1e-12, "still indefinite: {min_eig}");

        // Symmetry is preserved.
        assert_abs_diff_eq!(repaired[[0, 1]], repaired[[1, 0]], epsilon = 1e-12);
    }

    #[test]
    fn test_clip_to_psd_noop_on_valid_matrix() {
        let m = matrix(2, vec![0.04, 0.01, 0.01, 0.03]);
        let repaired = clip_to_psd(&m, EIGENVALUE_FLOOR).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(m[[i, j]], repaired[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_correlation_round_trip() {
        let cov = matrix(2, vec![0.04, 0.012, 0.012, 0.09]);
        let (std_devs, corr) = correlation_parts(&cov).unwrap();

        assert_abs_diff_eq!(std_devs[0], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(std_devs[1], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[[0, 1]], 0.2, epsilon = 1e-12);

        let rebuilt = covariance_from_correlation(&corr, &std_devs).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(cov[[i, j]], rebuilt[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_correlation_parts_zero_variance() {
        let cov = matrix(2, vec![0.04, 0.0, 0.0, 0.0]);
        let (std_devs, corr) = correlation_parts(&cov).unwrap();
        assert_abs_diff_eq!(std_devs[1], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(corr[[0, 1]], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(corr[[1, 1]], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_cholesky_recovers_matrix() {
        let cov = matrix(2, vec![0.04, 0.012, 0.012, 0.09]);
        let l = cholesky_psd(&cov, 1e-12).unwrap();
        let recovered = l.dot(&l.t());
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(cov[[i, j]], recovered[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_zero_variance_asset() {
        // Middle asset is degenerate; factorization must not fail.
        let cov = matrix(
            3,
            vec![0.04, 0.0, 0.01, 0.0, 0.0, 0.0, 0.01, 0.0, 0.09],
        );
        let l = cholesky_psd(&cov, 1e-12).unwrap();
        let recovered = l.dot(&l.t());
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(cov[[i, j]], recovered[[i, j]], epsilon = 1e-12);
            }
        }
        // Degenerate row stays exactly zero.
        assert_eq!(l[[1, 1]], 0.0);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let m = matrix(2, vec![1.0, 2.0, 2.0, 1.0]);
        assert!(cholesky_psd(&m, 1e-12).is_none());
    }

    #[test]
    fn test_correlated_transform_falls_back_to_eigen() {
        // Indefinite input: Cholesky fails, the eigen fallback clips and
        // still produces a transform with L Lᵀ PSD.
        let m = matrix(2, vec![1.0, 2.0, 2.0, 1.0]);
        let l = correlated_transform(&m).unwrap();
        let product = l.dot(&l.t());
        let min_eig = min_eigenvalue(&product).unwrap();
        assert!(min_eig >= -1e-10);
    }
}
