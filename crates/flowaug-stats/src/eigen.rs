//! Eigendecomposition of small real symmetric matrices.
//!
//! Uses the cyclic Jacobi method: repeatedly apply plane rotations that zero one
//! off-diagonal element at a time until the matrix is diagonal to working
//! precision. It is slow for large matrices but exact and deterministic for the
//! handful of columns a covariance matrix here has.

const MAX_SWEEPS: usize = 100;

/// Eigenvalues and eigenvectors of a symmetric matrix.
///
/// Pairs are sorted by descending eigenvalue; ties keep their original
/// diagonal order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricEigen {
    /// Eigenvalues in descending order.
    pub values: Vec<f64>,
    /// Unit eigenvectors; `vectors[k]` belongs to `values[k]`.
    pub vectors: Vec<Vec<f64>>,
}

impl SymmetricEigen {
    /// Decomposes a square symmetric matrix given as rows.
    ///
    /// Only the symmetry of the input is assumed, not checked beyond a debug assertion.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowaug_stats::eigen::SymmetricEigen;
    /// let eigen = SymmetricEigen::new(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
    /// assert!((eigen.values[0] - 3.0).abs() < 1e-12);
    /// assert!((eigen.values[1] - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn new(matrix: &[Vec<f64>]) -> Self {
        let n = matrix.len();
        debug_assert!(
            matrix.iter().all(|row| row.len() == n),
            "matrix must be square"
        );

        let mut a = matrix.to_vec();
        let mut v = identity(n);

        for _ in 0..MAX_SWEEPS {
            let off_diagonal = off_diagonal_norm(&a);
            let diagonal = (0..n).map(|i| a[i][i].powi(2)).sum::<f64>();
            if off_diagonal <= f64::EPSILON * f64::EPSILON * diagonal || off_diagonal == 0.0 {
                break;
            }
            for p in 0..n {
                for q in (p + 1)..n {
                    rotate(&mut a, &mut v, p, q);
                }
            }
        }

        let mut order = (0..n).collect::<Vec<_>>();
        order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]));

        let values = order.iter().map(|&k| a[k][k]).collect();
        let vectors = order
            .iter()
            .map(|&k| (0..n).map(|i| v[i][k]).collect())
            .collect();
        Self { values, vectors }
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn off_diagonal_norm(a: &[Vec<f64>]) -> f64 {
    let n = a.len();
    (0..n)
        .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
        .map(|(p, q)| a[p][q].powi(2))
        .sum()
}

/// Applies the Jacobi rotation that zeroes `a[p][q]`, accumulating it into `v`.
fn rotate(a: &mut [Vec<f64>], v: &mut [Vec<f64>], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }

    // smaller root of t² + 2θt − 1 = 0 keeps the rotation angle below π/4
    let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
    let c = 1.0 / t.hypot(1.0);
    let s = t * c;

    let n = a.len();
    for row in a.iter_mut() {
        let (akp, akq) = (row[p], row[q]);
        row[p] = c * akp - s * akq;
        row[q] = s * akp + c * akq;
    }
    for k in 0..n {
        let (apk, aqk) = (a[p][k], a[q][k]);
        a[p][k] = c * apk - s * aqk;
        a[q][k] = s * apk + c * aqk;
    }
    for row in v.iter_mut() {
        let (vkp, vkq) = (row[p], row[q]);
        row[p] = c * vkp - s * vkq;
        row[q] = s * vkp + c * vkq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "expected {expected}, got {actual}"
        );
    }

    fn mat_vec(matrix: &[Vec<f64>], vector: &[f64]) -> Vec<f64> {
        matrix
            .iter()
            .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
            .collect()
    }

    #[test]
    fn test_diagonal_matrix_sorted() {
        let eigen = SymmetricEigen::new(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0],
            vec![0.0, 0.0, 3.0],
        ]);
        assert_eq!(eigen.values, vec![5.0, 3.0, 1.0]);
        assert_eq!(eigen.vectors[0], vec![0.0, 1.0, 0.0]);
        assert_eq!(eigen.vectors[1], vec![0.0, 0.0, 1.0]);
        assert_eq!(eigen.vectors[2], vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_eigenpairs_satisfy_definition() {
        let matrix = vec![
            vec![4.0, 1.0, -2.0, 2.0],
            vec![1.0, 2.0, 0.0, 1.0],
            vec![-2.0, 0.0, 3.0, -2.0],
            vec![2.0, 1.0, -2.0, -1.0],
        ];
        let eigen = SymmetricEigen::new(&matrix);

        assert!(eigen.values.is_sorted_by(|a, b| a >= b));
        let trace = (0..4).map(|i| matrix[i][i]).sum::<f64>();
        assert_close(eigen.values.iter().sum(), trace);

        for (value, vector) in eigen.values.iter().zip(&eigen.vectors) {
            let av = mat_vec(&matrix, vector);
            for (lhs, x) in av.iter().zip(vector) {
                assert_close(*lhs, value * x);
            }
            assert_close(vector.iter().map(|x| x * x).sum(), 1.0);
        }
    }

    #[test]
    fn test_eigenvectors_orthogonal() {
        let eigen = SymmetricEigen::new(&[
            vec![2.0, 1.0, 0.5],
            vec![1.0, 3.0, 0.25],
            vec![0.5, 0.25, 1.0],
        ]);
        for i in 0..3 {
            for j in (i + 1)..3 {
                let dot = eigen.vectors[i]
                    .iter()
                    .zip(&eigen.vectors[j])
                    .map(|(a, b)| a * b)
                    .sum::<f64>();
                assert_close(dot, 0.0);
            }
        }
    }

    #[test]
    fn test_zero_matrix() {
        let eigen = SymmetricEigen::new(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(eigen.values, vec![0.0, 0.0]);
        assert_eq!(eigen.vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }
}
