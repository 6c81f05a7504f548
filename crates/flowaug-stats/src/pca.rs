//! Principal component analysis on row-major samples.
//!
//! The fit centres the sample, builds the covariance matrix, and keeps the
//! leading eigenvectors from [`SymmetricEigen`]. Each component's sign is
//! normalized so its largest-magnitude loading is positive, which makes the
//! projection a deterministic function of the sample.

use std::iter;

use crate::eigen::SymmetricEigen;

/// Fitted linear projection onto the leading principal components.
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    mean: Vec<f64>,
    components: Vec<Vec<f64>>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Fits a projection onto `n_components` components.
    ///
    /// The component count is capped at both the sample width and the number of rows.
    ///
    /// # Returns
    ///
    /// * `Some(Pca)` - if the sample has at least one row and one column and `n_components > 0`
    /// * `None` - otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowaug_stats::pca::Pca;
    /// let rows = vec![vec![-1.0, -1.0], vec![0.0, 0.0], vec![1.0, 1.0]];
    /// let pca = Pca::fit(&rows, 2).unwrap();
    ///
    /// let projected = pca.transform_row(&[2.0, 2.0]);
    /// assert!((projected[0] - 8.0_f64.sqrt()).abs() < 1e-12);
    /// assert!(projected[1].abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], n_components: usize) -> Option<Self> {
        let width = rows.first()?.len();
        let n_components = n_components.min(width).min(rows.len());
        if n_components == 0 {
            return None;
        }

        let n = rows.len() as f64;
        let mean = (0..width)
            .map(|col| rows.iter().map(|row| row[col]).sum::<f64>() / n)
            .collect::<Vec<_>>();

        // unbiased covariance; a single row has no spread at all
        let denom = (rows.len().saturating_sub(1)).max(1) as f64;
        let mut covariance = vec![vec![0.0; width]; width];
        for row in rows {
            for i in 0..width {
                let di = row[i] - mean[i];
                for j in i..width {
                    covariance[i][j] += di * (row[j] - mean[j]);
                }
            }
        }
        for i in 0..width {
            for j in i..width {
                covariance[i][j] /= denom;
                covariance[j][i] = covariance[i][j];
            }
        }

        let eigen = SymmetricEigen::new(&covariance);
        let total_variance = eigen.values.iter().map(|v| v.max(0.0)).sum::<f64>();

        let components = eigen
            .vectors
            .into_iter()
            .take(n_components)
            .map(flip_sign)
            .collect();
        let explained_variance = eigen
            .values
            .iter()
            .take(n_components)
            .map(|v| v.max(0.0))
            .collect::<Vec<_>>();
        let explained_variance_ratio = explained_variance
            .iter()
            .map(|v| {
                if total_variance > 0.0 {
                    v / total_variance
                } else {
                    0.0
                }
            })
            .collect();

        Some(Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    /// Number of fitted components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Number of input columns the projection expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-column mean subtracted before projecting.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Unit component vectors, strongest first.
    #[must_use]
    pub fn components(&self) -> &[Vec<f64>] {
        &self.components
    }

    /// Sample variance captured by each component.
    #[must_use]
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Share of the total sample variance captured by each component.
    #[must_use]
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Projects one row onto the fitted components.
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.n_features());
        self.components
            .iter()
            .map(|component| {
                iter::zip(iter::zip(row, &self.mean), component)
                    .map(|((x, mean), loading)| (x - mean) * loading)
                    .sum()
            })
            .collect()
    }
}

/// Orients a component so that its largest-magnitude loading is positive.
fn flip_sign(mut component: Vec<f64>) -> Vec<f64> {
    let pivot = component
        .iter()
        .copied()
        .reduce(|best, x| if x.abs() > best.abs() { x } else { best })
        .unwrap_or(0.0);
    if pivot < 0.0 {
        for x in &mut component {
            *x = -*x;
        }
    }
    component
}
