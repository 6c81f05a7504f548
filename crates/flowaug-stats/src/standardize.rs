//! Per-column standardization with fit/transform semantics.
//!
//! [`StandardScaler::fit`] learns a mean and a scale for every column of a
//! row-major sample. [`StandardScaler::transform_row`] then maps a row to
//! `(x - mean) / scale` using those frozen parameters.

use std::iter;

use crate::descriptive::DescriptiveStats;

/// Fitted zero-mean / unit-variance transform.
///
/// Columns whose variance is numerically zero get a scale of `1.0`, so they
/// are centred but never divided by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits the scaler on row-major samples.
    ///
    /// All rows must have the same width as the first row.
    ///
    /// # Returns
    ///
    /// * `Some(StandardScaler)` - if there is at least one row with at least one column
    /// * `None` - if `rows` is empty or the rows have no columns
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowaug_stats::standardize::StandardScaler;
    /// let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
    /// let scaler = StandardScaler::fit(&rows).unwrap();
    /// assert_eq!(scaler.mean(), &[2.0, 5.0]);
    /// // second column is constant, so its scale falls back to 1
    /// assert_eq!(scaler.scale(), &[1.0, 1.0]);
    /// assert_eq!(scaler.transform_row(&[3.0, 7.0]), vec![1.0, 2.0]);
    /// ```
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 {
            return None;
        }
        debug_assert!(
            rows.iter().all(|row| row.len() == width),
            "all rows must have the same width"
        );

        let mut mean = Vec::with_capacity(width);
        let mut scale = Vec::with_capacity(width);
        for col in 0..width {
            let stats = DescriptiveStats::new(rows.iter().map(|row| row[col]))?;
            let col_scale = if stats.is_constant() {
                1.0
            } else {
                stats.std_dev
            };
            mean.push(stats.mean);
            scale.push(col_scale);
        }

        Some(Self {
            mean,
            scale,
        })
    }

    /// Number of columns the scaler was fit on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-column mean of the fitted sample.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-column divisor applied by [`transform_row`](Self::transform_row).
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardizes a single row of width [`n_features`](Self::n_features).
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.n_features());
        iter::zip(row, iter::zip(&self.mean, &self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }

    /// Standardizes every row of a row-major sample.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_empty() {
        assert!(StandardScaler::fit(&[]).is_none());
        assert!(StandardScaler::fit(&[vec![], vec![]]).is_none());
    }

    #[test]
    fn test_transformed_sample_is_standardized() {
        let rows = vec![
            vec![1.0, 100.0, -3.0],
            vec![2.0, 250.0, 0.5],
            vec![4.0, 175.0, 8.0],
            vec![8.0, 400.0, 2.0],
            vec![16.0, 10.0, -7.5],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform(&rows);

        for col in 0..3 {
            let stats = DescriptiveStats::new(scaled.iter().map(|row| row[col])).unwrap();
            assert!(stats.mean.abs() < 1e-12, "column {col} mean {}", stats.mean);
            assert!(
                (stats.variance - 1.0).abs() < 1e-12,
                "column {col} variance {}",
                stats.variance
            );
        }
    }

    #[test]
    fn test_constant_column_centred_not_scaled() {
        let rows = vec![vec![7.0], vec![7.0], vec![7.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.scale(), &[1.0]);
        assert_eq!(scaler.transform_row(&[7.0]), vec![0.0]);
        assert_eq!(scaler.transform_row(&[9.0]), vec![2.0]);
    }
}
