//! Global transforms fitted once on the sample
//!
//! [`FittedTransforms::fit`] picks the numeric candidate columns present in the
//! sample, fits a [`StandardScaler`] on them, and fits a 2-component [`Pca`] on
//! the standardized rows. The result is immutable and shared by reference with
//! every per-file augmentation, so all files are scaled by the same parameters.
//!
//! # Fallback
//!
//! When the sample has no candidate columns (or no rows), both transforms are
//! absent. `rate_normalized` then carries the raw `Rate` value and both
//! projection columns are zero.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use flowaug_analysis::{normalization::FittedTransforms, table::FlowTable};
//!
//! let csv = "Rate,AVG,Label\n1,10,a\n2,30,b\n3,20,c\n";
//! let sample = FlowTable::from_reader(csv.as_bytes(), None, Path::new("s.csv")).unwrap();
//! let transforms = FittedTransforms::fit(Some(&sample));
//!
//! assert_eq!(transforms.columns(), &["Rate", "AVG"]);
//! assert_eq!(transforms.projection().unwrap().n_components(), 2);
//! ```

use flowaug_stats::{pca::Pca, standardize::StandardScaler};
use tracing::info;

use crate::{NUMERIC_CANDIDATES, PROJECTION_COMPONENTS, feature, table::FlowTable};

/// Scaler and projection fitted on the sampled candidate columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FittedTransforms {
    columns: Vec<&'static str>,
    scaler: Option<StandardScaler>,
    projection: Option<Pca>,
}

/// Per-row outputs that depend on the fitted state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedFeatures {
    pub rate_normalized: f64,
    pub pca_1: f64,
    pub pca_2: f64,
}

impl FittedTransforms {
    /// Fit both transforms on the sampled table
    ///
    /// `None`, a table without candidate columns, or a table without rows all
    /// produce the unfitted fallback.
    #[must_use]
    pub fn fit(sample: Option<&FlowTable>) -> Self {
        let Some(sample) = sample else {
            info!("no sample available; scaler and projection left unfitted");
            return Self::default();
        };

        let columns = present_candidates(sample);
        if columns.is_empty() {
            info!("no numeric candidate columns in sample; scaler and projection left unfitted");
            return Self::default();
        }

        let rows = candidate_matrix(sample, &columns);
        let Some(scaler) = StandardScaler::fit(&rows) else {
            info!("sample has no rows; scaler and projection left unfitted");
            return Self::default();
        };
        let n_components = PROJECTION_COMPONENTS.min(columns.len());
        let projection = Pca::fit(&scaler.transform(&rows), n_components);

        info!(
            columns = ?columns,
            rows = rows.len(),
            mean = ?scaler.mean(),
            scale = ?scaler.scale(),
            "fitted scaler"
        );
        if let Some(pca) = &projection {
            info!(
                components = pca.n_components(),
                explained_variance_ratio = ?pca.explained_variance_ratio(),
                "fitted projection"
            );
        }

        Self {
            columns,
            scaler: Some(scaler),
            projection,
        }
    }

    /// Candidate columns found in the sample, in canonical order
    #[must_use]
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    #[must_use]
    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    #[must_use]
    pub fn projection(&self) -> Option<&Pca> {
        self.projection.as_ref()
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.scaler.is_some()
    }

    /// Compute `rate_normalized`, `pca_1` and `pca_2` for every row of `table`
    #[must_use]
    pub fn apply(&self, table: &FlowTable) -> Vec<FittedFeatures> {
        let Some(scaler) = &self.scaler else {
            let rate = table
                .numeric_column("Rate")
                .unwrap_or_else(|| vec![0.0; table.len()]);
            return rate
                .into_iter()
                .map(|rate_normalized| FittedFeatures {
                    rate_normalized,
                    pca_1: 0.0,
                    pca_2: 0.0,
                })
                .collect();
        };

        candidate_matrix(table, &self.columns)
            .iter()
            .map(|row| {
                let rate_normalized = scaler.transform_row(row)[0];
                let projected = self
                    .projection
                    .as_ref()
                    .map(|pca| pca.transform_row(row))
                    .unwrap_or_default();
                FittedFeatures {
                    rate_normalized,
                    pca_1: projected.first().copied().unwrap_or(0.0),
                    pca_2: projected.get(1).copied().unwrap_or(0.0),
                }
            })
            .collect()
    }
}

fn present_candidates(table: &FlowTable) -> Vec<&'static str> {
    NUMERIC_CANDIDATES
        .iter()
        .copied()
        .filter(|name| table.has_column(name))
        .collect()
}

/// Sanitized row-major values of `columns`; columns absent from `table` read as zero
fn candidate_matrix(table: &FlowTable, columns: &[&str]) -> Vec<Vec<f64>> {
    let values = columns
        .iter()
        .map(|name| {
            table
                .numeric_column(name)
                .unwrap_or_else(|| vec![0.0; table.len()])
        })
        .collect::<Vec<_>>();
    (0..table.len())
        .map(|row| {
            values
                .iter()
                .map(|column| feature::sanitize_candidate(column[row]))
                .collect()
        })
        .collect()
}
