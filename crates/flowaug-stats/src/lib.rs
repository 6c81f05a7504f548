//! Statistical building blocks for flow-record feature augmentation.
//!
//! This crate provides the numeric pieces the augmentation pipeline fits once on a
//! sample and then applies to every file:
//!
//! - **Descriptive statistics**: min, max, mean, population variance, standard deviation
//! - **Standardization**: per-column zero-mean / unit-variance scaling with fit/transform semantics
//! - **Symmetric eigendecomposition**: cyclic Jacobi rotations for small dense matrices
//! - **Principal component analysis**: projection onto the leading eigenvectors of the covariance
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing a column
//! - [`standardize`]: [`StandardScaler`](standardize::StandardScaler) fit on row-major samples
//! - [`eigen`]: Eigenvalues and eigenvectors of real symmetric matrices
//! - [`pca`]: [`Pca`](pca::Pca) fit on row-major samples
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use flowaug_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.0);
//! ```
//!
//! ## Standardizing and projecting a sample
//!
//! ```
//! use flowaug_stats::{pca::Pca, standardize::StandardScaler};
//!
//! let rows = vec![
//!     vec![1.0, 10.0],
//!     vec![2.0, 20.0],
//!     vec![3.0, 30.0],
//! ];
//! let scaler = StandardScaler::fit(&rows).unwrap();
//! let scaled = scaler.transform(&rows);
//! let pca = Pca::fit(&scaled, 1).unwrap();
//!
//! assert_eq!(pca.n_components(), 1);
//! // Perfectly correlated columns: the first component explains everything.
//! assert!((pca.explained_variance_ratio()[0] - 1.0).abs() < 1e-9);
//! ```

pub mod descriptive;
pub mod eigen;
pub mod pca;
pub mod standardize;
