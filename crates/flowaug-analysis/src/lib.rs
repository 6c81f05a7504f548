//! Feature augmentation for flow-record CSV datasets
//!
//! This crate turns raw network-flow summary tables into feature-rich tables
//! suited for quantum or classical ML pipelines. It fits global scaling and
//! projection parameters once on a bounded sample, then applies them to every
//! file so features stay comparable across the dataset.
//!
//! # Overview
//!
//! The pipeline runs in four steps:
//!
//! 1. **Discover** the CSV files (done by the caller)
//! 2. **Sample** ([`sample::FlowSample`]): read a bounded prefix of rows from each file
//! 3. **Fit** ([`normalization::FittedTransforms`]): fit a standard scaler and a
//!    2-component PCA on the sampled numeric candidate columns
//! 4. **Augment** ([`augment::augment_file`]): load each file, append the derived
//!    columns, and write a train/test split under the mirrored output path
//!
//! # Derived Columns
//!
//! | Column | Meaning |
//! |---|---|
//! | `coeff_var_Number` | `Std / (AVG + 1e-9)`, or `0` when `AVG = 0` |
//! | `log_TotSize` | `ln(1 + Tot size)` |
//! | `flow_entropy` | base-2 Shannon entropy of the protocol indicator columns |
//! | `rate_normalized` | first standardized candidate column (raw `Rate` when unfitted) |
//! | `pca_1`, `pca_2` | projection onto the fitted principal components |
//! | `rate_sin`, `rate_cos` | angle encoding of `Rate` against the file maximum |
//! | `logTot_sin`, `logTot_cos` | angle encoding of `log_TotSize` against the file maximum |
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use flowaug_analysis::{
//!     augment::{self, FileOutcome},
//!     normalization::FittedTransforms,
//!     sample::FlowSample,
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let paths = vec![Path::new("dataset/part-0.csv"), Path::new("dataset/part-1.csv")];
//!
//! let sample = FlowSample::collect(&paths, 200);
//! let transforms = FittedTransforms::fit(sample.table.as_ref());
//!
//! for path in &paths {
//!     match augment::augment_file(path, Path::new("dataset"), Path::new("out"), &transforms, 0.8)? {
//!         FileOutcome::Written(file) => println!("wrote {}", file.train_path.display()),
//!         FileOutcome::Skipped(reason) => println!("skipped {}: {reason}", path.display()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod augment;
pub mod feature;
pub mod normalization;
pub mod sample;
pub mod table;

/// Protocol indicator columns, read as per-row weights for `flow_entropy`
pub const PROTOCOL_COLUMNS: [&str; 15] = [
    "HTTP", "HTTPS", "DNS", "Telnet", "SMTP", "SSH", "IRC", "TCP", "UDP", "DHCP", "ARP", "ICMP",
    "IGMP", "IPv", "LLC",
];

/// Numeric columns the scaler and projection are fit on, in this order
pub const NUMERIC_CANDIDATES: [&str; 6] = ["Rate", "Number", "AVG", "Std", "Tot sum", "Tot size"];

/// Maximum number of fitted projection components
pub const PROJECTION_COMPONENTS: usize = 2;

/// Names of the derived output columns
pub mod derived {
    pub const COEFF_VAR: &str = "coeff_var_Number";
    pub const LOG_TOT_SIZE: &str = "log_TotSize";
    pub const FLOW_ENTROPY: &str = "flow_entropy";
    pub const RATE_NORMALIZED: &str = "rate_normalized";
    pub const PCA_1: &str = "pca_1";
    pub const PCA_2: &str = "pca_2";
    pub const RATE_SIN: &str = "rate_sin";
    pub const RATE_COS: &str = "rate_cos";
    pub const LOG_TOT_SIN: &str = "logTot_sin";
    pub const LOG_TOT_COS: &str = "logTot_cos";
}

/// Derived columns in the order they are appended
pub const DERIVED_COLUMNS: [&str; 10] = [
    derived::COEFF_VAR,
    derived::LOG_TOT_SIZE,
    derived::FLOW_ENTROPY,
    derived::RATE_NORMALIZED,
    derived::PCA_1,
    derived::PCA_2,
    derived::RATE_SIN,
    derived::RATE_COS,
    derived::LOG_TOT_SIN,
    derived::LOG_TOT_COS,
];
