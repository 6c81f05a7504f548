//! Bounded row sampling across many CSV files
//!
//! The fitter never sees whole files. [`FlowSample::collect`] reads at most a
//! fixed number of rows from the head of each file and stacks them into one
//! table, keyed by the columns of the first file that could be read.
//!
//! ```text
//! file_a.csv ─┐ first N rows (defines columns)
//! file_b.csv ─┼─> FlowSample.table ──> FittedTransforms::fit
//! broken.csv ─┘ (skipped, reason kept)
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::table::{FlowTable, TableError};

/// Rows sampled from the heads of many files
#[derive(Debug, Default)]
pub struct FlowSample {
    /// Combined rows, or `None` when no file could be read
    pub table: Option<FlowTable>,
    /// Number of files that contributed (possibly zero) rows
    pub files_read: usize,
    /// Files that could not be read, with the reason
    pub skipped: Vec<(PathBuf, TableError)>,
}

impl FlowSample {
    /// Read up to `rows_per_file` rows from each path and stack them
    ///
    /// Unreadable files are logged and skipped; they never abort sampling.
    #[must_use]
    pub fn collect<P>(paths: &[P], rows_per_file: usize) -> Self
    where
        P: AsRef<Path>,
    {
        let mut sample = Self::default();
        for path in paths {
            let path = path.as_ref();
            match FlowTable::read_prefix(path, Some(rows_per_file)) {
                Ok(table) => {
                    debug!(path = %path.display(), rows = table.len(), "sampled rows");
                    sample.push(table);
                }
                Err(err) => {
                    warn!("skipping {} while sampling: {err}", path.display());
                    sample.skipped.push((path.to_owned(), err));
                }
            }
        }
        sample
    }

    fn push(&mut self, table: FlowTable) {
        match &mut self.table {
            Some(combined) => combined.extend_by_name(&table),
            None => self.table = Some(table),
        }
        self.files_read += 1;
    }

    /// Total number of sampled rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.as_ref().map_or(0, FlowTable::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_collect_caps_rows_and_keys_by_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let broken = dir.path().join("broken.csv");
        let missing = dir.path().join("missing.csv");
        fs::write(&a, "Rate,AVG\n1,10\n2,20\n3,30\n").unwrap();
        fs::write(&b, "AVG,Extra,Rate\n40,x,4\n").unwrap();
        fs::write(&broken, "Rate\n1\n2,3\n").unwrap();

        let sample = FlowSample::collect(&[&a, &broken, &missing, &b], 2);

        assert_eq!(sample.files_read, 2);
        assert_eq!(sample.skipped.len(), 2);
        assert_eq!(sample.skipped[0].0, broken);
        assert!(matches!(sample.skipped[1].1, TableError::Open { .. }));

        let table = sample.table.as_ref().unwrap();
        assert_eq!(table.headers(), &["Rate", "AVG"]);
        assert_eq!(table.numeric_column("Rate").unwrap(), vec![1.0, 2.0, 4.0]);
        assert_eq!(table.numeric_column("AVG").unwrap(), vec![10.0, 20.0, 40.0]);
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn test_collect_nothing_readable() {
        let dir = tempfile::tempdir().unwrap();
        let sample = FlowSample::collect(&[dir.path().join("nope.csv")], 200);
        assert!(sample.table.is_none());
        assert!(sample.is_empty());
        assert_eq!(sample.files_read, 0);
    }
}
