//! Per-file augmentation and train/test output
//!
//! [`augment_table`] appends the derived columns to a loaded table using the
//! shared [`FittedTransforms`]. [`augment_file`] wraps it with reading, output
//! path mirroring, and the head/tail split:
//!
//! ```text
//! <dataset>/day1/flows.csv ──> <out>/day1/flows.csv       (first floor(ratio·n) rows)
//!                          └─> <out>/day1/flows_test.csv  (remaining rows)
//! ```
//!
//! Tables with at most [`MIN_SPLIT_ROWS`] rows are written whole, without a test file.

use std::{
    ffi::OsString,
    fs, iter,
    ops::Range,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    PROTOCOL_COLUMNS, derived,
    feature::{self, angle_encoding, nan_max},
    normalization::FittedTransforms,
    table::{FlowTable, TableError},
};

/// Tables with this many rows or fewer are not split
pub const MIN_SPLIT_ROWS: usize = 10;

/// Default fraction of rows kept in the train partition
pub const DEFAULT_TRAIN_SPLIT: f64 = 0.8;

/// Fatal output errors
///
/// A failed fallback write halts the run; everything else is reported as a skip.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum WriteError {
    #[display("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("fallback write failed: {source}")]
    Write { source: TableError },
}

/// Why a file produced no output
#[derive(Debug, derive_more::Display)]
pub enum SkipReason {
    #[display("unreadable: {_0}")]
    Unreadable(TableError),
}

/// Paths and row counts of a written file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub source: PathBuf,
    pub train_path: PathBuf,
    /// Present only when the table was split
    pub test_path: Option<PathBuf>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// The split write failed and the whole table was written to `train_path`
    pub fell_back: bool,
}

/// Result of augmenting one source file
#[derive(Debug, derive_more::IsVariant)]
pub enum FileOutcome {
    Written(WrittenFile),
    Skipped(SkipReason),
}

/// Head/tail partition of a table's rows in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitPlan {
    Whole(Range<usize>),
    TrainTest {
        train: Range<usize>,
        test: Range<usize>,
    },
}

impl SplitPlan {
    /// Split `n` rows at `floor(train_split · n)`, unless `n ≤ MIN_SPLIT_ROWS`
    ///
    /// ```
    /// # use flowaug_analysis::augment::SplitPlan;
    /// assert_eq!(SplitPlan::new(10, 0.8), SplitPlan::Whole(0..10));
    /// assert_eq!(
    ///     SplitPlan::new(11, 0.8),
    ///     SplitPlan::TrainTest { train: 0..8, test: 8..11 }
    /// );
    /// ```
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[must_use]
    pub fn new(n: usize, train_split: f64) -> Self {
        if n <= MIN_SPLIT_ROWS {
            return Self::Whole(0..n);
        }
        let cut = ((train_split * n as f64).floor() as usize).min(n);
        Self::TrainTest {
            train: 0..cut,
            test: cut..n,
        }
    }
}

/// Append every derived column to `table`
///
/// Column order: `coeff_var_Number, log_TotSize, flow_entropy, rate_normalized,
/// pca_1, pca_2, rate_sin, rate_cos, logTot_sin, logTot_cos`.
pub fn augment_table(table: &mut FlowTable, transforms: &FittedTransforms) {
    let n = table.len();
    let zeros = || vec![0.0; n];

    let avg = table.numeric_column("AVG").unwrap_or_else(zeros);
    let std = table.numeric_column("Std").unwrap_or_else(zeros);
    let coeff_var = iter::zip(&std, &avg)
        .map(|(&s, &a)| feature::coefficient_of_variation(s, a))
        .collect::<Vec<_>>();

    let log_tot_size = table
        .numeric_column("Tot size")
        .map(|sizes| sizes.into_iter().map(feature::log_size).collect())
        .unwrap_or_else(zeros);

    let protocols = PROTOCOL_COLUMNS
        .iter()
        .filter_map(|name| table.numeric_column(name))
        .collect::<Vec<_>>();
    let entropy = (0..n)
        .map(|row| {
            let weights = protocols.iter().map(|col| col[row]).collect::<Vec<_>>();
            feature::flow_entropy(&weights)
        })
        .collect::<Vec<_>>();

    let fitted = transforms.apply(table);

    let rate = table.numeric_column("Rate");
    let rate_angles = match &rate {
        Some(rate) => angle_encoding(rate, nan_max(rate)),
        None => angle_encoding(&zeros(), 1.0),
    };
    let size_angles = angle_encoding(&log_tot_size, nan_max(&log_tot_size));

    let columns: [(&str, Vec<f64>); 10] = [
        (derived::COEFF_VAR, coeff_var),
        (derived::LOG_TOT_SIZE, log_tot_size),
        (derived::FLOW_ENTROPY, entropy),
        (
            derived::RATE_NORMALIZED,
            fitted.iter().map(|f| f.rate_normalized).collect(),
        ),
        (derived::PCA_1, fitted.iter().map(|f| f.pca_1).collect()),
        (derived::PCA_2, fitted.iter().map(|f| f.pca_2).collect()),
        (derived::RATE_SIN, rate_angles.iter().map(|a| a.0).collect()),
        (derived::RATE_COS, rate_angles.iter().map(|a| a.1).collect()),
        (derived::LOG_TOT_SIN, size_angles.iter().map(|a| a.0).collect()),
        (derived::LOG_TOT_COS, size_angles.iter().map(|a| a.1).collect()),
    ];
    for (name, values) in &columns {
        table.set_numeric_column(name, values);
    }
}

/// Read, augment, and write one source file
///
/// `Ok(Skipped)` means the file could not be read. `Err` means output could not
/// be written even without the split.
pub fn augment_file(
    source: &Path,
    dataset_root: &Path,
    out_root: &Path,
    transforms: &FittedTransforms,
    train_split: f64,
) -> Result<FileOutcome, WriteError> {
    let mut table = match FlowTable::read(source) {
        Ok(table) => table,
        Err(err) => {
            warn!("skipping {}: {err}", source.display());
            return Ok(FileOutcome::Skipped(SkipReason::Unreadable(err)));
        }
    };
    augment_table(&mut table, transforms);

    let train_path = mirror_output_path(source, dataset_root, out_root);
    if let Some(parent) = train_path.parent() {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_owned(),
            source,
        })?;
    }

    let written = write_split(&table, source, &train_path, train_split)?;
    debug!(
        source = %source.display(),
        train_rows = written.train_rows,
        test_rows = written.test_rows,
        "augmented file"
    );
    Ok(FileOutcome::Written(written))
}

fn write_split(
    table: &FlowTable,
    source: &Path,
    train_path: &Path,
    train_split: f64,
) -> Result<WrittenFile, WriteError> {
    let whole = |fell_back| WrittenFile {
        source: source.to_owned(),
        train_path: train_path.to_owned(),
        test_path: None,
        train_rows: table.len(),
        test_rows: 0,
        fell_back,
    };

    let (train, test) = match SplitPlan::new(table.len(), train_split) {
        SplitPlan::Whole(rows) => {
            return match table.write_csv(train_path, rows) {
                Ok(()) => Ok(whole(false)),
                Err(err) => write_fallback(table, train_path, &err).map(|()| whole(true)),
            };
        }
        SplitPlan::TrainTest { train, test } => (train, test),
    };

    let test_path = test_output_path(train_path);
    let result = table
        .write_csv(train_path, train.clone())
        .and_then(|()| table.write_csv(&test_path, test.clone()));
    match result {
        Ok(()) => Ok(WrittenFile {
            source: source.to_owned(),
            train_path: train_path.to_owned(),
            test_path: Some(test_path),
            train_rows: train.len(),
            test_rows: test.len(),
            fell_back: false,
        }),
        Err(err) => write_fallback(table, train_path, &err).map(|()| whole(true)),
    }
}

fn write_fallback(table: &FlowTable, path: &Path, cause: &TableError) -> Result<(), WriteError> {
    warn!("{cause}; retrying {} without split", path.display());
    table
        .write_csv(path, 0..table.len())
        .map_err(|source| WriteError::Write { source })
}

/// Mirror `source`'s position under `dataset_root` into `out_root`
///
/// Paths are compared after canonicalization. A source outside the root
/// lands directly in `out_root` under its file name.
#[must_use]
pub fn mirror_output_path(source: &Path, dataset_root: &Path, out_root: &Path) -> PathBuf {
    let relative = source
        .canonicalize()
        .ok()
        .zip(dataset_root.canonicalize().ok())
        .and_then(|(source, root)| source.strip_prefix(root).ok().map(Path::to_owned))
        .filter(|rel| !rel.as_os_str().is_empty());
    match relative {
        Some(rel) => out_root.join(rel),
        None => out_root.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}

/// `dir/name.csv` → `dir/name_test.csv`
///
/// ```
/// # use std::path::{Path, PathBuf};
/// # use flowaug_analysis::augment::test_output_path;
/// assert_eq!(test_output_path(Path::new("out/a/flows.csv")), PathBuf::from("out/a/flows_test.csv"));
/// assert_eq!(test_output_path(Path::new("out/flows")), PathBuf::from("out/flows_test"));
/// ```
#[must_use]
pub fn test_output_path(train_path: &Path) -> PathBuf {
    let mut name = train_path.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_test");
    if let Some(ext) = train_path.extension() {
        name.push(".");
        name.push(ext);
    }
    train_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> FlowTable {
        FlowTable::from_reader(csv.as_bytes(), None, Path::new("t.csv")).unwrap()
    }

    fn column(table: &FlowTable, name: &str) -> Vec<f64> {
        table.numeric_column(name).unwrap()
    }

    fn flows_csv(n: usize) -> String {
        let mut csv = String::from("Rate,AVG,Std,Tot size,TCP,UDP\n");
        for i in 0..n {
            csv.push_str(&format!("{},{},{},{},1,{}\n", i * 3, i % 4, i, i * 10, i % 2));
        }
        csv
    }

    #[test]
    fn test_derived_columns_appended_in_order() {
        let mut t = table("Rate,Label\n1,a\n");
        augment_table(&mut t, &FittedTransforms::default());
        let mut expected = vec!["Rate".to_owned(), "Label".to_owned()];
        expected.extend(crate::DERIVED_COLUMNS.iter().map(|c| (*c).to_owned()));
        assert_eq!(t.headers(), expected.as_slice());
    }

    #[test]
    fn test_reference_row_features() {
        let mut t = table("AVG,Std,Rate,Tot size\n2,4,10,99\n");
        augment_table(&mut t, &FittedTransforms::default());
        assert!((column(&t, "coeff_var_Number")[0] - 2.0).abs() < 1e-6);
        assert!((column(&t, "log_TotSize")[0] - 4.6052).abs() < 1e-4);
        // a single row is its own maximum: θ = π
        assert!((column(&t, "rate_cos")[0] + 1.0).abs() < 1e-12);
        assert!((column(&t, "logTot_cos")[0] + 1.0).abs() < 1e-12);
        assert_eq!(column(&t, "rate_normalized")[0], 10.0);
    }

    #[test]
    fn test_missing_columns_default_to_zero() {
        let mut t = table("Label\nx\ny\n");
        augment_table(&mut t, &FittedTransforms::default());
        for name in ["coeff_var_Number", "log_TotSize", "flow_entropy", "rate_normalized"] {
            assert_eq!(column(&t, name), vec![0.0, 0.0], "{name}");
        }
        assert_eq!(column(&t, "pca_1"), vec![0.0, 0.0]);
        assert_eq!(column(&t, "pca_2"), vec![0.0, 0.0]);
        assert_eq!(column(&t, "rate_sin"), vec![0.0, 0.0]);
        assert_eq!(column(&t, "rate_cos"), vec![1.0, 1.0]);
    }

    #[test]
    fn test_entropy_uses_present_protocol_columns() {
        let mut t = table("HTTP,TCP,UDP,Label\n1,0,0,a\n1,1,0,b\n2,2,2,c\n0,0,0,d\n");
        augment_table(&mut t, &FittedTransforms::default());
        let entropy = column(&t, "flow_entropy");
        assert_eq!(entropy[0], 0.0);
        assert!((entropy[1] - 1.0).abs() < 1e-12);
        assert!((entropy[2] - 3.0_f64.log2()).abs() < 1e-12);
        assert_eq!(entropy[3], 0.0);
    }

    #[test]
    fn test_blank_or_infinite_protocol_cell_zeroes_entropy() {
        let mut t = table("HTTP,TCP,UDP\n,1,1\ninf,2,2\n1,1,0\n");
        augment_table(&mut t, &FittedTransforms::default());
        let entropy = column(&t, "flow_entropy");
        assert_eq!(&entropy[..2], &[0.0, 0.0]);
        assert!((entropy[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_angles_use_per_file_maximum() {
        let mut a = table("Rate\n5\n10\n");
        let mut b = table("Rate\n5\n20\n");
        augment_table(&mut a, &FittedTransforms::default());
        augment_table(&mut b, &FittedTransforms::default());
        // same raw value, different angle
        assert!((column(&a, "rate_sin")[0] - 1.0).abs() < 1e-12);
        assert!((column(&b, "rate_sin")[0] - (std::f64::consts::PI / 4.0).sin()).abs() < 1e-12);
    }

    #[test]
    fn test_infinite_rate_maximum_falls_back() {
        let mut t = table("Rate\n0.5\ninf\n");
        augment_table(&mut t, &FittedTransforms::default());
        let sin = column(&t, "rate_sin");
        assert!((sin[0] - 1.0).abs() < 1e-12);
        assert_eq!(sin[1], 0.0);
    }

    #[test]
    fn test_split_plan_counts() {
        for n in 0..=10 {
            assert_eq!(SplitPlan::new(n, 0.8), SplitPlan::Whole(0..n));
        }
        for n in [11, 12, 57, 1000] {
            let SplitPlan::TrainTest { train, test } = SplitPlan::new(n, 0.8) else {
                panic!("{n} rows should split");
            };
            assert_eq!(train, 0..(n * 8 / 10));
            assert_eq!(train.end, test.start);
            assert_eq!(test.end, n);
        }
        assert_eq!(
            SplitPlan::new(20, 1.0),
            SplitPlan::TrainTest {
                train: 0..20,
                test: 20..20
            }
        );
    }

    #[test]
    fn test_augment_file_splits_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("dataset");
        let out = dir.path().join("out");
        fs::create_dir_all(root.join("day1")).unwrap();
        let source = root.join("day1").join("flows.csv");
        fs::write(&source, flows_csv(23)).unwrap();

        let outcome =
            augment_file(&source, &root, &out, &FittedTransforms::default(), 0.8).unwrap();
        let FileOutcome::Written(written) = outcome else {
            panic!("expected written outcome");
        };
        assert_eq!(written.train_path, out.join("day1").join("flows.csv"));
        assert_eq!(
            written.test_path.as_deref(),
            Some(out.join("day1").join("flows_test.csv").as_path())
        );
        assert_eq!((written.train_rows, written.test_rows), (18, 5));
        assert!(!written.fell_back);

        let train = FlowTable::read(&written.train_path).unwrap();
        let test = FlowTable::read(written.test_path.as_ref().unwrap()).unwrap();
        let rates = column(&train, "Rate")
            .into_iter()
            .chain(column(&test, "Rate"))
            .collect::<Vec<_>>();
        let expected = (0..23).map(|i| f64::from(i * 3)).collect::<Vec<_>>();
        assert_eq!(rates, expected);
    }

    #[test]
    fn test_augment_small_file_unsplit() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("small.csv");
        fs::write(&source, flows_csv(10)).unwrap();
        let out = dir.path().join("out");

        let outcome =
            augment_file(&source, dir.path(), &out, &FittedTransforms::default(), 0.8).unwrap();
        let FileOutcome::Written(written) = outcome else {
            panic!("expected written outcome");
        };
        assert_eq!(written.test_path, None);
        assert_eq!(FlowTable::read(&written.train_path).unwrap().len(), 10);
        assert!(!out.join("small_test.csv").exists());
    }

    #[test]
    fn test_augment_unreadable_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.csv");
        fs::write(&source, "a,b\n1,2,3\n").unwrap();
        let out = dir.path().join("out");

        let outcome =
            augment_file(&source, dir.path(), &out, &FittedTransforms::default(), 0.8).unwrap();
        assert!(outcome.is_skipped());
        assert!(!out.exists());
    }

    #[test]
    fn test_failed_split_falls_back_to_whole_table() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("flows.csv");
        fs::write(&source, flows_csv(15)).unwrap();
        let out = dir.path().join("out");
        // a directory where the test file should go makes the split write fail
        fs::create_dir_all(out.join("flows_test.csv")).unwrap();

        let outcome =
            augment_file(&source, dir.path(), &out, &FittedTransforms::default(), 0.8).unwrap();
        let FileOutcome::Written(written) = outcome else {
            panic!("expected written outcome");
        };
        assert!(written.fell_back);
        assert_eq!(written.test_path, None);
        assert_eq!(FlowTable::read(&out.join("flows.csv")).unwrap().len(), 15);
    }

    #[test]
    fn test_failed_fallback_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("flows.csv");
        fs::write(&source, flows_csv(3)).unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("flows.csv")).unwrap();

        let err = augment_file(&source, dir.path(), &out, &FittedTransforms::default(), 0.8)
            .unwrap_err();
        assert!(matches!(err, WriteError::Write { .. }));
    }

    #[test]
    fn test_mirror_outside_root_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("dataset");
        fs::create_dir_all(&root).unwrap();
        let source = dir.path().join("elsewhere.csv");
        fs::write(&source, "a\n").unwrap();
        assert_eq!(
            mirror_output_path(&source, &root, Path::new("out")),
            Path::new("out").join("elsewhere.csv")
        );
    }
}
