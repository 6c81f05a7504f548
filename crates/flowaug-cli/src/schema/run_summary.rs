use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flowaug_analysis::augment::{FileOutcome, WrittenFile};
use serde::Serialize;

/// Report of one augmentation run, written with `--summary`
///
/// Fitted parameters are never included; they only live in memory.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Timestamp when the run finished (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub out: PathBuf,
    /// Nothing was written under `out`
    pub dry_run: bool,
    /// CSV files discovered, after `--limit-files`
    pub files_found: usize,
    /// Rows used to fit the scaler and projection
    pub sampled_rows: usize,
    /// Candidate columns the scaler and projection were fit on
    pub fitted_columns: Vec<String>,
    /// Per-file outcome, in processing order
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileRecord {
    Written {
        source: PathBuf,
        train_path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        test_path: Option<PathBuf>,
        train_rows: usize,
        test_rows: usize,
        fell_back: bool,
    },
    Skipped {
        source: PathBuf,
        reason: String,
    },
}

impl FileRecord {
    pub fn new(source: &Path, outcome: FileOutcome) -> Self {
        match outcome {
            FileOutcome::Written(WrittenFile {
                source,
                train_path,
                test_path,
                train_rows,
                test_rows,
                fell_back,
            }) => Self::Written {
                source,
                train_path,
                test_path,
                train_rows,
                test_rows,
                fell_back,
            },
            FileOutcome::Skipped(reason) => Self::Skipped {
                source: source.to_owned(),
                reason: reason.to_string(),
            },
        }
    }
}

/// Outcome counts over a list of file records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub written: usize,
    pub split: usize,
    pub fell_back: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for file in &self.files {
            match file {
                FileRecord::Written {
                    test_path,
                    fell_back,
                    ..
                } => {
                    counts.written += 1;
                    counts.split += usize::from(test_path.is_some());
                    counts.fell_back += usize::from(*fell_back);
                }
                FileRecord::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }
}
