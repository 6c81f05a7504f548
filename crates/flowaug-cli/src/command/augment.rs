use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use flowaug_analysis::{
    augment::{self, DEFAULT_TRAIN_SPLIT},
    normalization::FittedTransforms,
    sample::FlowSample,
};
use tracing::info;

use crate::{
    schema::run_summary::{FileRecord, RunSummary},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AugmentArg {
    /// Root directory searched recursively for `*.csv` files
    #[arg(long, default_value = "dataset")]
    dataset: PathBuf,
    /// Output root; the dataset's directory layout is mirrored below it
    #[arg(long, default_value = "dataset_augmented")]
    out: PathBuf,
    /// Rows read from the head of each file to fit the scaler and projection
    #[arg(long, default_value_t = 200)]
    sample_per_file: usize,
    /// Process only the first N discovered files (0 = all)
    #[arg(long, default_value_t = 0)]
    limit_files: usize,
    /// Fraction of each file's rows written to the train partition
    #[arg(long, default_value_t = DEFAULT_TRAIN_SPLIT, value_parser = parse_train_split)]
    train_split: f64,
    /// Discover, sample and fit, but write no augmented files
    #[arg(long)]
    dry_run: bool,
    /// Write a JSON run summary to this path (`-` for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn parse_train_split(s: &str) -> Result<f64, String> {
    let ratio = s
        .parse::<f64>()
        .map_err(|e| format!("invalid ratio `{s}`: {e}"))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("ratio must be within [0, 1], got {ratio}"))
    }
}

pub(crate) fn run(arg: &AugmentArg) -> anyhow::Result<()> {
    let AugmentArg {
        dataset,
        out,
        sample_per_file,
        limit_files,
        train_split,
        dry_run,
        summary,
    } = arg;

    let mut paths = util::discover_csv_files(dataset);
    if *limit_files > 0 {
        paths.truncate(*limit_files);
    }
    info!("Found {} CSV files under {}", paths.len(), dataset.display());

    let sample = FlowSample::collect(&paths, *sample_per_file);
    info!(
        "Sampled {} rows from {} files ({} skipped)",
        sample.len(),
        sample.files_read,
        sample.skipped.len()
    );
    let transforms = FittedTransforms::fit(sample.table.as_ref());

    let mut report = RunSummary {
        generated_at: Utc::now(),
        dataset: dataset.clone(),
        out: out.clone(),
        dry_run: *dry_run,
        files_found: paths.len(),
        sampled_rows: sample.len(),
        fitted_columns: transforms
            .columns()
            .iter()
            .map(|name| (*name).to_owned())
            .collect(),
        files: Vec::with_capacity(paths.len()),
    };
    drop(sample);

    if *dry_run {
        info!("Dry run; no files written");
    } else {
        for path in &paths {
            let outcome =
                augment::augment_file(path, dataset, out, &transforms, *train_split)
                    .with_context(|| {
                        format!("Failed to write augmented output for {}", path.display())
                    })?;
            report.files.push(FileRecord::new(path, outcome));
        }
        let counts = report.counts();
        info!(
            written = counts.written,
            split = counts.split,
            fell_back = counts.fell_back,
            skipped = counts.skipped,
            "Augmentation complete. Files saved under {}",
            out.display()
        );
    }

    if let Some(path) = summary {
        report.generated_at = Utc::now();
        Output::save_json(&report, Some(path.clone()))?;
        if path.as_os_str() != "-" {
            info!("Run summary saved to {}", path.display());
        }
    }

    Ok(())
}
