use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    error::{FeatureError, Result},
    filter::{Butterworth, FilterSpec},
    io::{raw::read_raw_csv, table::write_feature_table, RowPolicy},
    label::MotionLabel,
    metrics::features::FeatureVector,
    signal::condition,
    window::{samples_per_window, Windower},
};

/// One recording and the motion class of all its windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLabel {
    pub file: PathBuf,
    pub label: MotionLabel,
}

impl FileLabel {
    pub fn new(file: impl Into<PathBuf>, label: MotionLabel) -> Self {
        Self {
            file: file.into(),
            label,
        }
    }
}

/// Everything a run needs; passed explicitly to every entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Uniform sampling frequency of the raw recordings (Hz).
    pub sample_rate_hz: f64,
    /// Analysis window length (seconds).
    pub window_seconds: f64,
    /// Low-pass cutoff (Hz), must stay below Nyquist.
    pub cutoff_hz: f64,
    /// Butterworth order.
    pub filter_order: usize,
    /// Directory the `files` entries are resolved against.
    pub input_dir: PathBuf,
    /// Feature table destination.
    pub output: PathBuf,
    /// Ordered file → label mapping; output rows follow this order.
    pub files: Vec<FileLabel>,
    pub row_policy: RowPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            window_seconds: 0.5,
            cutoff_hz: 10.0,
            filter_order: 4,
            input_dir: PathBuf::new(),
            output: PathBuf::from("features.csv"),
            files: MotionLabel::ALL
                .into_iter()
                .map(|label| FileLabel::new(format!("{}_processed.csv", label), label))
                .collect(),
            row_policy: RowPolicy::Skip,
        }
    }
}

impl PipelineConfig {
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            order: self.filter_order,
            cutoff_hz: self.cutoff_hz,
            sample_rate_hz: self.sample_rate_hz,
        }
    }

    pub fn samples_per_window(&self) -> Result<usize> {
        samples_per_window(self.sample_rate_hz, self.window_seconds)
    }

    /// Reject configurations that cannot run, before any file is read.
    pub fn validate(&self) -> Result<()> {
        self.filter_spec().validate()?;
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(FeatureError::Config(format!(
                "window length must be positive, got {} s",
                self.window_seconds
            )));
        }
        self.samples_per_window()?;
        if self.files.is_empty() {
            return Err(FeatureError::Config("no input files configured".into()));
        }
        Ok(())
    }

    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.input_dir.join(file)
    }
}

/// Counts for one processed recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub label: MotionLabel,
    pub samples: usize,
    pub skipped_rows: usize,
    pub windows: usize,
}

/// Feature rows of one recording, in window order.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFeatures {
    pub rows: Vec<FeatureVector>,
    pub report: FileReport,
}

/// Rows of every configured file, in mapping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub rows: Vec<FeatureVector>,
    pub files: Vec<FileReport>,
}

impl FeatureTable {
    pub fn skipped_rows(&self) -> usize {
        self.files.iter().map(|f| f.skipped_rows).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub skipped_rows: usize,
    pub samples_per_window: usize,
    pub files: Vec<FileReport>,
}

/// Ingest, condition, window and featurize a single recording.
pub fn process_file(path: &Path, label: MotionLabel, cfg: &PipelineConfig) -> Result<FileFeatures> {
    let filter = Butterworth::lowpass(&cfg.filter_spec())?;
    let window = cfg.samples_per_window()?;
    process_file_with(path, label, &filter, window, cfg.row_policy)
}

fn process_file_with(
    path: &Path,
    label: MotionLabel,
    filter: &Butterworth,
    window: usize,
    policy: RowPolicy,
) -> Result<FileFeatures> {
    let parsed = read_raw_csv(path, policy)?;
    let conditioned = condition(&parsed.series, filter).map_err(|source| FeatureError::Signal {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<FeatureVector> = Windower::new(conditioned.len(), window)
        .iter()
        .map(|span| {
            FeatureVector::compute(
                &conditioned.accel[span.clone()],
                &conditioned.gyro[span],
                label,
            )
        })
        .collect();
    info!(
        "{} [{}]: {} samples, {} dropped rows, {} windows",
        path.display(),
        label,
        parsed.series.len(),
        parsed.skipped_rows,
        rows.len()
    );
    let report = FileReport {
        file: path.to_path_buf(),
        label,
        samples: parsed.series.len(),
        skipped_rows: parsed.skipped_rows,
        windows: rows.len(),
    };
    Ok(FileFeatures { rows, report })
}

/// Run every configured file and collect the rows without writing them.
pub fn extract_features(cfg: &PipelineConfig) -> Result<FeatureTable> {
    cfg.validate()?;
    let filter = Butterworth::lowpass(&cfg.filter_spec())?;
    let window = cfg.samples_per_window()?;
    let mut table = FeatureTable::default();
    for entry in &cfg.files {
        let path = cfg.resolve(&entry.file);
        let features = process_file_with(&path, entry.label, &filter, window, cfg.row_policy)?;
        table.rows.extend(features.rows);
        table.files.push(features.report);
    }
    Ok(table)
}

/// Extract features for the whole mapping and write the output table.
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    let table = extract_features(cfg)?;
    write_feature_table(&cfg.output, &table.rows)?;
    let summary = RunSummary {
        output: cfg.output.clone(),
        rows: table.rows.len(),
        skipped_rows: table.skipped_rows(),
        samples_per_window: cfg.samples_per_window()?,
        files: table.files,
    };
    info!(
        "wrote {} rows from {} file(s) to {}",
        summary.rows,
        summary.files.len(),
        summary.output.display()
    );
    Ok(summary)
}
