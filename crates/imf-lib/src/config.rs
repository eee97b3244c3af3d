//! TOML run files.
//!
//! ```toml
//! [pipeline]
//! sample_rate_hz = 100
//! window_seconds = 0.5
//! cutoff_hz = 10
//! filter_order = 4
//! input_dir = "motion_data"
//! output = "features.csv"
//! row_policy = "skip"
//!
//! [[files]]
//! file = "stationary_processed.csv"
//! label = "stationary"
//! ```
//!
//! Omitted keys fall back to [`PipelineConfig::default`]. A `[[files]]` list,
//! when present, replaces the default mapping entirely and keeps its order.
//! Paths are taken as written, relative to the working directory.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FeatureError, Result};
use crate::io::RowPolicy;
use crate::pipeline::{FileLabel, PipelineConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunFile {
    #[serde(default)]
    pipeline: PipelineSection,
    #[serde(default)]
    files: Option<Vec<FileLabel>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineSection {
    #[serde(default)]
    sample_rate_hz: Option<f64>,
    #[serde(default)]
    window_seconds: Option<f64>,
    #[serde(default)]
    cutoff_hz: Option<f64>,
    #[serde(default)]
    filter_order: Option<usize>,
    #[serde(default)]
    input_dir: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    row_policy: Option<RowPolicy>,
}

impl RunFile {
    fn into_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let p = self.pipeline;
        PipelineConfig {
            sample_rate_hz: p.sample_rate_hz.unwrap_or(defaults.sample_rate_hz),
            window_seconds: p.window_seconds.unwrap_or(defaults.window_seconds),
            cutoff_hz: p.cutoff_hz.unwrap_or(defaults.cutoff_hz),
            filter_order: p.filter_order.unwrap_or(defaults.filter_order),
            input_dir: p.input_dir.unwrap_or(defaults.input_dir),
            output: p.output.unwrap_or(defaults.output),
            files: self.files.unwrap_or(defaults.files),
            row_policy: p.row_policy.unwrap_or(defaults.row_policy),
        }
    }
}

/// Parse run-file text; `source` is only used in error messages.
pub fn parse_config(text: &str, source: &Path) -> Result<PipelineConfig> {
    let run: RunFile = toml::from_str(text).map_err(|e| FeatureError::Toml {
        path: source.to_path_buf(),
        source: e,
    })?;
    Ok(run.into_config())
}

pub fn read_config(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path).map_err(|e| FeatureError::io(path, e))?;
    parse_config(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::MotionLabel;

    fn parse(text: &str) -> Result<PipelineConfig> {
        parse_config(text, Path::new("run.toml"))
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn overrides_scalars_and_keeps_file_order() {
        let cfg = parse(
            r#"
            [pipeline]
            sample_rate_hz = 200
            window_seconds = 0.25
            input_dir = "data"
            row_policy = "reject"

            [[files]]
            file = "tap.csv"
            label = "tap"

            [[files]]
            file = "still.csv"
            label = "stationary"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.sample_rate_hz, 200.0);
        assert_eq!(cfg.samples_per_window().unwrap(), 50);
        assert_eq!(cfg.cutoff_hz, 10.0);
        assert_eq!(cfg.input_dir, PathBuf::from("data"));
        assert_eq!(cfg.row_policy, RowPolicy::Reject);
        assert_eq!(
            cfg.files,
            vec![
                FileLabel::new("tap.csv", MotionLabel::Tap),
                FileLabel::new("still.csv", MotionLabel::Stationary),
            ]
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = parse(
            r#"
            [[files]]
            file = "walk.csv"
            label = "walking"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, FeatureError::Toml { .. }));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(parse("[pipeline]\nsample_rate = 100\n").is_err());
    }
}
