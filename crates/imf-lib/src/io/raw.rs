use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{FeatureError, Result};
use crate::signal::SampleSeries;

/// Fields per raw row: `time_ms, accel_magnitude_g, gyro_magnitude_deg_per_s`.
pub const RAW_FIELDS: usize = 3;

/// What to do with rows whose field count is not [`RAW_FIELDS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Drop the row, count it, keep going.
    #[default]
    Skip,
    /// Fail the file with [`FeatureError::MalformedRow`].
    Reject,
}

/// Parsed recording plus the number of rows dropped under [`RowPolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawParse {
    pub series: SampleSeries,
    pub skipped_rows: usize,
}

/// Parse a raw recording. The first line is a header and is ignored. Blank
/// lines count as rows with no fields. Any non-numeric field is fatal.
pub fn parse_raw_csv<R: Read>(
    mut reader: R,
    source: &Path,
    policy: RowPolicy,
) -> Result<RawParse> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| FeatureError::io(source, e))?;

    let mut row_reader = ReaderBuilder::new();
    row_reader.has_headers(false).flexible(true).trim(Trim::All);
    let mut record = StringRecord::new();
    let mut series = SampleSeries::default();
    let mut skipped_rows = 0;
    for (idx, text_line) in text.lines().enumerate().skip(1) {
        let line = idx as u64 + 1;
        record.clear();
        if !text_line.trim().is_empty() {
            row_reader
                .from_reader(text_line.as_bytes())
                .read_record(&mut record)
                .map_err(|e| FeatureError::csv(source, e))?;
        }
        if record.len() != RAW_FIELDS {
            match policy {
                RowPolicy::Skip => {
                    debug!(
                        "{}: dropping line {} with {} fields",
                        source.display(),
                        line,
                        record.len()
                    );
                    skipped_rows += 1;
                    continue;
                }
                RowPolicy::Reject => {
                    return Err(FeatureError::MalformedRow {
                        path: source.to_path_buf(),
                        line,
                        fields: record.len(),
                    });
                }
            }
        }
        let mut values = [0.0; RAW_FIELDS];
        for (column, (slot, field)) in values.iter_mut().zip(record.iter()).enumerate() {
            *slot = field.parse::<f64>().map_err(|_| FeatureError::Parse {
                path: source.to_path_buf(),
                line,
                column: column + 1,
                value: field.to_string(),
            })?;
        }
        series.push(values[0], values[1], values[2]);
    }
    if let Some(idx) = series.time_ms.windows(2).position(|w| w[1] < w[0]) {
        warn!(
            "{}: timestamps go backwards after sample {}",
            source.display(),
            idx
        );
    }
    if skipped_rows > 0 {
        warn!(
            "{}: dropped {} malformed row(s)",
            source.display(),
            skipped_rows
        );
    }
    Ok(RawParse {
        series,
        skipped_rows,
    })
}

pub fn read_raw_csv(path: &Path, policy: RowPolicy) -> Result<RawParse> {
    let file = File::open(path).map_err(|e| FeatureError::io(path, e))?;
    parse_raw_csv(file, path, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CLEAN: &str = "time_ms,accel_g,gyro_dps\n0,1.0,0.5\n10,1.1,0.4\n20,0.9,0.6\n";

    fn parse(text: &str, policy: RowPolicy) -> Result<RawParse> {
        parse_raw_csv(text.as_bytes(), Path::new("mem.csv"), policy)
    }

    #[test]
    fn parses_three_channels_and_skips_header() {
        let parsed = parse(CLEAN, RowPolicy::Skip).unwrap();
        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.series.len(), 3);
        assert_eq!(parsed.series.time_ms, vec![0.0, 10.0, 20.0]);
        assert_eq!(parsed.series.accel, vec![1.0, 1.1, 0.9]);
        assert_eq!(parsed.series.gyro, vec![0.5, 0.4, 0.6]);
    }

    #[test]
    fn malformed_rows_are_dropped_and_counted() {
        let text = "time_ms,accel_g,gyro_dps\n0,1.0,0.5\n5,1.2\n10,1.1,0.4\n15,1,2,3\n20,0.9,0.6\n";
        let parsed = parse(text, RowPolicy::Skip).unwrap();
        assert_eq!(parsed.skipped_rows, 2);
        assert_eq!(parsed.series, parse(CLEAN, RowPolicy::Skip).unwrap().series);
    }

    #[test]
    fn blank_lines_are_malformed_rows() {
        let text = "t,a,g\n0,1,2\n\n10,1,2\n   \n";
        let parsed = parse(text, RowPolicy::Skip).unwrap();
        assert_eq!(parsed.series.len(), 2);
        assert_eq!(parsed.skipped_rows, 2);

        match parse(text, RowPolicy::Reject) {
            Err(FeatureError::MalformedRow { line, fields, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(fields, 0);
            }
            other => panic!("expected malformed row error, got {:?}", other),
        }
    }

    #[test]
    fn trailing_newline_is_not_a_row() {
        let parsed = parse(CLEAN, RowPolicy::Reject).unwrap();
        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.series.len(), 3);
    }

    #[test]
    fn invalid_utf8_names_the_file() {
        let bytes: &[u8] = b"t,a,g\n0,\xff,2\n";
        let err = parse_raw_csv(bytes, Path::new("broken.csv"), RowPolicy::Skip).unwrap_err();
        assert!(matches!(err, FeatureError::Io { .. }));
        assert!(err.to_string().contains("broken.csv"));
    }

    #[test]
    fn reject_policy_fails_on_malformed_row() {
        let text = "time_ms,accel_g,gyro_dps\n0,1.0,0.5\n5,1.2\n";
        match parse(text, RowPolicy::Reject) {
            Err(FeatureError::MalformedRow { line, fields, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(fields, 2);
            }
            other => panic!("expected malformed row error, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_field_is_fatal() {
        let text = "time_ms,accel_g,gyro_dps\n0,1.0,0.5\n10,abc,0.4\n";
        match parse(text, RowPolicy::Skip) {
            Err(FeatureError::Parse {
                line,
                column,
                value,
                ..
            }) => {
                assert_eq!(line, 3);
                assert_eq!(column, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn tolerates_padded_fields() {
        let parsed = parse("t,a,g\n 0 , 1.5 ,2\n", RowPolicy::Skip).unwrap();
        assert_eq!(parsed.series.accel, vec![1.5]);
    }

    #[test]
    fn reads_from_disk_and_reports_missing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CLEAN.as_bytes()).unwrap();
        let parsed = read_raw_csv(file.path(), RowPolicy::Skip).unwrap();
        assert_eq!(parsed.series.len(), 3);

        let missing = read_raw_csv(Path::new("/nonexistent/raw.csv"), RowPolicy::Skip);
        assert!(matches!(missing, Err(FeatureError::Io { .. })));
    }
}
