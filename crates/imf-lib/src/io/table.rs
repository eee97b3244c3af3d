//! Feature table CSV: the pipeline's single persisted artifact.
//!
//! The file is created, fully written, flushed and closed inside one call.
//! A failure partway through leaves a truncated file behind; callers that
//! need all-or-nothing output should write to a temporary path and rename.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{FeatureError, Result};
use crate::metrics::features::{FeatureRow, FeatureVector, FEATURE_COLUMNS};

/// Write the header and one record per row to any writer. `dest` names the
/// destination in errors.
pub fn write_feature_rows<W: Write>(
    writer: W,
    dest: &Path,
    rows: &[FeatureVector],
) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    let err = |e: csv::Error| FeatureError::csv(dest, e);
    writer.write_record(FEATURE_COLUMNS).map_err(err)?;
    for row in rows {
        writer.serialize(FeatureRow::from(row)).map_err(err)?;
    }
    writer.flush().map_err(|e| FeatureError::io(dest, e))?;
    Ok(())
}

pub fn write_feature_table(path: &Path, rows: &[FeatureVector]) -> Result<()> {
    let file = File::create(path).map_err(|e| FeatureError::io(path, e))?;
    write_feature_rows(file, path, rows)
}

pub fn read_feature_table(path: &Path) -> Result<Vec<FeatureVector>> {
    let file = File::open(path).map_err(|e| FeatureError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);
    let mut rows = Vec::new();
    for row in reader.deserialize::<FeatureRow>() {
        let row = row.map_err(|e| FeatureError::csv(path, e))?;
        rows.push(FeatureVector::from(row));
    }
    Ok(rows)
}
