use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    acc_rms: f64,
    acc_var: f64,
    acc_peak: f64,
    acc_zcr: f64,
    gyro_rms: f64,
    gyro_var: f64,
    gyro_peak: f64,
    gyro_zcr: f64,
    label: String,
}

fn feature_rows(file: &str, label: &str) -> Result<Vec<Row>, Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("imf");
    cmd.args(["features", "--input", &sample_path(file), "--label", label]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let mut rows = Vec::new();
    for line in output.split(|b| *b == b'\n').filter(|l| !l.is_empty()) {
        rows.push(serde_json::from_slice(line)?);
    }
    Ok(rows)
}

#[test]
fn features_emits_one_row_per_window() -> Result<(), Box<dyn Error>> {
    let rows = feature_rows("test_data/vibration.csv", "vibration")?;
    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert_eq!(row.label, "vibration");
        assert!(row.acc_rms >= 0.0 && row.gyro_rms >= 0.0);
        assert!(row.acc_var >= 0.0 && row.gyro_var >= 0.0);
        assert!(row.acc_peak >= 0.0 && row.gyro_peak >= 0.0);
        assert!((0.0..=1.0).contains(&row.acc_zcr));
        assert!((0.0..=1.0).contains(&row.gyro_zcr));
    }
    Ok(())
}

#[test]
fn malformed_rows_do_not_change_output() -> Result<(), Box<dyn Error>> {
    let clean = feature_rows("test_data/tap.csv", "tap")?;
    let dirty = feature_rows("test_data/tap_malformed.csv", "tap")?;
    assert_eq!(clean.len(), 3);
    assert_eq!(clean, dirty);
    Ok(())
}

#[test]
fn window_length_flag_changes_window_count() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("imf");
    cmd.args([
        "features",
        "--input",
        &sample_path("test_data/stationary.csv"),
        "--label",
        "stationary",
        "--window-s",
        "0.25",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let count = output
        .split(|b| *b == b'\n')
        .filter(|l| !l.is_empty())
        .count();
    // 260 samples, 25-sample windows: starts 0..=225 below 235
    assert_eq!(count, 10);
    Ok(())
}

fn sample_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative)
        .to_string_lossy()
        .to_string()
}
