use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn summarize_groups_features_by_label() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let table = temp.path().join("features.csv");
    let root = workspace_root();

    let mut extract = cargo_bin_cmd!("imf");
    extract.args([
        "extract",
        "--config",
        root.join("test_data/run.toml").to_str().expect("utf8 path"),
        "--input-dir",
        root.join("test_data").to_str().expect("utf8 path"),
        "--out",
        table.to_str().expect("utf8 path"),
    ]);
    extract.assert().success();

    let mut cmd = cargo_bin_cmd!("imf");
    cmd.args(["summarize", "--input", table.to_str().expect("utf8 path")]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&output)?;
    let groups = value.as_array().expect("array of label summaries");

    let labels: Vec<&str> = groups
        .iter()
        .filter_map(|g| g.get("label").and_then(Value::as_str))
        .collect();
    assert_eq!(labels, vec!["stationary", "slow", "vibration", "tap"]);

    let counts: Vec<u64> = groups
        .iter()
        .filter_map(|g| g.get("count").and_then(Value::as_u64))
        .collect();
    assert_eq!(counts, vec![5, 5, 6, 3]);

    for group in groups {
        let features = group["features"].as_array().expect("features");
        assert_eq!(features.len(), 8);
        for feature in features {
            let stats = &feature["stats"];
            let min = stats["min"].as_f64().unwrap();
            let median = stats["median"].as_f64().unwrap();
            let max = stats["max"].as_f64().unwrap();
            assert!(min <= median && median <= max);
        }
    }
    Ok(())
}

#[test]
fn summarize_fails_on_missing_table() {
    let mut cmd = cargo_bin_cmd!("imf");
    cmd.args(["summarize", "--input", "/nonexistent/features.csv"]);
    cmd.assert().failure();
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}
