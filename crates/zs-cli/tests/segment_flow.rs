//! End-to-end tests for the `zs` binary.
//!
//! Tests the full pipeline: seed → segment, with config layering and
//! policy overrides.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn zs_binary() -> String {
    env!("CARGO_BIN_EXE_zs").to_string()
}

/// A `zs` command isolated from the user's config and environment.
fn zs(home: &Path) -> Command {
    let mut cmd = Command::new(zs_binary());
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("ZS_THRESHOLD_MS")
        .env_remove("ZS_IDENTIFIER_SWITCH")
        .env_remove("ZS_ABANDONED_GAP")
        .env_remove("RUST_LOG");
    cmd
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "zs should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Write the 100-record demo sequence to `seed.jsonl` in the temp dir.
fn write_seed(temp: &TempDir) -> PathBuf {
    let output = zs(temp.path())
        .args(["seed", "--start", "2025-01-15T09:00:00Z"])
        .output()
        .expect("failed to run zs seed");
    assert_success(&output);

    let path = temp.path().join("seed.jsonl");
    std::fs::write(&path, &output.stdout).unwrap();
    path
}

fn segment_json(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = zs(temp.path())
        .arg("segment")
        .arg("--json")
        .args(args)
        .output()
        .expect("failed to run zs segment");
    assert_success(&output);
    serde_json::from_slice(&output.stdout).expect("segment output should be JSON")
}

fn group_sizes(value: &serde_json::Value) -> Vec<(String, usize)> {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_array().unwrap().len()))
        .collect()
}

#[test]
fn test_seed_segments_into_zones_and_overhead() {
    let temp = TempDir::new().unwrap();
    let seed = write_seed(&temp);

    let doc = segment_json(&temp, &[seed.to_str().unwrap()]);

    let matches = group_sizes(&doc["matches"]);
    assert_eq!(
        matches,
        ["zone0", "zone2", "zone4", "zone6", "zone8"]
            .iter()
            .map(|z| ((*z).to_string(), 10))
            .collect::<Vec<_>>()
    );
    let overhead = group_sizes(&doc["overhead"]);
    let keys: Vec<_> = overhead.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["1", "2", "3", "4", "5"]);
    assert!(overhead.iter().all(|(_, n)| *n == 10));
    assert_eq!(doc["discarded"].as_array().unwrap().len(), 0);
    assert_eq!(doc["summary"]["total_records"], 100);
}

#[test]
fn test_threshold_flag_discards_abandoned_gaps() {
    let temp = TempDir::new().unwrap();
    let seed = write_seed(&temp);

    let doc = segment_json(&temp, &["--threshold-ms", "10000", seed.to_str().unwrap()]);

    assert_eq!(group_sizes(&doc["matches"]).len(), 5);
    assert_eq!(group_sizes(&doc["overhead"]), vec![("1".to_string(), 10)]);
    assert_eq!(doc["discarded"].as_array().unwrap().len(), 40);
}

#[test]
fn test_abandoned_gap_overhead_policy() {
    let temp = TempDir::new().unwrap();
    let seed = write_seed(&temp);

    let doc = segment_json(
        &temp,
        &[
            "--threshold-ms",
            "10000",
            "--abandoned-gap",
            "overhead",
            seed.to_str().unwrap(),
        ],
    );

    assert_eq!(group_sizes(&doc["overhead"]).len(), 5);
    assert_eq!(doc["discarded"].as_array().unwrap().len(), 0);
}

#[test]
fn test_config_file_and_env_layering() {
    let temp = TempDir::new().unwrap();
    let seed = write_seed(&temp);
    let config = temp.path().join("zs.toml");
    std::fs::write(&config, "threshold_ms = 10000\n").unwrap();

    // Config file raises the threshold.
    let output = zs(temp.path())
        .args(["--config", config.to_str().unwrap(), "segment", "--json"])
        .arg(&seed)
        .output()
        .unwrap();
    assert_success(&output);
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["discarded"].as_array().unwrap().len(), 40);

    // Environment wins over the file.
    let output = zs(temp.path())
        .env("ZS_THRESHOLD_MS", "5000")
        .args(["--config", config.to_str().unwrap(), "segment", "--json"])
        .arg(&seed)
        .output()
        .unwrap();
    assert_success(&output);
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["discarded"].as_array().unwrap().len(), 0);
    assert_eq!(group_sizes(&doc["overhead"]).len(), 5);
}

#[test]
fn test_segment_reads_stdin() {
    let temp = TempDir::new().unwrap();
    let input = concat!(
        r#"{"timestamp":"2025-01-15T09:00:00Z","active":true,"identifier":"z"}"#,
        "\n",
        r#"{"timestamp":"2025-01-15T09:00:01Z","active":false,"identifier":""}"#,
        "\n",
        r#"{"timestamp":"2025-01-15T09:00:02Z","active":true,"identifier":"z"}"#,
        "\n",
    );

    let mut child = zs(temp.path())
        .arg("segment")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  z (3 records, 2s)"), "got: {stdout}");
    assert!(stdout.contains("Totals: 3 records, 3 matched (2s)"));
}

#[test]
fn test_reject_policy_fails_on_identifier_switch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("switch.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"timestamp":"2025-01-15T09:00:00Z","active":true,"identifier":"a"}"#,
            "\n",
            r#"{"timestamp":"2025-01-15T09:00:01Z","active":true,"identifier":"b"}"#,
            "\n",
        ),
    )
    .unwrap();

    let output = zs(temp.path())
        .args(["segment", "--identifier-switch", "reject"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("switched from `a` to `b`"), "got: {stderr}");

    // Default policy creates the group instead.
    let output = zs(temp.path()).arg("segment").arg(&path).output().unwrap();
    assert_success(&output);
}

#[test]
fn test_malformed_record_reports_line() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.jsonl");
    std::fs::write(&path, "{\"active\":true}\n").unwrap();

    let output = zs(temp.path()).arg("segment").arg(&path).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.jsonl:1: invalid record"), "got: {stderr}");
}

#[test]
fn test_config_command_prints_defaults() {
    let temp = TempDir::new().unwrap();

    let output = zs(temp.path()).arg("config").output().unwrap();
    assert_success(&output);

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["threshold_ms"], 5000);
    assert_eq!(config["identifier_switch"], "auto_create");
    assert_eq!(config["abandoned_gap"], "discard");
}

#[test]
fn test_out_of_range_threshold_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let seed = write_seed(&temp);

    let output = zs(temp.path())
        .arg("segment")
        .arg("--threshold-ms=-9223372036854775808")
        .arg(&seed)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("threshold out of range"), "got: {stderr}");
    assert!(!stderr.contains("panicked"), "got: {stderr}");

    let output = zs(temp.path())
        .env("ZS_THRESHOLD_MS", i64::MIN.to_string())
        .arg("segment")
        .arg(&seed)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("threshold out of range"), "got: {stderr}");
}

#[test]
fn test_repeated_stdin_is_rejected() {
    let temp = TempDir::new().unwrap();

    let output = zs(temp.path())
        .args(["segment", "-", "-"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("can only be read once"), "got: {stderr}");
}
