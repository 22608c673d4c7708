//! Integration tests for autohvsr-cli.
//!
//! Each test drives the built binary end to end on files in a temp dir.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Helper to get the path to the `autohvsr` binary built by cargo.
fn autohvsr_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autohvsr"));
    // Keep user settings files out of the tests
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("autohvsr-cli-tests"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_ok(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("failed to run autohvsr");
    assert!(
        output.status.success(),
        "autohvsr failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn write_prominence_artifact(dir: &Path) -> PathBuf {
    let path = dir.join("classifier.json");
    std::fs::write(
        &path,
        r#"{"kind":"prominence","n_features":19,"min_prominence":0.25}"#,
    )
    .unwrap();
    path
}

fn generate_two_resonances(dir: &Path) -> PathBuf {
    let curves = dir.join("curves.json");
    run_ok(
        autohvsr_bin()
            .current_dir(dir)
            .arg("generate")
            .arg(&curves)
            .args(["--resonance", "2.0:4.0", "--resonance", "8.0:3.0:0.5"]),
    );
    curves
}

// ---------------------------------------------------------------------------
// generate / identify
// ---------------------------------------------------------------------------

#[test]
fn cli_generate_writes_curve_set() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&curves).unwrap()).unwrap();
    assert_eq!(json["amplitude"].as_array().unwrap().len(), 40);
    assert_eq!(json["frequency"].as_array().unwrap().len(), 256);
}

#[test]
fn cli_identify_finds_both_resonances() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let classifier = write_prominence_artifact(dir.path());
    let result_path = dir.path().join("result.json");
    let csv_path = dir.path().join("peaks.csv");

    let output = run_ok(
        autohvsr_bin()
            .current_dir(dir.path())
            .arg("identify")
            .arg(&curves)
            .arg("--classifier")
            .arg(&classifier)
            .arg("-o")
            .arg(&result_path)
            .arg("--peaks-csv")
            .arg(&csv_path),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("candidate peaks"), "stdout: {stdout}");

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result_path).unwrap()).unwrap();
    let resonances = result["resonances"].as_array().unwrap();
    assert_eq!(resonances.len(), 2);
    let f0 = resonances[0]["frequency"]["mean"].as_f64().unwrap();
    let f1 = resonances[1]["frequency"]["mean"].as_f64().unwrap();
    assert!((f0 - 2.0).abs() < 0.2, "f0 = {f0}");
    assert!((f1 - 8.0).abs() < 0.8, "f1 = {f1}");

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.lines().next().unwrap().starts_with("window,frequency"));
    assert!(csv.lines().count() > 1);
}

#[test]
fn cli_identify_with_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let classifier = write_prominence_artifact(dir.path());

    let output = run_ok(
        autohvsr_bin()
            .current_dir(dir.path())
            .arg("identify")
            .arg(&curves)
            .arg("--classifier")
            .arg(&classifier)
            .arg("--reject"),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Window rejection"), "stdout: {stdout}");
}

#[test]
fn cli_identify_without_classifier_fails() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let output = autohvsr_bin()
        .current_dir(dir.path())
        .arg("identify")
        .arg(&curves)
        .output()
        .expect("failed to run autohvsr");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("classifier"), "stderr: {stderr}");
}

#[test]
fn cli_identify_missing_artifact_fails() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let output = autohvsr_bin()
        .current_dir(dir.path())
        .arg("identify")
        .arg(&curves)
        .arg("--classifier")
        .arg(dir.path().join("missing.json"))
        .output()
        .expect("failed to run autohvsr");
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// peaks / reject
// ---------------------------------------------------------------------------

#[test]
fn cli_peaks_writes_feature_csv() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let csv_path = dir.path().join("candidates.csv");
    run_ok(
        autohvsr_bin()
            .current_dir(dir.path())
            .arg("peaks")
            .arg(&curves)
            .arg("-o")
            .arg(&csv_path),
    );
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let header: Vec<&str> = csv.lines().next().unwrap().split(',').collect();
    // 4 peak columns + 19 features
    assert_eq!(header.len(), 23, "header: {header:?}");
}

#[test]
fn cli_reject_writes_kept_windows() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let kept = dir.path().join("kept.txt");
    let hv = dir.path().join("site.hv");
    let output = run_ok(
        autohvsr_bin()
            .current_dir(dir.path())
            .arg("reject")
            .arg(&curves)
            .args(["--n", "2.0"])
            .arg("-o")
            .arg(&kept)
            .arg("--hv")
            .arg(&hv),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Before rejection"));
    assert!(stdout.contains("After rejection"));
    assert!(kept.exists());

    let report = std::fs::read_to_string(&hv).unwrap();
    assert!(report.starts_with("# hvsrpy-style output"));
    assert_eq!(report.lines().filter(|l| !l.starts_with('#')).count(), 256);
}

#[test]
fn cli_identify_writes_geopsy_report() {
    let dir = tempfile::tempdir().unwrap();
    let curves = generate_two_resonances(dir.path());
    let classifier = write_prominence_artifact(dir.path());
    let hv = dir.path().join("site_geopsy.hv");
    run_ok(
        autohvsr_bin()
            .current_dir(dir.path())
            .arg("identify")
            .arg(&curves)
            .arg("--classifier")
            .arg(&classifier)
            .arg("--hv")
            .arg(&hv)
            .args(["--hv-style", "geopsy"]),
    );
    let report = std::fs::read_to_string(&hv).unwrap();
    assert!(report.starts_with("# GEOPSY output version 1.0"));
    assert!(report.contains("# Number of windows = 40"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn cli_config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("autohvsr.toml");
    run_ok(autohvsr_bin().current_dir(dir.path()).args(["config", "init"]).arg(&settings));
    assert!(settings.exists());

    // Second init without --force refuses to overwrite
    let again = autohvsr_bin()
        .current_dir(dir.path())
        .args(["config", "init"])
        .arg(&settings)
        .output()
        .unwrap();
    assert!(!again.status.success());

    let output = run_ok(autohvsr_bin().current_dir(dir.path()).args(["config", "show"]));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[statistics]"), "stdout: {stdout}");
    assert!(stdout.contains("min_samples"), "stdout: {stdout}");
}

#[test]
fn cli_config_path_lists_search_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ok(autohvsr_bin().current_dir(dir.path()).args(["config", "path"]));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("autohvsr.toml"));
}
