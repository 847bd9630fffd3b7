use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn ttempsmooth_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ttempsmooth").expect("Failed to find ttempsmooth binary");
    for key in [
        "TTEMPSMOOTH_MAXR",
        "TTEMPSMOOTH_STRENGTH",
        "TTEMPSMOOTH_SCTHRESH",
        "TTEMPSMOOTH_PARALLEL",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_validate_defaults() {
    ttempsmooth_cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(contains("Parameters are valid"))
        .stdout(contains("adaptive blending"));
}

#[test]
fn test_validate_json_output() {
    ttempsmooth_cmd()
        .args(["validate", "--json"])
        .assert()
        .success()
        .stdout(contains("\"maxr\": 3"))
        .stdout(contains("\"pmode\": \"adaptive\""));
}

#[test]
fn test_flags_override_config_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{ "maxr": 5, "strength": 4 }"#)?;

    ttempsmooth_cmd()
        .arg("validate")
        .arg("--config")
        .arg(&params)
        .args(["--maxr", "2", "--json"])
        .assert()
        .success()
        .stdout(contains("\"maxr\": 2"))
        .stdout(contains("\"strength\": 4"));

    Ok(())
}

#[test]
fn test_environment_overrides() {
    ttempsmooth_cmd()
        .env("TTEMPSMOOTH_MAXR", "6")
        .args(["validate", "--json"])
        .assert()
        .success()
        .stdout(contains("\"maxr\": 6"));

    ttempsmooth_cmd()
        .env("TTEMPSMOOTH_MAXR", "6")
        .args(["validate", "--json", "--no-env"])
        .assert()
        .success()
        .stdout(contains("\"maxr\": 3"));
}

#[test]
fn test_invalid_parameter_fails() {
    ttempsmooth_cmd()
        .args(["validate", "--maxr", "9"])
        .assert()
        .failure()
        .stderr(contains("maxr"));

    ttempsmooth_cmd()
        .args(["validate", "--thresh", "0"])
        .assert()
        .failure()
        .stderr(contains("ythresh"));
}

#[test]
fn test_missing_config_file_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let missing = dir.path().join("missing.json");

    ttempsmooth_cmd()
        .arg("validate")
        .arg("--config")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(contains("Failed to load parameters"));

    Ok(())
}

#[test]
fn test_unknown_mode_is_rejected_by_parser() {
    ttempsmooth_cmd()
        .args(["validate", "--pmode", "median"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
}

#[test]
fn test_weights_json() {
    ttempsmooth_cmd()
        .args(["weights", "--plane", "u", "--bits", "10", "--json"])
        .assert()
        .success()
        .stdout(contains("\"plane\": \"u\""))
        .stdout(contains("\"regime\": \"difference_indexed\""))
        .stdout(contains("\"integer_threshold\": 20"))
        .stdout(contains("center_weight"));
}

#[test]
fn test_weights_distance_regime() {
    ttempsmooth_cmd()
        .args(["weights", "--thresh", "1", "--maxr", "2"])
        .assert()
        .success()
        .stdout(contains("by temporal distance"))
        .stdout(contains("Weight by window position"));
}

#[test]
fn test_bench_small_clip() {
    ttempsmooth_cmd()
        .args([
            "bench", "--width", "32", "--height", "16", "--frames", "6", "--scene-cut", "3",
        ])
        .assert()
        .success()
        .stdout(contains("smoothed PSNR (Y)"))
        .stdout(contains("Benchmark complete"));
}

#[test]
fn test_bench_best_match_needs_8_bit() {
    ttempsmooth_cmd()
        .args([
            "bench",
            "--width",
            "16",
            "--height",
            "8",
            "--frames",
            "3",
            "--format",
            "yuv420p10",
            "--pmode",
            "best-match",
        ])
        .assert()
        .failure()
        .stderr(contains("Unsupported format"));
}

#[test]
fn test_bench_rejects_empty_clip() {
    ttempsmooth_cmd()
        .args(["bench", "--frames", "0"])
        .assert()
        .failure()
        .stderr(contains("synthetic clip"));
}

#[test]
fn test_log_file_receives_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let log_path = dir.path().join("logs").join("run.log");

    ttempsmooth_cmd()
        .arg("validate")
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .success();

    let contents = fs::read_to_string(&log_path)?;
    assert!(predicate::str::contains("Parameters are valid").eval(&contents));
    assert!(contents.contains("INFO"));

    Ok(())
}
