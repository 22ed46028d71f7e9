use std::fs;

use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

// `chunkcp` with no args should exit with a non-zero code.
#[test]
fn cli_no_args() {
    Command::cargo_bin("chunkcp").unwrap().assert().failure();
}

#[test]
fn cli_version() {
    Command::cargo_bin("chunkcp")
        .unwrap()
        .arg("-V")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_copies_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let src = temp_dir.path().join("in.txt");
    let dst = temp_dir.path().join("out.txt");
    let data = "the quick brown fox jumps over the lazy dog\n".repeat(500);
    fs::write(&src, &data).unwrap();

    Command::cargo_bin("chunkcp")
        .unwrap()
        .args(["--workers", "3", "--chunk-size", "100"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stderr(contains("Copied 22000 bytes in 220 chunks"));
    assert_eq!(fs::read_to_string(&dst).unwrap(), data);
}

#[test]
fn cli_reads_config_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let src = temp_dir.path().join("in.bin");
    let dst = temp_dir.path().join("out.bin");
    let config = temp_dir.path().join("pool.json");
    fs::write(&src, vec![9_u8; 1000]).unwrap();
    fs::write(&config, r#"{"workers": 2, "intake_capacity": 1}"#).unwrap();

    Command::cargo_bin("chunkcp")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stderr(contains("with 2 workers"));
    assert_eq!(fs::read(&dst).unwrap(), vec![9_u8; 1000]);
}

#[test]
fn cli_rejects_zero_workers() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let src = temp_dir.path().join("in.txt");
    fs::write(&src, "data").unwrap();

    Command::cargo_bin("chunkcp")
        .unwrap()
        .args(["--workers", "0"])
        .arg(&src)
        .arg(temp_dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(contains("Invalid worker count 0"));
}

#[test]
fn cli_missing_source() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    Command::cargo_bin("chunkcp")
        .unwrap()
        .arg(temp_dir.path().join("nope"))
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("IO error"));
}
