use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn plotboard_cmd() -> Command {
    Command::cargo_bin("plotboard").expect("binary exists")
}

#[test]
fn help_prints_usage() {
    plotboard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Live vector-graphics viewer device",
        ));
}

#[test]
fn no_flags_prints_usage_summary() {
    plotboard_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("plotboard --demo"));
}

#[test]
fn demo_emits_svg_at_the_requested_size() {
    plotboard_cmd()
        .args(["--demo", "--width", "400", "--height", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<svg"))
        .stdout(predicate::str::contains("width=\"400\" height=\"300\""))
        .stdout(predicate::str::contains("<line"));
}

#[test]
fn show_config_reflects_file_and_overrides() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 8288").unwrap();

    plotboard_cmd()
        .args(["--show-config", "--width", "640"])
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\": 8288"))
        .stdout(predicate::str::contains("\"default_width\": 640"));
}

#[test]
fn malformed_config_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport =").unwrap();

    plotboard_cmd()
        .arg("--show-config")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}
