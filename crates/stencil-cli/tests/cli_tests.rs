//! End-to-end tests of the `stencil` binary against a temporary project.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("types")).unwrap();
    fs::create_dir_all(root.join("interfaces")).unwrap();
    fs::create_dir_all(root.join("modules/Meter")).unwrap();

    fs::write(
        root.join("types/power.yaml"),
        "types:\n  Reading:\n    type: object\n    properties:\n      watts:\n        type: number\n",
    )
    .unwrap();
    fs::write(
        root.join("interfaces/powermeter.yaml"),
        "description: Reports power\nvars:\n  reading:\n    type: object\n    $ref: /power#/Reading\n",
    )
    .unwrap();
    fs::write(
        root.join("modules/Meter/manifest.yaml"),
        "description: Meter driver\nprovides:\n  main:\n    interface: powermeter\n",
    )
    .unwrap();
    dir
}

fn stencil(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("stencil");
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(root)
        .arg("--root")
        .arg(root);
    cmd
}

#[test]
fn help_lists_the_commands() {
    cargo_bin_cmd!("stencil")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("module"))
        .stdout(predicate::str::contains("interface"))
        .stdout(predicate::str::contains("types"));
}

#[test]
fn version_flag() {
    cargo_bin_cmd!("stencil")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn module_create_then_update_keeps_custom_code() {
    let dir = project();
    let root = dir.path();

    stencil(root)
        .args(["module", "create", "Meter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let header = root.join("modules/Meter/Meter.hpp");
    let content = fs::read_to_string(&header).unwrap();
    let marker = content
        .lines()
        .find(|l| l.contains("stencil@"))
        .unwrap()
        .to_string();
    let edited = content.replacen(&format!("{marker}\n"), &format!("{marker}\n#include <map>\n"), 1);
    fs::write(&header, edited).unwrap();

    stencil(root)
        .args(["module", "update", "Meter", "--force"])
        .assert()
        .success();

    assert!(fs::read_to_string(&header).unwrap().contains("#include <map>\n"));
}

#[test]
fn module_create_twice_is_a_user_error() {
    let dir = project();
    stencil(dir.path()).args(["module", "create", "Meter"]).assert().success();

    stencil(dir.path())
        .args(["module", "create", "Meter"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unknown_module_exits_with_not_found() {
    let dir = project();
    stencil(dir.path())
        .args(["module", "create", "Ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Ghost"));
}

#[test]
fn only_which_lists_artifact_labels() {
    let dir = project();
    stencil(dir.path())
        .args(["module", "create", "Meter", "--only", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cmakelists"))
        .stdout(predicate::str::contains("main.hpp"));
}

#[test]
fn diff_writes_nothing() {
    let dir = project();
    stencil(dir.path())
        .args(["module", "create", "Meter", "--diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ b/modules/Meter/CMakeLists.txt"));

    assert!(!dir.path().join("modules/Meter/CMakeLists.txt").exists());
}

#[test]
fn interface_and_type_headers() {
    let dir = project();
    let root = dir.path();

    stencil(root)
        .args(["interface", "generate-headers"])
        .assert()
        .success();
    stencil(root)
        .args(["types", "generate-headers", "power"])
        .assert()
        .success();

    let generated = root.join("generated/include/generated");
    assert!(generated.join("powermeter/Implementation.hpp").exists());
    assert!(generated.join("powermeter/Interface.hpp").exists());
    let types = fs::read_to_string(generated.join("types/power.hpp")).unwrap();
    assert!(types.contains("struct Reading {"));
}

#[test]
fn json_output_is_machine_readable() {
    let dir = project();
    let output = stencil(dir.path())
        .args(["--output-format", "json", "types", "generate-headers"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["artifacts"][0]["action"], "created");
    assert_eq!(report["artifacts"][0]["label"], "power");
}

#[test]
fn generate_uuids_prints_count_lines() {
    cargo_bin_cmd!("stencil")
        .args(["helpers", "generate-uuids", "3"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^([0-9a-f-]{36}\n){3}$").unwrap());
}

#[test]
fn generate_uuids_rejects_zero() {
    cargo_bin_cmd!("stencil")
        .args(["helpers", "generate-uuids", "0"])
        .assert()
        .code(2);
}

#[test]
fn missing_template_directory_is_rejected() {
    let dir = project();
    stencil(dir.path())
        .args(["--templates", "no-such-dir", "module", "create", "Meter"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-dir"));
}

#[test]
fn local_config_sets_the_output_format() {
    let dir = project();
    fs::write(dir.path().join(".stencil.toml"), "[output]\nformat = \"json\"\n").unwrap();

    stencil(dir.path())
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout("json\n");
}

#[test]
fn completions_for_bash() {
    cargo_bin_cmd!("stencil")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}
