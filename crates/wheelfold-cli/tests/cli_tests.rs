//! End-to-end tests that invoke the compiled `wheelfold` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wheelfold_test_utils::{TestBundle, read};

fn wheelfold() -> Command {
    Command::cargo_bin("wheelfold").unwrap()
}

fn variant(digits: &str) -> TestBundle {
    TestBundle::new("foo-1.0")
        .file("foo/__init__.py", "")
        .file(&format!("foo/_ext.cpython-{digits}-x86_64-linux-gnu.so"), digits)
        .file("scripts/foo", "#!python\n")
        .metadata("METADATA", "Metadata-Version: 2.1\nName: foo\n")
        .metadata("COPYING", "GPL\n")
        .metadata("licenses/COPYING", "GPL\n")
        .tag(&format!("cp{digits}-cp{digits}-linux_x86_64"))
}

fn fold_two(temp: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
    let py311 = variant("311").write(&temp.join("py311"));
    let py312 = variant("312").write(&temp.join("py312"));
    wheelfold()
        .env_remove("RUST_LOG")
        .arg("fold")
        .arg("--dest")
        .arg(temp.join("dest"))
        .args(extra)
        .arg(format!("python3.11={}", py311.display()))
        .arg(format!("python3.12={}", py312.display()))
        .assert()
}

#[test]
fn help_lists_commands() {
    wheelfold()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fold"))
        .stdout(predicate::str::contains("check-artifacts"));
}

#[test]
fn fold_builds_a_verifiable_tree() {
    let temp = TempDir::new().unwrap();

    fold_two(temp.path(), &[])
        .success()
        .stdout(predicate::str::contains("Folded"))
        .stdout(predicate::str::contains("cpython3.12"));

    let dest = temp.path().join("dest");
    assert!(dest.join("foo/_ext.cpython-311-x86_64-linux-gnu.so").is_file());
    assert!(dest.join("foo/_ext.cpython-312-x86_64-linux-gnu.so").is_file());
    assert!(!dest.join("foo-1.0.dist-info/licenses").exists());
    let wheel = read(&dest, "foo-1.0.dist-info/WHEEL");
    assert!(wheel.contains("Tag: cp311-cp311-linux_x86_64"));
    assert!(wheel.contains("Tag: cp312-cp312-linux_x86_64"));

    wheelfold()
        .arg("verify")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn fold_json_summary() {
    let temp = TempDir::new().unwrap();

    let output = fold_two(temp.path(), &["--json"]).success().get_output().stdout.clone();
    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(summary["variants"].as_array().unwrap().len(), 2);
    assert_eq!(summary["variants"][0]["dropped"][0], "foo-1.0.dist-info/licenses/COPYING");
    assert_eq!(summary["fixed"]["updated"][0], "foo-1.0.dist-info/WHEEL");
}

#[test]
fn fold_reads_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("wheelfold.toml");
    fs::write(&config, "license_policy = \"strip\"\n").unwrap();

    fold_two(temp.path(), &["--config", config.to_str().unwrap()]).success();

    let dest = temp.path().join("dest");
    assert!(!dest.join("foo-1.0.dist-info/COPYING").exists());
    assert!(!read(&dest, "foo-1.0.dist-info/RECORD").contains("COPYING"));
}

#[test]
fn fold_into_non_empty_destination_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("dest")).unwrap();
    fs::write(temp.path().join("dest/stray"), "x").unwrap();

    fold_two(temp.path(), &[])
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn fold_rejects_unknown_interpreter() {
    wheelfold()
        .args(["fold", "--dest", "out", "ruby3.2=build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown interpreter"));
}

#[test]
fn diff_prints_missing_lines() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    fs::write(&a, "abc\ndef\n").unwrap();
    fs::write(&b, "abc\nghi\n").unwrap();

    wheelfold()
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout("def\n");
}

#[test]
fn fix_then_verify_tampered_tree() {
    let temp = TempDir::new().unwrap();
    fold_two(temp.path(), &[]).success();
    let dest = temp.path().join("dest");
    fs::write(dest.join("foo-1.0.dist-info/METADATA"), "Name: changed\n").unwrap();

    wheelfold()
        .arg("verify")
        .arg(&dest)
        .assert()
        .failure()
        .stdout(predicate::str::contains("foo-1.0.dist-info/METADATA"));

    wheelfold()
        .arg("fix")
        .arg(dest.join("foo-1.0.dist-info"))
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    wheelfold().arg("verify").arg(&dest).assert().success();
}

#[test]
fn check_artifacts_rejects_placeholder_wheel() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("foo-1.0-cp311-cp311-linux_x86_64.whl"), "").unwrap();

    wheelfold()
        .arg("check-artifacts")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cp311-cp311-linux_x86_64"));

    fs::write(temp.path().join("UNKNOWN-0.0.0-py3-none-any.whl"), "").unwrap();
    wheelfold()
        .arg("check-artifacts")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("build-backend"));
}

#[test]
fn failed_fold_discards_the_destination() {
    let temp = TempDir::new().unwrap();
    let good = variant("311").write(&temp.path().join("py311"));
    let placeholder = TestBundle::new("UNKNOWN-0.0.0")
        .file("UNKNOWN/__init__.py", "")
        .tag("py3-none-any")
        .write(&temp.path().join("py312"));
    let dest = temp.path().join("dest");

    wheelfold()
        .arg("fold")
        .arg("--dest")
        .arg(&dest)
        .arg(format!("python3.11={}", good.display()))
        .arg(format!("python3.12={}", placeholder.display()))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("build-backend"));

    assert!(!dest.exists());
}

#[test]
fn failed_fold_leaves_existing_destination_empty() {
    let temp = TempDir::new().unwrap();
    let good = variant("311").write(&temp.path().join("py311"));
    let dest = temp.path().join("dest");
    fs::create_dir(&dest).unwrap();

    wheelfold()
        .arg("fold")
        .arg("--dest")
        .arg(&dest)
        .arg(format!("python3.11={}", good.display()))
        .arg(format!("python3.12={}", temp.path().join("missing").display()))
        .assert()
        .failure()
        .code(1);

    assert!(dest.is_dir());
    assert!(fs::read_dir(&dest).unwrap().next().is_none());
}

#[test]
fn second_scripts_subtree_is_reported_on_stderr() {
    let temp = TempDir::new().unwrap();
    let py311 = variant("311")
        .file("scripts/foo-tool", "#!python3.11\n")
        .write(&temp.path().join("py311"));
    let py312 = variant("312")
        .file("scripts/foo-tool", "#!python3.12\n")
        .write(&temp.path().join("py312"));
    let dest = temp.path().join("dest");

    wheelfold()
        .env_remove("RUST_LOG")
        .arg("fold")
        .arg("--dest")
        .arg(&dest)
        .arg(format!("python3.11={}", py311.display()))
        .arg(format!("python3.12={}", py312.display()))
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("scripts"));

    assert_eq!(read(&dest, "scripts/foo-tool"), "#!python3.11\n");
}

#[test]
fn identical_scripts_subtree_is_still_reported() {
    let temp = TempDir::new().unwrap();

    fold_two(temp.path(), &[])
        .success()
        .stderr(predicate::str::contains("already exists"));
}
