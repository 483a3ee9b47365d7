use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wheelfold_core::{Destination, Error, FoldOptions, FoldState, Interpreter};
use wheelfold_test_utils::{TestBundle, read};

fn variant(digits: &str) -> TestBundle {
    TestBundle::new("foo-1.0")
        .file("foo/__init__.py", "")
        .file(&format!("foo/_ext.cpython-{digits}-x86_64-linux-gnu.so"), digits)
        .metadata("METADATA", "Metadata-Version: 2.1\nName: foo\n")
        .metadata("licenses/LICENSE", "MIT\n")
        .metadata("license_files/LICENSE", "MIT\n")
        .tag(&format!("cp{digits}-cp{digits}-linux_x86_64"))
}

fn interp(s: &str) -> Interpreter {
    s.parse().unwrap()
}

#[test]
fn fold_two_variants_and_finalize() {
    let temp = TempDir::new().unwrap();
    let py311 = variant("311").write(&temp.path().join("py311"));
    let py312 = variant("312").write(&temp.path().join("py312"));

    let mut dest = Destination::create(&temp.path().join("dest"), FoldOptions::default()).unwrap();
    dest.fold(&py311, &interp("python3.11")).unwrap();
    dest.fold(&py312, &interp("python3.12")).unwrap();
    assert_eq!(
        dest.state(),
        &FoldState::Partial {
            variants: vec![interp("python3.11"), interp("python3.12")]
        }
    );

    let fixed = dest.finalize().unwrap();

    assert_eq!(fixed.variants().len(), 2);
    assert!(fixed.verify().unwrap().is_empty());
    assert_eq!(
        fixed.fix_report().updated,
        vec![wheelfold_fs::RelativePath::new("foo-1.0.dist-info/WHEEL")]
    );

    let root = fixed.root();
    let record = read(root, "foo-1.0.dist-info/RECORD");
    for line in record.lines() {
        let path = line.split(',').next().unwrap();
        assert!(root.join(path).exists(), "manifest lists absent file {path}");
    }
    assert!(root.join("foo-1.0.dist-info/LICENSE").is_file());
}

#[test]
fn verify_reports_tampered_metadata() {
    let temp = TempDir::new().unwrap();
    let py311 = variant("311").write(&temp.path().join("py311"));

    let mut dest = Destination::create(&temp.path().join("dest"), FoldOptions::default()).unwrap();
    dest.fold(&py311, &interp("python3.11")).unwrap();
    let fixed = dest.finalize().unwrap();

    fs::write(fixed.dist_info().join("METADATA"), "Name: tampered\n").unwrap();
    let mismatched = fixed.verify().unwrap();
    assert_eq!(mismatched.len(), 1);
    assert_eq!(mismatched[0].as_str(), "foo-1.0.dist-info/METADATA");
}

#[test]
fn failed_fold_leaves_state_unchanged() {
    let temp = TempDir::new().unwrap();
    let mut dest = Destination::create(&temp.path().join("dest"), FoldOptions::default()).unwrap();

    let err = dest
        .fold(&temp.path().join("missing"), &interp("python3.11"))
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(dest.state(), &FoldState::Empty);
}

#[test]
fn fold_all_checks_every_bundle_before_copying() {
    let temp = TempDir::new().unwrap();
    let good = variant("311").write(&temp.path().join("py311"));
    let placeholder = TestBundle::new("UNKNOWN-0.0.0")
        .file("UNKNOWN/__init__.py", "")
        .tag("py3-none-any")
        .write(&temp.path().join("py312"));
    let root = temp.path().join("dest");

    let mut dest = Destination::create(&root, FoldOptions::default()).unwrap();
    let variants: Vec<(PathBuf, Interpreter)> = vec![
        (good, interp("python3.11")),
        (placeholder, interp("python3.12")),
    ];
    let err = dest.fold_all(&variants).unwrap_err();

    assert!(matches!(err, Error::UnrecognizedArtifact { .. }));
    assert_eq!(dest.state(), &FoldState::Empty);
    assert!(fs::read_dir(&root).unwrap().next().is_none());
}

#[test]
fn fold_all_rejects_mixed_packages_before_copying() {
    let temp = TempDir::new().unwrap();
    let foo = variant("311").write(&temp.path().join("foo"));
    let bar = TestBundle::new("bar-2.0")
        .file("bar.py", "")
        .tag("py3-none-any")
        .write(&temp.path().join("bar"));
    let root = temp.path().join("dest");

    let mut dest = Destination::create(&root, FoldOptions::default()).unwrap();
    let err = dest
        .fold_all(&[(foo, interp("python3.11")), (bar, interp("python3.11"))])
        .unwrap_err();

    assert!(matches!(err, Error::UnrecognizedArtifact { .. }));
    assert!(fs::read_dir(&root).unwrap().next().is_none());
}

#[test]
fn fold_all_folds_in_order() {
    let temp = TempDir::new().unwrap();
    let py311 = variant("311").write(&temp.path().join("py311"));
    let py312 = variant("312").write(&temp.path().join("py312"));

    let mut dest = Destination::create(&temp.path().join("dest"), FoldOptions::default()).unwrap();
    let reports = dest
        .fold_all(&[(py311, interp("python3.11")), (py312, interp("python3.12"))])
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].tags_added, 1);
    assert_eq!(reports[1].tags_added, 1);
    assert!(dest.finalize().unwrap().verify().unwrap().is_empty());
}
