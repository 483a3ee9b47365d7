//! [`TestBundle`] builder for staging-bundle test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use wheelfold_fs::{FileDigest, HashAlgorithm};

/// The sha256 manifest line for `path` holding `content`, newline-terminated.
pub fn record_line(path: &str, content: impl AsRef<[u8]>) -> String {
    let digest = FileDigest::of_bytes(HashAlgorithm::Sha256, content.as_ref());
    format!("{path},{},{}\n", digest.hash_field(), digest.size)
}

/// Read `rel` below `root` as text.
///
/// # Panics
/// Panics if the file cannot be read.
pub fn read(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
}

/// A staging bundle described in memory and written on demand.
///
/// # Example
///
/// ```rust,no_run
/// use wheelfold_test_utils::TestBundle;
///
/// let temp = tempfile::tempdir().unwrap();
/// let staging = TestBundle::new("foo-1.0")
///     .file("foo/__init__.py", "")
///     .file("foo/_ext.cpython-311-x86_64-linux-gnu.so", "elf")
///     .metadata("LICENSE", "MIT")
///     .tag("cp311-cp311-linux_x86_64")
///     .write(&temp.path().join("py311"));
/// ```
#[derive(Debug, Clone)]
pub struct TestBundle {
    dist_info: String,
    files: Vec<(String, Vec<u8>)>,
    tags: Vec<String>,
    unrecorded: Vec<String>,
}

impl TestBundle {
    /// A bundle for `name_version` (e.g. `foo-1.0`); its metadata directory is
    /// `foo-1.0.dist-info`.
    pub fn new(name_version: &str) -> Self {
        Self {
            dist_info: format!("{name_version}.dist-info"),
            files: Vec::new(),
            tags: Vec::new(),
            unrecorded: Vec::new(),
        }
    }

    pub fn dist_info(&self) -> &str {
        &self.dist_info
    }

    /// Add a file at `rel` below the bundle root.
    pub fn file(mut self, rel: &str, content: impl AsRef<[u8]>) -> Self {
        self.files.push((rel.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Add a file below the metadata directory.
    pub fn metadata(self, rel: &str, content: impl AsRef<[u8]>) -> Self {
        let path = format!("{}/{rel}", self.dist_info);
        self.file(&path, content)
    }

    /// Add a `Tag:` line to the descriptor.
    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Leave the most recently added file out of the manifest.
    pub fn unrecorded(mut self) -> Self {
        if let Some((rel, _)) = self.files.last() {
            self.unrecorded.push(rel.clone());
        }
        self
    }

    /// Descriptor text as written to `WHEEL`.
    pub fn wheel_text(&self) -> String {
        let mut text = String::from("Wheel-Version: 1.0\nGenerator: wheelfold-test\nRoot-Is-Purelib: false\n");
        for tag in &self.tags {
            text.push_str(&format!("Tag: {tag}\n"));
        }
        text
    }

    /// Manifest text as written to `RECORD`: one sha256 line per file in
    /// insertion order, then the descriptor, then the manifest itself.
    pub fn record_text(&self) -> String {
        let mut text = String::new();
        for (rel, content) in &self.files {
            if !self.unrecorded.contains(rel) {
                text.push_str(&record_line(rel, content));
            }
        }
        text.push_str(&record_line(&format!("{}/WHEEL", self.dist_info), self.wheel_text()));
        text.push_str(&format!("{}/RECORD,,\n", self.dist_info));
        text
    }

    /// Write the bundle to `root`, creating it. Returns `root`.
    ///
    /// # Panics
    /// Panics on any I/O failure.
    pub fn write(&self, root: &Path) -> PathBuf {
        for (rel, content) in &self.files {
            write_file(&root.join(rel), content);
        }
        let dist_info = root.join(&self.dist_info);
        write_file(&dist_info.join("WHEEL"), self.wheel_text().as_bytes());
        write_file(&dist_info.join("RECORD"), self.record_text().as_bytes());
        root.to_path_buf()
    }
}

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
}
