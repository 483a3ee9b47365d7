//! Manifest-relative paths
//!
//! Manifest entries name files relative to the bundle root using forward
//! slashes regardless of platform. [`RelativePath`] keeps that form
//! internally and converts to a native path only at I/O boundaries.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A `/`-separated path relative to a bundle or destination root.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped.
/// `..` segments are preserved: manifests written by installers may point
/// outside the module root (for example at installed scripts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// Create a relative path from manifest text.
    pub fn new(path: impl AsRef<str>) -> Self {
        let replaced = path.as_ref().replace('\\', "/");
        let inner = replaced
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self { inner }
    }

    /// Express `path` relative to `root`, or `None` if it lies outside it.
    pub fn from_native(root: &Path, path: &Path) -> Option<Self> {
        let stripped = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
                Component::ParentDir => segments.push("..".to_string()),
                Component::CurDir => {}
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(Self {
            inner: segments.join("/"),
        })
    }

    /// The `/`-separated text, as written into a manifest.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Resolve against `root` for I/O.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for segment in self.segments() {
            native.push(segment);
        }
        native
    }

    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            Self::new(segment)
        } else {
            Self::new(format!("{}/{}", self.inner, segment))
        }
    }

    pub fn parent(&self) -> Option<Self> {
        self.inner.rfind('/').map(|idx| Self {
            inner: self.inner[..idx].to_string(),
        })
    }

    /// Last segment.
    pub fn file_name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or_default()
    }

    /// First segment, i.e. the top-level entry of the tree.
    pub fn first_segment(&self) -> &str {
        self.inner.split('/').next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// True if this path lies strictly below the directory `dir`.
    pub fn is_under(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        self.inner.len() > dir.len()
            && self.inner.starts_with(dir)
            && self.inner.as_bytes()[dir.len()] == b'/'
    }

    /// The remainder of this path below `dir`, if it lies under it.
    pub fn strip_dir(&self, dir: &str) -> Option<&str> {
        if self.is_under(dir) {
            Some(&self.inner[dir.trim_end_matches('/').len() + 1..])
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
