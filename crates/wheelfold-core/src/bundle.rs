//! Staging bundles
//!
//! A bundle is the unpacked install tree one build produced for one
//! interpreter: the module tree at its root, optional `scripts/` and `data/`
//! subtrees, and exactly one `*.dist-info/` metadata directory holding the
//! manifest and the descriptor.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::record::RECORD;
use crate::wheel::WHEEL;
use crate::{Error, Result};

const DIST_INFO_SUFFIX: &str = ".dist-info";

/// Subtrees copied into the destination once, by the first variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtree {
    Scripts,
    Data,
}

impl Subtree {
    pub const ALL: [Subtree; 2] = [Subtree::Scripts, Subtree::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opened staging bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    root: PathBuf,
    dist_info_name: String,
}

impl Bundle {
    /// Open the bundle at `root`.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] if `root`, its metadata directory, the manifest
    ///   or the descriptor is missing;
    /// * [`Error::UnrecognizedArtifact`] if there are several metadata
    ///   directories or the only one carries the placeholder `UNKNOWN` name.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotFound {
                path: root.to_path_buf(),
            });
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(root).map_err(|e| wheelfold_fs::Error::io(root, e))? {
            let entry = entry.map_err(|e| wheelfold_fs::Error::io(root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(DIST_INFO_SUFFIX) && entry.path().is_dir() {
                names.push(name);
            }
        }
        names.sort();

        let dist_info_name = match names.len() {
            0 => {
                return Err(Error::NotFound {
                    path: root.join(format!("*{DIST_INFO_SUFFIX}")),
                });
            }
            1 => names.remove(0),
            _ => {
                return Err(Error::unrecognized(
                    root.display().to_string(),
                    format!("multiple metadata directories: {}", names.join(", ")),
                ));
            }
        };

        if dist_info_name.starts_with("UNKNOWN-") {
            return Err(Error::unrecognized(
                dist_info_name,
                "placeholder distribution name; does pyproject.toml specify a build-backend?",
            ));
        }

        let bundle = Self {
            root: root.to_path_buf(),
            dist_info_name,
        };
        for required in [bundle.record_path(), bundle.wheel_path()] {
            if !required.is_file() {
                return Err(Error::NotFound { path: required });
            }
        }
        Ok(bundle)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the metadata directory, e.g. `foo-1.0.dist-info`.
    pub fn dist_info_name(&self) -> &str {
        &self.dist_info_name
    }

    /// Distribution name as spelled in the metadata directory name.
    pub fn distribution(&self) -> &str {
        let stem = self
            .dist_info_name
            .strip_suffix(DIST_INFO_SUFFIX)
            .unwrap_or(&self.dist_info_name);
        stem.split_once('-').map_or(stem, |(name, _)| name)
    }

    pub fn dist_info(&self) -> PathBuf {
        self.root.join(&self.dist_info_name)
    }

    pub fn record_path(&self) -> PathBuf {
        self.dist_info().join(RECORD)
    }

    pub fn wheel_path(&self) -> PathBuf {
        self.dist_info().join(WHEEL)
    }

    pub fn subtree(&self, subtree: Subtree) -> PathBuf {
        self.root.join(subtree.as_str())
    }
}
