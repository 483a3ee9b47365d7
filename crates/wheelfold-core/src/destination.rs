//! The combined destination tree
//!
//! A destination starts empty, accumulates one fold per variant and is
//! finalized exactly once. Finalizing consumes it and yields a
//! [`FixedDestination`], which has no fold operation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::bundle::Bundle;
use crate::config::FoldOptions;
use crate::integrity::{FixReport, fix_merged_record_with, verify_metadata_entries};
use crate::interpreter::Interpreter;
use crate::share::{ShareReport, existing_dist_info, share_files};
use crate::{Error, Result};
use wheelfold_fs::{RelativePath, tree};

/// Fold progress of a [`Destination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldState {
    Empty,
    /// Interpreters folded so far, in fold order
    Partial { variants: Vec<Interpreter> },
}

impl fmt::Display for FoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("EMPTY"),
            Self::Partial { variants } => write!(f, "PARTIAL({})", variants.len()),
        }
    }
}

/// A destination tree still accepting folds.
#[derive(Debug)]
pub struct Destination {
    root: PathBuf,
    options: FoldOptions,
    state: FoldState,
    dist_info: Option<String>,
}

impl Destination {
    /// Start a destination at `root`, which must be absent or empty.
    pub fn create(root: &Path, options: FoldOptions) -> Result<Self> {
        if root.exists() {
            if !root.is_dir() || !tree::is_empty_dir(root)? {
                return Err(Error::InvalidState {
                    state: "non-empty".to_string(),
                    operation: format!("create destination at {}", root.display()),
                });
            }
        } else {
            std::fs::create_dir_all(root).map_err(|e| wheelfold_fs::Error::io(root, e))?;
        }

        Ok(Self {
            root: root.to_path_buf(),
            options,
            state: FoldState::Empty,
            dist_info: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> &FoldState {
        &self.state
    }

    pub fn options(&self) -> &FoldOptions {
        &self.options
    }

    /// Fold the bundle at `staging`, built for `interpreter`.
    ///
    /// On error the destination may hold a partial copy of the bundle and
    /// should be discarded.
    pub fn fold(&mut self, staging: &Path, interpreter: &Interpreter) -> Result<ShareReport> {
        let report = share_files(staging, &self.root, interpreter, &self.options)?;
        self.dist_info = Some(report.dist_info.clone());

        match &mut self.state {
            FoldState::Empty => {
                self.state = FoldState::Partial {
                    variants: vec![*interpreter],
                };
            }
            FoldState::Partial { variants } => variants.push(*interpreter),
        }
        Ok(report)
    }

    /// Fold every `(staging, interpreter)` pair in order.
    ///
    /// All bundles are opened first: a missing or unrecognized bundle, or one
    /// for a different package, fails the run before anything is copied.
    pub fn fold_all(&mut self, variants: &[(PathBuf, Interpreter)]) -> Result<Vec<ShareReport>> {
        let mut expected = match &self.dist_info {
            Some(name) => Some(name.clone()),
            None => existing_dist_info(&self.root)?,
        };
        for (staging, _) in variants {
            let bundle = Bundle::open(staging)?;
            match &expected {
                Some(name) if name != bundle.dist_info_name() => {
                    return Err(Error::unrecognized(
                        bundle.dist_info_name(),
                        format!("run already folds {name}"),
                    ));
                }
                Some(_) => {}
                None => expected = Some(bundle.dist_info_name().to_string()),
            }
        }

        variants
            .iter()
            .map(|(staging, interpreter)| self.fold(staging, interpreter))
            .collect()
    }

    /// Recompute the metadata entries of the combined manifest.
    pub fn finalize(self) -> Result<FixedDestination> {
        let variants = match self.state {
            FoldState::Empty => {
                return Err(Error::InvalidState {
                    state: FoldState::Empty.to_string(),
                    operation: "finalize".to_string(),
                });
            }
            FoldState::Partial { variants } => variants,
        };
        let dist_info = match self.dist_info {
            Some(name) => name,
            None => existing_dist_info(&self.root)?.ok_or_else(|| Error::NotFound {
                path: self.root.join("*.dist-info"),
            })?,
        };

        let fix_report =
            fix_merged_record_with(&self.root.join(&dist_info), self.options.default_algorithm)?;
        tracing::info!(
            root = %self.root.display(),
            variants = variants.len(),
            updated = fix_report.updated.len(),
            added = fix_report.added.len(),
            "finalized destination"
        );

        Ok(FixedDestination {
            root: self.root,
            dist_info,
            variants,
            fix_report,
        })
    }
}

/// A finalized destination. Read-only as far as folding is concerned.
#[derive(Debug)]
pub struct FixedDestination {
    root: PathBuf,
    dist_info: String,
    variants: Vec<Interpreter>,
    fix_report: FixReport,
}

impl FixedDestination {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dist_info(&self) -> PathBuf {
        self.root.join(&self.dist_info)
    }

    pub fn variants(&self) -> &[Interpreter] {
        &self.variants
    }

    pub fn fix_report(&self) -> &FixReport {
        &self.fix_report
    }

    /// Metadata entries that no longer match their files.
    pub fn verify(&self) -> Result<Vec<RelativePath>> {
        verify_metadata_entries(&self.dist_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_rejects_non_empty_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("stray"), "x").unwrap();
        let err = Destination::create(temp.path(), FoldOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn create_makes_missing_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("dest");
        let dest = Destination::create(&root, FoldOptions::default()).unwrap();
        assert!(root.is_dir());
        assert_eq!(dest.state(), &FoldState::Empty);
    }

    #[test]
    fn finalizing_empty_destination_fails() {
        let temp = TempDir::new().unwrap();
        let dest = Destination::create(temp.path(), FoldOptions::default()).unwrap();
        let err = dest.finalize().unwrap_err();
        assert_eq!(err.to_string(), "Cannot finalize a destination in state EMPTY");
    }

    #[test]
    fn state_display() {
        let py311: Interpreter = "python3.11".parse().unwrap();
        let state = FoldState::Partial {
            variants: vec![py311, py311],
        };
        assert_eq!(state.to_string(), "PARTIAL(2)");
    }
}
