//! Manifest (`RECORD`) diffing and merging
//!
//! A manifest is a line-oriented ledger of `path,algorithm=hex,size` entries.
//! Merges are append-only: lines already present verbatim are never written
//! twice, and nothing is reordered. Callers that replace a file must drop the
//! stale entry for its path before merging the new one in.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use wheelfold_fs::{FileDigest, RelativePath, io};

use crate::{Error, Result};

/// File name of the manifest inside a metadata directory.
pub const RECORD: &str = "RECORD";

/// Signature files that, like the manifest itself, carry no digest.
pub const RECORD_SIGNATURES: [&str; 2] = ["RECORD.jws", "RECORD.p7s"];

/// The `algorithm=hex` field of an entry, kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashField {
    pub algorithm: String,
    pub hex: String,
}

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    /// Path exactly as written in the manifest.
    pub path: String,
    pub hash: Option<HashField>,
    pub size: Option<u64>,
}

impl RecordEntry {
    /// Parse a manifest line, with or without its newline.
    ///
    /// Paths may themselves contain commas, so the line is split from the
    /// right. Returns `None` for lines that are not entries.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.rsplitn(3, ',');
        let size = parts.next()?;
        let hash = parts.next()?;
        let path = parts.next()?;
        if path.is_empty() {
            return None;
        }

        let hash = if hash.is_empty() {
            None
        } else {
            let (algorithm, hex) = hash.split_once('=')?;
            Some(HashField {
                algorithm: algorithm.to_string(),
                hex: hex.to_string(),
            })
        };
        let size = if size.is_empty() {
            None
        } else {
            Some(size.parse().ok()?)
        };

        Some(Self {
            path: path.to_string(),
            hash,
            size,
        })
    }

    /// Entry carrying a freshly computed digest.
    pub fn with_digest(path: impl Into<String>, digest: &FileDigest) -> Self {
        Self {
            path: path.into(),
            hash: Some(HashField {
                algorithm: digest.algorithm.to_string(),
                hex: digest.hex.clone(),
            }),
            size: Some(digest.size),
        }
    }

    /// Entry exempt from integrity checking (`path,,`).
    pub fn unhashed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: None,
            size: None,
        }
    }

    pub fn relative_path(&self) -> RelativePath {
        RelativePath::new(&self.path)
    }

    /// Serialized form, newline-terminated.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for RecordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", self.path)?;
        if let Some(hash) = &self.hash {
            write!(f, "{}={}", hash.algorithm, hash.hex)?;
        }
        f.write_str(",")?;
        if let Some(size) = self.size {
            write!(f, "{size}")?;
        }
        Ok(())
    }
}

fn lines_missing_from(source: Vec<String>, dest: &[String]) -> Vec<String> {
    let current: HashSet<&str> = dest.iter().map(String::as_str).collect();
    source
        .into_iter()
        .filter(|line| !current.contains(line.as_str()))
        .collect()
}

/// Lines of `a` whose exact text occurs nowhere in `b`, in `a`'s order.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if either file is missing.
pub fn missing_lines(a: &Path, b: &Path) -> Result<Vec<String>> {
    let dest = io::read_lines(b)?;
    let source = io::read_lines(a)?;
    Ok(lines_missing_from(source, &dest))
}

/// Append to `b` every line of `a` it does not already contain.
///
/// Returns the number of lines appended. `a` is left untouched; `b` is only
/// rewritten when something was appended.
pub fn merge_record(a: &Path, b: &Path) -> Result<usize> {
    let mut dest = io::read_lines(b)?;
    let missing = lines_missing_from(io::read_lines(a)?, &dest);
    if missing.is_empty() {
        return Ok(0);
    }

    let appended = missing.len();
    dest.extend(missing);
    io::write_lines(b, &dest)?;
    tracing::debug!(source = %a.display(), dest = %b.display(), appended, "merged manifest");
    Ok(appended)
}

/// A manifest file loaded for in-place editing.
#[derive(Debug, Clone)]
pub struct Record {
    path: PathBuf,
    lines: Vec<String>,
}

impl Record {
    /// Load a manifest, keeping every line verbatim.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            lines: io::read_lines(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace every line at once.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Parse every non-blank line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] for the first line that is not an
    /// entry.
    pub fn entries(&self) -> Result<Vec<RecordEntry>> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                RecordEntry::parse(line).ok_or_else(|| Error::MalformedRecord {
                    path: self.path.clone(),
                    line: idx + 1,
                    content: line.trim_end().to_string(),
                })
            })
            .collect()
    }

    /// The entry recorded for `path`, if any.
    pub fn find(&self, path: &RelativePath) -> Option<RecordEntry> {
        self.lines
            .iter()
            .filter_map(|line| RecordEntry::parse(line))
            .find(|entry| entry.relative_path() == *path)
    }

    pub fn contains_path(&self, path: &RelativePath) -> bool {
        self.find(path).is_some()
    }

    /// Keep only lines for which `keep` returns true. Lines that are not
    /// entries are always kept. Returns the number of lines removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&RecordEntry) -> bool) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| match RecordEntry::parse(line) {
            Some(entry) => keep(&entry),
            None => true,
        });
        before - self.lines.len()
    }

    /// Drop the entries for every path in `paths`.
    pub fn remove_paths(&mut self, paths: &HashSet<RelativePath>) -> usize {
        if paths.is_empty() {
            return 0;
        }
        self.retain(|entry| !paths.contains(&entry.relative_path()))
    }

    /// Point the entry for `from` at `to`, keeping its digest and size.
    ///
    /// Returns false when `from` has no entry.
    pub fn rename_path(&mut self, from: &RelativePath, to: &RelativePath) -> bool {
        for line in &mut self.lines {
            if let Some(mut entry) = RecordEntry::parse(line)
                && entry.relative_path() == *from
            {
                entry.path = to.to_string();
                *line = entry.to_line();
                return true;
            }
        }
        false
    }

    pub fn push(&mut self, entry: &RecordEntry) {
        self.lines.push(entry.to_line());
    }

    /// Persist atomically to the path it was loaded from.
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    /// Persist atomically to `path`, leaving the loaded file alone.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::write_lines(path, &self.lines)?;
        Ok(())
    }
}
