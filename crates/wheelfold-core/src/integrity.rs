//! Post-merge manifest fix-up
//!
//! Merging rewrites files inside the metadata directory (the descriptor, the
//! manifest itself) after their digests were recorded by the originating
//! build. This pass recomputes those entries. Entries outside the metadata
//! directory were not touched by the merge and are left byte-identical.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use wheelfold_fs::{HashAlgorithm, RelativePath, compute_file_digest, tree};

use crate::record::{RECORD, RECORD_SIGNATURES, Record, RecordEntry};
use crate::{Error, Result};

/// What a fix-up pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixReport {
    /// Entries whose digest or size changed
    pub updated: Vec<RelativePath>,
    /// Metadata files that had no entry and were appended
    pub added: Vec<RelativePath>,
    /// Entries referring to metadata files that no longer exist
    pub missing: Vec<RelativePath>,
}

impl FixReport {
    pub fn is_clean(&self) -> bool {
        self.updated.is_empty() && self.added.is_empty()
    }
}

fn is_exempt(dist_info: &str, path: &RelativePath) -> bool {
    path.strip_dir(dist_info)
        .is_some_and(|rest| rest == RECORD || RECORD_SIGNATURES.contains(&rest))
}

/// The algorithm most entries of the manifest already use.
pub fn dominant_algorithm(entries: &[RecordEntry]) -> Option<HashAlgorithm> {
    let mut counts: HashMap<HashAlgorithm, usize> = HashMap::new();
    for entry in entries {
        if let Some(hash) = &entry.hash
            && let Ok(algorithm) = hash.algorithm.parse::<HashAlgorithm>()
        {
            *counts.entry(algorithm).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(algorithm, count)| (*count, std::cmp::Reverse(*algorithm as u8)))
        .map(|(algorithm, _)| algorithm)
}

fn digest_entry(root: &Path, path: &str, algorithm: HashAlgorithm) -> Result<RecordEntry> {
    let native = RelativePath::new(path).to_native(root);
    let digest = compute_file_digest(&native, algorithm).map_err(|source| {
        Error::IntegrityRecompute {
            path: native.clone(),
            source,
        }
    })?;
    Ok(RecordEntry::with_digest(path, &digest))
}

/// Recompute the manifest entries of the metadata directory `dist_info`.
///
/// Equivalent to [`fix_merged_record_with`] with `sha256` as the fallback
/// algorithm for manifests that carry no digests at all.
pub fn fix_merged_record(dist_info: &Path) -> Result<FixReport> {
    fix_merged_record_with(dist_info, HashAlgorithm::default())
}

/// Recompute the manifest entries of the metadata directory `dist_info`.
///
/// * hashed entries inside `dist_info` are rehashed with their own algorithm;
/// * entries with an empty hash field stay empty;
/// * entries whose file vanished are left as they are;
/// * metadata files with no entry (other than the manifest and its
///   signatures) are appended using the manifest's dominant algorithm, or
///   `fallback` when it has none.
///
/// # Errors
///
/// [`Error::NotFound`] if the manifest is missing,
/// [`Error::IntegrityRecompute`] if a metadata file cannot be hashed.
pub fn fix_merged_record_with(dist_info: &Path, fallback: HashAlgorithm) -> Result<FixReport> {
    let name = dist_info
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::NotFound {
            path: dist_info.to_path_buf(),
        })?;
    let root = dist_info.parent().unwrap_or_else(|| Path::new(""));

    let mut record = Record::load(&dist_info.join(RECORD))?;
    let entries = record.entries()?;
    let algorithm = dominant_algorithm(&entries).unwrap_or(fallback);

    let mut report = FixReport::default();
    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(record.lines().len());

    for line in record.lines() {
        let Some(entry) = RecordEntry::parse(line) else {
            lines.push(line.clone());
            continue;
        };
        let rel = entry.relative_path();
        if !rel.is_under(&name) {
            lines.push(line.clone());
            continue;
        }
        seen.insert(rel.clone());

        let Some(hash) = &entry.hash else {
            lines.push(line.clone());
            continue;
        };
        if is_exempt(&name, &rel) {
            lines.push(line.clone());
            continue;
        }
        if std::fs::symlink_metadata(rel.to_native(root)).is_err() {
            tracing::debug!(path = %rel, "metadata entry refers to a missing file, leaving it");
            report.missing.push(rel);
            lines.push(line.clone());
            continue;
        }

        let entry_algorithm: HashAlgorithm = hash.algorithm.parse()?;
        let fixed = digest_entry(root, &entry.path, entry_algorithm)?.to_line();
        if fixed != *line {
            tracing::debug!(path = %rel, "recomputed metadata digest");
            report.updated.push(rel);
        }
        lines.push(fixed);
    }

    for file in tree::list_files(dist_info)? {
        let rel = RelativePath::new(&name).join(file.as_str());
        if seen.contains(&rel) || is_exempt(&name, &rel) {
            continue;
        }
        tracing::debug!(path = %rel, "adding missing metadata entry");
        lines.push(digest_entry(root, rel.as_str(), algorithm)?.to_line());
        report.added.push(rel);
    }

    record.set_lines(lines);
    record.save()?;
    Ok(report)
}

/// Metadata entries whose recorded digest or size no longer matches the file.
///
/// Entries without a digest, and the manifest's own entry, are skipped.
pub fn verify_metadata_entries(dist_info: &Path) -> Result<Vec<RelativePath>> {
    let name = dist_info
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let root = dist_info.parent().unwrap_or_else(|| Path::new(""));
    let record = Record::load(&dist_info.join(RECORD))?;

    let mut mismatched = Vec::new();
    for entry in record.entries()? {
        let rel = entry.relative_path();
        let Some(hash) = &entry.hash else { continue };
        if !rel.is_under(&name) || is_exempt(&name, &rel) {
            continue;
        }
        let algorithm: HashAlgorithm = hash.algorithm.parse()?;
        let native = rel.to_native(root);
        match compute_file_digest(&native, algorithm) {
            Ok(digest) if digest.hex == hash.hex && Some(digest.size) == entry.size => {}
            Ok(_) => mismatched.push(rel),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => mismatched.push(rel),
            Err(source) => return Err(Error::IntegrityRecompute { path: native, source }),
        }
    }
    Ok(mismatched)
}
