//! Share Decider: folding one variant bundle into the destination
//!
//! Each variant's files are copied into one combined tree. Interpreter
//! independent files collide harmlessly, compiled modules carry their own
//! interpreter tag and never collide, and `scripts/` and `data/` are taken
//! from the first variant only. The variant's manifest and descriptor are
//! merged into the combined ones.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use wheelfold_fs::{RelativePath, io, tree};

use crate::bundle::{Bundle, Subtree};
use crate::config::FoldOptions;
use crate::interpreter::{FileClass, Interpreter};
use crate::license::{LicenseConventions, plan_licenses};
use crate::record::{RECORD, Record, merge_record};
use crate::wheel::{WHEEL, merge_wheel, tags};
use crate::{Error, Result};

/// What a single fold did.
#[derive(Debug, Default)]
pub struct ShareReport {
    /// Metadata directory name of the folded bundle
    pub dist_info: String,
    /// Files copied into the destination, across every subtree
    pub copied: usize,
    pub shared: usize,
    pub variant_specific: usize,
    pub foreign: usize,
    /// License files removed from the bundle before folding
    pub dropped: Vec<RelativePath>,
    /// License files moved to their canonical flat name
    pub promoted: Vec<(RelativePath, RelativePath)>,
    /// Subtrees skipped because an earlier variant already provided them.
    /// Only ever [`Error::PolicyConflict`].
    pub conflicts: Vec<Error>,
    /// Manifest lines appended to the combined manifest
    pub record_lines_added: usize,
    /// `Tag:` lines appended to the combined descriptor
    pub tags_added: usize,
}

/// Name of the metadata directory already present in `destination`, if any.
pub(crate) fn existing_dist_info(destination: &Path) -> Result<Option<String>> {
    if !destination.is_dir() {
        return Ok(None);
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(destination).map_err(|e| wheelfold_fs::Error::io(destination, e))? {
        let entry = entry.map_err(|e| wheelfold_fs::Error::io(destination, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".dist-info") && entry.path().is_dir() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names.into_iter().next())
}

/// Fold the bundle at `staging`, built for `interpreter`, into `destination`.
///
/// The staging bundle is consumed: redundant license files are removed from
/// it and its manifest is rewritten to match what was folded.
///
/// # Errors
///
/// * [`Error::NotFound`] / [`Error::UnrecognizedArtifact`] from opening the
///   bundle;
/// * [`Error::UnrecognizedArtifact`] if `destination` already holds a
///   different package's metadata directory.
///
/// Policy conflicts are not errors; they are collected in the report.
pub fn share_files(
    staging: &Path,
    destination: &Path,
    interpreter: &Interpreter,
    options: &FoldOptions,
) -> Result<ShareReport> {
    let bundle = Bundle::open(staging)?;
    let name = bundle.dist_info_name().to_string();

    if let Some(existing) = existing_dist_info(destination)?
        && existing != name
    {
        return Err(Error::unrecognized(
            name,
            format!("destination already holds {existing}"),
        ));
    }

    let mut report = ShareReport {
        dist_info: name.clone(),
        ..Default::default()
    };
    let mut local = Record::load(&bundle.record_path())?;

    let conventions = LicenseConventions::new(&options.license_dirs);
    let plan = plan_licenses(&bundle.dist_info(), &conventions, options.license_policy)?;
    if !plan.is_empty() {
        plan.apply(staging, &mut local)?;
        report.dropped = plan.drop;
        report.promoted = plan.promote;
    }

    for subtree in Subtree::ALL {
        let src = bundle.subtree(subtree);
        if !src.exists() {
            continue;
        }
        let dst = destination.join(subtree.as_str());
        if dst.exists() {
            let identical = tree::trees_equal(&src, &dst)?;
            tracing::warn!(
                subtree = %subtree,
                path = %dst.display(),
                identical,
                "subtree already exists; skipping copy. Is the package being built twice?"
            );
            report.conflicts.push(Error::PolicyConflict {
                subtree: subtree.to_string(),
                path: dst,
            });
            let pruned = local.retain(|entry| !entry.relative_path().is_under(subtree.as_str()));
            tracing::debug!(subtree = %subtree, pruned, "pruned manifest lines of skipped subtree");
            continue;
        }
        report.copied += tree::copy_tree(&src, &dst)?.len();
    }

    let mut overwritten: HashSet<RelativePath> = HashSet::new();
    for rel in tree::list_files(staging)? {
        let top = rel.first_segment();
        if top == name || Subtree::ALL.iter().any(|s| s.as_str() == top) {
            continue;
        }
        match interpreter.classify(&rel) {
            FileClass::Shared => report.shared += 1,
            FileClass::VariantSpecific => report.variant_specific += 1,
            FileClass::Foreign => {
                tracing::warn!(path = %rel, interpreter = %interpreter, "file is tagged for a different interpreter");
                report.foreign += 1;
            }
        }
        copy_tracking(staging, destination, &rel, &mut overwritten)?;
        report.copied += 1;
    }

    let dest_dist_info = destination.join(&name);
    let dest_record = dest_dist_info.join(RECORD);
    let dest_wheel = dest_dist_info.join(WHEEL);
    let first_fold = !dest_record.exists();

    let dist = RelativePath::new(&name);
    for file in tree::list_files(&bundle.dist_info())? {
        if file.as_str() == RECORD || file.as_str() == WHEEL {
            continue;
        }
        copy_tracking(staging, destination, &dist.join(file.as_str()), &mut overwritten)?;
        report.copied += 1;
    }

    if first_fold {
        local.save()?;
        local.save_to(&dest_record)?;
        io::write_text(&dest_wheel, &io::read_text(&bundle.wheel_path())?)?;
        report.record_lines_added = local.entries()?.len();
        report.tags_added = tags(&dest_wheel)?.len();
    } else {
        resolve_stale_entries(&name, &mut local, &dest_record, &overwritten)?;
        local.save()?;
        report.record_lines_added = merge_record(&bundle.record_path(), &dest_record)?;
        report.tags_added = merge_wheel(&bundle.wheel_path(), &dest_wheel)?;
    }

    tracing::info!(
        dist_info = %name,
        interpreter = %interpreter,
        copied = report.copied,
        variant_specific = report.variant_specific,
        record_lines = report.record_lines_added,
        tags = report.tags_added,
        "folded bundle"
    );
    Ok(report)
}

fn copy_tracking(
    staging: &Path,
    destination: &Path,
    rel: &RelativePath,
    overwritten: &mut HashSet<RelativePath>,
) -> Result<()> {
    let dst: PathBuf = rel.to_native(destination);
    if std::fs::symlink_metadata(&dst).is_ok() {
        overwritten.insert(rel.clone());
    }
    tree::copy_file(&rel.to_native(staging), &dst)?;
    Ok(())
}

/// Settle paths listed by both manifests before merging.
///
/// Files this fold overwrote take the local entry; the combined manifest and
/// descriptor keep their combined entry, which the final fix-up recomputes.
fn resolve_stale_entries(
    dist_info: &str,
    local: &mut Record,
    combined_path: &Path,
    overwritten: &HashSet<RelativePath>,
) -> Result<()> {
    let merged: HashSet<RelativePath> = [RECORD, WHEEL]
        .iter()
        .map(|file| RelativePath::new(dist_info).join(file))
        .collect();
    local.remove_paths(&merged);

    let local_paths: HashSet<RelativePath> = local
        .entries()?
        .into_iter()
        .map(|entry| entry.relative_path())
        .filter(|path| overwritten.contains(path))
        .collect();

    let mut combined = Record::load(combined_path)?;
    let local_lines: HashSet<&str> = local.lines().iter().map(String::as_str).collect();
    let mut replaced = 0;
    combined.retain(|entry| {
        let stale = local_paths.contains(&entry.relative_path())
            && !local_lines.contains(entry.to_line().as_str());
        if stale {
            replaced += 1;
        }
        !stale
    });
    if replaced > 0 {
        tracing::debug!(replaced, "replaced manifest entries of overwritten files");
        combined.save()?;
    }
    Ok(())
}
