//! License file conventions in the metadata directory
//!
//! Build backends disagree on where license texts go: some write them flat
//! next to `METADATA`, others under `licenses/` or `license_files/`, some do
//! both. Directory-style files are mapped to a canonical flat name (their
//! file name directly under the metadata directory) through a small table of
//! known conventions, and exact-duplicate copies are reduced to one.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use wheelfold_fs::{HashAlgorithm, RelativePath, compute_file_digest, tree};

use crate::config::LicensePolicy;
use crate::record::Record;
use crate::Result;

/// Directory conventions every backend-agnostic fold knows about, in
/// preference order.
pub const BUILTIN_LICENSE_DIRS: [&str; 2] = ["licenses", "license_files"];

static FLAT_LICENSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(licen[cs]e|copying|notice|authors)([._-].*)?$").unwrap());

/// Where a license file sits inside the metadata directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseLocation {
    /// Directly under the metadata directory
    Flat,
    /// Under a convention directory; `rank` is its position in the table
    Directory { rank: usize, canonical: String },
}

/// Lookup table of license directory conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseConventions {
    dirs: Vec<String>,
}

impl Default for LicenseConventions {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl LicenseConventions {
    /// Built-in conventions followed by `extra`, without duplicates.
    pub fn new(extra: &[String]) -> Self {
        let mut dirs: Vec<String> = BUILTIN_LICENSE_DIRS.iter().map(|d| d.to_string()).collect();
        for dir in extra {
            let dir = dir.trim_matches('/').to_string();
            if !dir.is_empty() && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        Self { dirs }
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Locate a file given its path below the metadata directory.
    pub fn locate(&self, path: &RelativePath) -> Option<LicenseLocation> {
        if path.parent().is_none() {
            return FLAT_LICENSE_PATTERN
                .is_match(path.as_str())
                .then_some(LicenseLocation::Flat);
        }
        self.dirs
            .iter()
            .position(|dir| path.is_under(dir))
            .map(|rank| LicenseLocation::Directory {
                rank,
                canonical: path.file_name().to_string(),
            })
    }
}

/// License files to drop or move before a bundle is folded.
///
/// All paths are relative to the bundle root, as written in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicensePlan {
    pub drop: Vec<RelativePath>,
    pub promote: Vec<(RelativePath, RelativePath)>,
}

impl LicensePlan {
    pub fn is_empty(&self) -> bool {
        self.drop.is_empty() && self.promote.is_empty()
    }

    /// Carry out the plan on the bundle at `root` and prune `record` to
    /// match. Returns the number of manifest lines removed.
    pub fn apply(&self, root: &Path, record: &mut Record) -> Result<usize> {
        for (from, to) in &self.promote {
            let target = to.to_native(root);
            std::fs::rename(from.to_native(root), &target)
                .map_err(|e| wheelfold_fs::Error::io(&target, e))?;
            if let Some(parent) = from.parent()
                && let Err(e) = std::fs::remove_dir(parent.to_native(root))
            {
                tracing::debug!(dir = %parent, error = %e, "license directory not removed");
            }
            record.rename_path(from, to);
            tracing::info!(from = %from, to = %to, "promoted license file to canonical location");
        }

        for path in &self.drop {
            tree::remove_file_pruning(root, path)?;
            tracing::info!(path = %path, "dropped redundant license file");
        }
        let dropped: HashSet<RelativePath> = self.drop.iter().cloned().collect();
        Ok(record.remove_paths(&dropped))
    }
}

struct Candidate {
    path: RelativePath,
    location: LicenseLocation,
}

impl Candidate {
    fn sort_key(&self) -> (usize, &str) {
        match &self.location {
            LicenseLocation::Flat => (0, self.path.as_str()),
            LicenseLocation::Directory { rank, .. } => (rank + 1, self.path.as_str()),
        }
    }
}

/// Decide which license files of the metadata directory `dist_info` to keep.
pub fn plan_licenses(
    dist_info: &Path,
    conventions: &LicenseConventions,
    policy: LicensePolicy,
) -> Result<LicensePlan> {
    if policy == LicensePolicy::Keep {
        return Ok(LicensePlan::default());
    }
    let name = dist_info
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dist = RelativePath::new(&name);

    let files = tree::list_files(dist_info)?;
    let mut candidates: Vec<Candidate> = files
        .iter()
        .filter_map(|rel| {
            conventions.locate(rel).map(|location| Candidate {
                path: rel.clone(),
                location,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut plan = LicensePlan::default();
    if policy == LicensePolicy::Strip {
        plan.drop = candidates.iter().map(|c| dist.join(c.path.as_str())).collect();
        return Ok(plan);
    }

    // Group identical texts, in candidate order
    let mut groups: Vec<Vec<&Candidate>> = Vec::new();
    let mut by_content: HashMap<(String, u64), usize> = HashMap::new();
    for candidate in &candidates {
        let native = candidate.path.to_native(dist_info);
        let digest = compute_file_digest(&native, HashAlgorithm::Sha256)
            .map_err(|e| wheelfold_fs::Error::io(&native, e))?;
        let key = (digest.hex, digest.size);
        match by_content.get(&key) {
            Some(&idx) => groups[idx].push(candidate),
            None => {
                by_content.insert(key, groups.len());
                groups.push(vec![candidate]);
            }
        }
    }

    let existing: HashSet<&str> = files.iter().map(RelativePath::as_str).collect();
    let mut claimed: HashSet<String> = HashSet::new();

    for group in groups {
        let (flats, dirs): (Vec<&Candidate>, Vec<&Candidate>) = group
            .into_iter()
            .partition(|c| c.location == LicenseLocation::Flat);

        if dirs.is_empty() || (flats.is_empty() && dirs.len() == 1) {
            continue;
        }

        let mut redundant = dirs.as_slice();
        if flats.is_empty() {
            let keeper = dirs[0];
            redundant = &dirs[1..];
            if let LicenseLocation::Directory { canonical, .. } = &keeper.location
                && !existing.contains(canonical.as_str())
                && claimed.insert(canonical.clone())
            {
                plan.promote
                    .push((dist.join(keeper.path.as_str()), dist.join(canonical)));
            }
        }
        plan.drop
            .extend(redundant.iter().map(|c| dist.join(c.path.as_str())));
    }

    Ok(plan)
}
