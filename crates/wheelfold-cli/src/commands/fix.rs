//! Fix command implementation

use std::path::Path;

use colored::Colorize;
use wheelfold_core::fix_merged_record_with;
use wheelfold_fs::HashAlgorithm;

use crate::error::Result;

/// Recompute the metadata entries of the manifest in `dist_info`
pub fn run_fix(dist_info: &Path, algorithm: HashAlgorithm) -> Result<()> {
    let report = fix_merged_record_with(dist_info, algorithm)?;

    if report.is_clean() {
        println!("{} Manifest is up to date.", "OK".green().bold());
    }
    for path in &report.updated {
        println!("  {} {}", "updated".blue(), path);
    }
    for path in &report.added {
        println!("  {} {}", "added".green(), path);
    }
    for path in &report.missing {
        println!("  {} {}", "missing".yellow(), path);
    }
    Ok(())
}
