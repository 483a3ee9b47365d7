//! Verify command implementation

use std::path::Path;

use colored::Colorize;
use wheelfold_core::Bundle;
use wheelfold_core::integrity::verify_metadata_entries;

use crate::error::{CliError, Result};

/// Check every metadata entry of the folded tree at `dest`
pub fn run_verify(dest: &Path) -> Result<()> {
    let tree = Bundle::open(dest)?;
    let mismatched = verify_metadata_entries(&tree.dist_info())?;

    if mismatched.is_empty() {
        println!(
            "{} {} metadata entries match.",
            "OK".green().bold(),
            tree.dist_info_name()
        );
        return Ok(());
    }

    for path in &mismatched {
        println!("  {} {}", "mismatch".red(), path);
    }
    Err(CliError::user(format!(
        "{} metadata entries do not match their files",
        mismatched.len()
    )))
}
