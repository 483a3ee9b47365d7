//! Diff command implementation

use std::path::Path;

use wheelfold_core::missing_lines;

use crate::error::Result;

/// Print every manifest line of `a` that `b` does not contain
pub fn run_diff(a: &Path, b: &Path) -> Result<()> {
    for line in missing_lines(a, b)? {
        print!("{line}");
    }
    Ok(())
}
