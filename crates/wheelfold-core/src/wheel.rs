//! Capability-tag descriptor (`WHEEL`) merging

use std::collections::HashSet;
use std::path::Path;

use wheelfold_fs::io;

use crate::Result;

/// File name of the metadata descriptor inside a metadata directory.
pub const WHEEL: &str = "WHEEL";

fn is_tag_line(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(key, _)| key.trim() == "Tag")
}

/// Append every `Tag:` line of `a` that `b` lacks, after `b`'s existing lines.
///
/// Non-tag lines of `a` are ignored and `b`'s own lines are never touched.
/// Returns the number of tags appended.
pub fn merge_wheel(a: &Path, b: &Path) -> Result<usize> {
    let mut dest = io::read_lines(b)?;
    let mut seen: HashSet<String> = dest.iter().cloned().collect();

    let new_tags: Vec<String> = io::read_lines(a)?
        .into_iter()
        .filter(|line| is_tag_line(line))
        .filter(|line| seen.insert(line.clone()))
        .collect();
    if new_tags.is_empty() {
        return Ok(0);
    }

    let appended = new_tags.len();
    dest.extend(new_tags);
    io::write_lines(b, &dest)?;
    tracing::debug!(source = %a.display(), dest = %b.display(), appended, "merged tags");
    Ok(appended)
}

/// Tag values of a descriptor, in file order.
pub fn tags(path: &Path) -> Result<Vec<String>> {
    Ok(io::read_lines(path)?
        .iter()
        .filter(|line| is_tag_line(line))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_line_detection() {
        assert!(is_tag_line("Tag: cp311-cp311-linux_x86_64\n"));
        assert!(is_tag_line("Tag:py3-none-any"));
        assert!(!is_tag_line("Wheel-Version: 1.0"));
        assert!(!is_tag_line("Tagged: no"));
        assert!(!is_tag_line("foo"));
    }
}
