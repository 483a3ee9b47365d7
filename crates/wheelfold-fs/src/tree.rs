//! Directory walking and merging tree copies

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{Error, RelativePath, Result};

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    Error::io(path, err.into())
}

/// List every non-directory entry below `root`, in file-name order.
///
/// Symlinks are listed, not followed.
pub fn list_files(root: &Path) -> Result<Vec<RelativePath>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Some(rel) = RelativePath::from_native(root, entry.path()) {
            files.push(rel);
        }
    }
    Ok(files)
}

/// Copy one file (or symlink) to `dst`, creating parents and replacing any
/// existing file.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let meta = fs::symlink_metadata(src).map_err(|e| Error::io(src, e))?;
    if meta.file_type().is_symlink() {
        let target = fs::read_link(src).map_err(|e| Error::io(src, e))?;
        if fs::symlink_metadata(dst).is_ok() {
            fs::remove_file(dst).map_err(|e| Error::io(dst, e))?;
        }
        return create_symlink(&target, dst);
    }

    fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::io(link, e))
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
    fs::copy(&resolved, link).map_err(|e| Error::io(link, e))?;
    Ok(())
}

/// Merge the tree at `src` into `dst`.
///
/// Files already present in `dst` but absent from `src` are kept; colliding
/// files are overwritten. Returns the copied files relative to `src`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<Vec<RelativePath>> {
    let files = list_files(src)?;
    for rel in &files {
        copy_file(&rel.to_native(src), &rel.to_native(dst))?;
    }
    Ok(files)
}

/// Byte-for-byte comparison of two files. Symlinks compare by target.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::symlink_metadata(a).map_err(|e| Error::io(a, e))?;
    let meta_b = match fs::symlink_metadata(b) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(b, e)),
    };

    match (meta_a.file_type().is_symlink(), meta_b.file_type().is_symlink()) {
        (true, true) => {
            let target_a = fs::read_link(a).map_err(|e| Error::io(a, e))?;
            let target_b = fs::read_link(b).map_err(|e| Error::io(b, e))?;
            return Ok(target_a == target_b);
        }
        (false, false) => {}
        _ => return Ok(false),
    }

    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    let bytes_a = fs::read(a).map_err(|e| Error::io(a, e))?;
    let bytes_b = fs::read(b).map_err(|e| Error::io(b, e))?;
    Ok(bytes_a == bytes_b)
}

/// True when both trees hold the same file names with the same contents.
pub fn trees_equal(a: &Path, b: &Path) -> Result<bool> {
    let files_a = list_files(a)?;
    let files_b = list_files(b)?;
    if files_a != files_b {
        return Ok(false);
    }
    for rel in &files_a {
        if !files_equal(&rel.to_native(a), &rel.to_native(b))? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove `rel` below `root`, then every parent directory it leaves empty,
/// stopping at `root`.
pub fn remove_file_pruning(root: &Path, rel: &RelativePath) -> Result<()> {
    let path = rel.to_native(root);
    fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;

    let mut parent = rel.parent();
    while let Some(dir) = parent {
        let native = dir.to_native(root);
        if fs::remove_dir(&native).is_err() {
            break;
        }
        parent = dir.parent();
    }
    Ok(())
}

/// True if `path` is a directory with no entries.
pub fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
    Ok(entries.next().is_none())
}
