//! Identification of build-backend output
//!
//! A backend that cannot read the project's metadata still produces a wheel,
//! named `UNKNOWN-0.0.0-...`. Folding such output would silently package the
//! wrong thing, so it is rejected before any folding starts.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

const PLACEHOLDER_NAME: &str = "UNKNOWN";

/// Components of a wheel file name:
/// `{distribution}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    pub distribution: String,
    pub version: String,
    pub build: Option<String>,
    pub python_tag: String,
    pub abi_tag: String,
    pub platform_tag: String,
}

impl WheelName {
    pub fn parse(file_name: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::unrecognized(file_name, reason);

        let stem = file_name
            .strip_suffix(".whl")
            .ok_or_else(|| malformed("not a .whl file"))?;
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(malformed("empty name component"));
        }

        let (build, tags) = match parts.len() {
            5 => (None, &parts[2..]),
            6 => {
                if !parts[2].starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(malformed("build tag must start with a digit"));
                }
                (Some(parts[2].to_string()), &parts[3..])
            }
            _ => return Err(malformed("expected 5 or 6 dash-separated components")),
        };

        if parts[0] == PLACEHOLDER_NAME {
            return Err(malformed(
                "placeholder distribution name; does pyproject.toml specify a build-backend?",
            ));
        }

        Ok(Self {
            distribution: parts[0].to_string(),
            version: parts[1].to_string(),
            build,
            python_tag: tags[0].to_string(),
            abi_tag: tags[1].to_string(),
            platform_tag: tags[2].to_string(),
        })
    }

    /// Expanded compatibility tags, as they appear on `Tag:` lines.
    ///
    /// Compressed tag sets (`py2.py3`) expand to their cartesian product.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for python in self.python_tag.split('.') {
            for abi in self.abi_tag.split('.') {
                for platform in self.platform_tag.split('.') {
                    tags.push(format!("{python}-{abi}-{platform}"));
                }
            }
        }
        tags
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.distribution, self.version)?;
        if let Some(build) = &self.build {
            write!(f, "-{build}")?;
        }
        write!(
            f,
            "-{}-{}-{}.whl",
            self.python_tag, self.abi_tag, self.platform_tag
        )
    }
}

/// A wheel file found in a backend's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelArtifact {
    pub path: PathBuf,
    pub name: WheelName,
}

/// List the wheels in `dir` in file-name order.
///
/// # Errors
///
/// [`Error::UnrecognizedArtifact`] for any `.whl` that does not parse or
/// carries the placeholder distribution name.
pub fn find_wheels(dir: &Path) -> Result<Vec<WheelArtifact>> {
    let entries = std::fs::read_dir(dir).map_err(|e| wheelfold_fs::Error::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| wheelfold_fs::Error::io(dir, e))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "whl") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = WheelName::parse(&file_name)?;
            tracing::debug!(wheel = %file_name, "found wheel");
            Ok(WheelArtifact { path, name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_wheel_name() {
        let name = WheelName::parse("foo-1.0-cp311-cp311-linux_x86_64.whl").unwrap();
        assert_eq!(name.distribution, "foo");
        assert_eq!(name.version, "1.0");
        assert_eq!(name.build, None);
        assert_eq!(name.tags(), vec!["cp311-cp311-linux_x86_64"]);
        assert_eq!(name.to_string(), "foo-1.0-cp311-cp311-linux_x86_64.whl");
    }

    #[test]
    fn parses_build_tag_and_compressed_tags() {
        let name = WheelName::parse("foo-1.0-1-py2.py3-none-any.whl").unwrap();
        assert_eq!(name.build.as_deref(), Some("1"));
        assert_eq!(name.tags(), vec!["py2-none-any", "py3-none-any"]);
    }

    #[test]
    fn rejects_placeholder_name() {
        let err = WheelName::parse("UNKNOWN-0.0.0-py3-none-any.whl").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedArtifact { .. }));
        assert!(err.to_string().contains("build-backend"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(WheelName::parse("foo-1.0.tar.gz").is_err());
        assert!(WheelName::parse("foo-1.0-py3-none.whl").is_err());
        assert!(WheelName::parse("foo-1.0-x-py3-none-any.whl").is_err());
        assert!(WheelName::parse("foo--py3-none-any.whl").is_err());
    }
}
