//! Interpreter identifiers and per-file variant classification

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use wheelfold_fs::RelativePath;

use crate::Error;

static INTERPRETER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<impl>cpython|python|pypy)(?P<major>\d)?(?:\.(?P<minor>\d{1,2}))?$").unwrap()
});

/// Interpreter tag embedded in compiled module and bytecode file names,
/// e.g. `mod.cpython-311-x86_64-linux-gnu.so` or `mod.pypy310.pyc`.
static TAGGED_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?P<tag>cpython-\d{2,3}|pypy\d{2,3})(?:[-.][^/]*)?\.(?:so|pyd|pyc|pyo)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Implementation {
    CPython,
    PyPy,
}

impl Implementation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CPython => "cpython",
            Self::PyPy => "pypy",
        }
    }
}

/// The interpreter a bundle was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interpreter {
    pub implementation: Implementation,
    pub major: u8,
    pub minor: Option<u8>,
}

/// Whether a file can be shared between variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Interpreter-independent content
    Shared,
    /// Compiled for the interpreter being folded
    VariantSpecific,
    /// Compiled for some other interpreter
    Foreign,
}

impl Interpreter {
    /// Tag used in extension module and bytecode names, when the minor
    /// version is known (`cpython-311`, `pypy310`).
    pub fn cache_tag(&self) -> Option<String> {
        let minor = self.minor?;
        Some(match self.implementation {
            Implementation::CPython => format!("cpython-{}{}", self.major, minor),
            Implementation::PyPy => format!("pypy{}{}", self.major, minor),
        })
    }

    fn owns_tag(&self, tag: &str) -> bool {
        match self.cache_tag() {
            Some(own) => own == tag,
            None => {
                let prefix = match self.implementation {
                    Implementation::CPython => format!("cpython-{}", self.major),
                    Implementation::PyPy => format!("pypy{}", self.major),
                };
                tag.starts_with(&prefix)
            }
        }
    }

    /// Classify a bundle file by the interpreter tag in its name.
    ///
    /// Stable-ABI modules (`.abi3.so`) carry no interpreter tag and are
    /// shared.
    pub fn classify(&self, path: &RelativePath) -> FileClass {
        match TAGGED_FILE_PATTERN.captures(path.file_name()) {
            None => FileClass::Shared,
            Some(caps) if self.owns_tag(&caps["tag"]) => FileClass::VariantSpecific,
            Some(_) => FileClass::Foreign,
        }
    }
}

impl FromStr for Interpreter {
    type Err = Error;

    /// Accepts `python3`, `python3.11`, `cpython3.12`, `pypy3.10` and paths
    /// such as `/usr/bin/python3.11`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.rsplit('/').next().unwrap_or(s);
        let unknown = || Error::UnknownInterpreter {
            name: s.to_string(),
        };
        let caps = INTERPRETER_PATTERN.captures(name).ok_or_else(unknown)?;

        let implementation = match &caps["impl"] {
            "pypy" => Implementation::PyPy,
            _ => Implementation::CPython,
        };
        let major = caps
            .name("major")
            .map_or(Ok(3), |m| m.as_str().parse())
            .map_err(|_| unknown())?;
        let minor = caps
            .name("minor")
            .map(|m| m.as_str().parse())
            .transpose()
            .map_err(|_| unknown())?;

        Ok(Self {
            implementation,
            major,
            minor,
        })
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.implementation.as_str(), self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp(s: &str) -> Interpreter {
        s.parse().unwrap()
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!(interp("python3.11").to_string(), "cpython3.11");
        assert_eq!(interp("cpython3.12").cache_tag().as_deref(), Some("cpython-312"));
        assert_eq!(interp("/usr/bin/python3.11").minor, Some(11));
        assert_eq!(interp("pypy3.10").cache_tag().as_deref(), Some("pypy310"));
        assert_eq!(interp("python3").cache_tag(), None);
    }

    #[test]
    fn rejects_unknown_interpreters() {
        assert!("ruby3.2".parse::<Interpreter>().is_err());
        assert!("python3.11.4".parse::<Interpreter>().is_err());
    }

    #[test]
    fn classifies_extension_modules() {
        let py311 = interp("cpython3.11");
        let own = RelativePath::new("pkg/_ext.cpython-311-x86_64-linux-gnu.so");
        let other = RelativePath::new("pkg/_ext.cpython-312-x86_64-linux-gnu.so");
        let cache = RelativePath::new("pkg/__pycache__/mod.cpython-311.pyc");
        let abi3 = RelativePath::new("pkg/_ext.abi3.so");
        let pure = RelativePath::new("pkg/mod.py");

        assert_eq!(py311.classify(&own), FileClass::VariantSpecific);
        assert_eq!(py311.classify(&other), FileClass::Foreign);
        assert_eq!(py311.classify(&cache), FileClass::VariantSpecific);
        assert_eq!(py311.classify(&abi3), FileClass::Shared);
        assert_eq!(py311.classify(&pure), FileClass::Shared);
    }

    #[test]
    fn unversioned_interpreter_owns_any_minor() {
        let py3 = interp("python3");
        let own = RelativePath::new("_ext.cpython-39-x86_64-linux-gnu.so");
        let pypy = RelativePath::new("_ext.pypy39-pp73-x86_64-linux-gnu.so");
        assert_eq!(py3.classify(&own), FileClass::VariantSpecific);
        assert_eq!(py3.classify(&pypy), FileClass::Foreign);
    }
}
