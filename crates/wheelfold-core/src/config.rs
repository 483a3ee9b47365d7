//! Fold options
//!
//! Packaging-policy knobs passed to every fold. Loaded from TOML, JSON or
//! YAML through [`wheelfold_fs::ConfigStore`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wheelfold_fs::{ConfigStore, HashAlgorithm};

use crate::{Error, Result};

/// What to do with license files shipped in the metadata directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicensePolicy {
    /// Keep one canonical copy of each license text
    #[default]
    Deduplicate,
    /// Drop every license file; the distribution ships them elsewhere
    Strip,
    /// Leave license files alone
    Keep,
}

impl FromStr for LicensePolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deduplicate" | "dedup" => Ok(Self::Deduplicate),
            "strip" => Ok(Self::Strip),
            "keep" => Ok(Self::Keep),
            _ => Err(Error::InvalidOption {
                option: "license_policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LicensePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deduplicate => "deduplicate",
            Self::Strip => "strip",
            Self::Keep => "keep",
        })
    }
}

/// Options shared by every fold of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoldOptions {
    pub license_policy: LicensePolicy,

    /// Extra license directory conventions, consulted after the built-in
    /// `licenses/` and `license_files/`.
    pub license_dirs: Vec<String>,

    /// Algorithm for manifest entries created from scratch when the manifest
    /// has no digests to follow.
    pub default_algorithm: HashAlgorithm,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            license_policy: LicensePolicy::default(),
            license_dirs: Vec::new(),
            default_algorithm: HashAlgorithm::Sha256,
        }
    }
}

impl FoldOptions {
    /// Load options from a `.toml`, `.json` or `.yaml` file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }
}
