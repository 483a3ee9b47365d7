//! Content digests in the manifest convention
//!
//! Manifest entries record a digest as `<algorithm>=<hex>` followed by the
//! decimal byte size. This module computes both halves for in-memory content
//! and for files on disk.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::Error;

/// Digest algorithms accepted in manifest entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Name as written before the `=` of a manifest hash field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Hex-encoded digest of `bytes`.
    pub fn hex_digest(&self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => format!("{:x}", Sha256::digest(bytes)),
            Self::Sha384 => format!("{:x}", Sha384::digest(bytes)),
            Self::Sha512 => format!("{:x}", Sha512::digest(bytes)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest and size of one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub algorithm: HashAlgorithm,
    pub hex: String,
    pub size: u64,
}

impl FileDigest {
    /// Digest in-memory content.
    pub fn of_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            hex: algorithm.hex_digest(bytes),
            size: bytes.len() as u64,
        }
    }

    /// The `<algorithm>=<hex>` field of a manifest line.
    pub fn hash_field(&self) -> String {
        format!("{}={}", self.algorithm, self.hex)
    }
}

/// Compute the digest and size of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_digest(path: &Path, algorithm: HashAlgorithm) -> std::io::Result<FileDigest> {
    let content = std::fs::read(path)?;
    Ok(FileDigest::of_bytes(algorithm, &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_value() {
        let digest = FileDigest::of_bytes(HashAlgorithm::Sha256, b"hello world");
        assert_eq!(
            digest.hex,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(digest.size, 11);
    }

    #[test]
    fn hash_field_carries_algorithm_name() {
        let digest = FileDigest::of_bytes(HashAlgorithm::Sha256, b"foo\n");
        assert_eq!(
            digest.hash_field(),
            "sha256=b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c"
        );
    }

    #[test]
    fn longer_algorithms_produce_longer_digests() {
        assert_eq!(HashAlgorithm::Sha384.hex_digest(b"x").len(), 96);
        assert_eq!(HashAlgorithm::Sha512.hex_digest(b"x").len(), 128);
    }

    #[test]
    fn parse_algorithm_names() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn file_digest_matches_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("WHEEL");
        std::fs::write(&path, "f\no\no\n").unwrap();

        let from_file = compute_file_digest(&path, HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            from_file,
            FileDigest::of_bytes(HashAlgorithm::Sha256, b"f\no\no\n")
        );
        assert_eq!(
            from_file.hex,
            "447fb61fa39a067229e1cce8fc0953bfced53eac85d1844f5940f51c1fcba725"
        );
    }
}
