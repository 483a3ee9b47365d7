//! Filesystem primitives for wheelfold
//!
//! Provides the low-level pieces the reconciliation engine is built on:
//! manifest-style content digests, atomic text rewrites, forward-slash
//! relative paths and directory-merging tree copies.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod tree;

pub use checksum::{FileDigest, HashAlgorithm, compute_file_digest};
pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::RelativePath;
