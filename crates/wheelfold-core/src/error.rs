//! Error types for wheelfold-core

use std::path::PathBuf;

/// Result type for wheelfold-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling bundles
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required manifest, descriptor or staging file is absent
    #[error("Required file not found: {path}")]
    NotFound { path: PathBuf },

    /// A `scripts/` or `data/` subtree was already populated by an earlier
    /// variant. Reported, never returned from a fold.
    #[error("{subtree}/ already exists at {path}; skipping copy. Is the package being built twice?")]
    PolicyConflict { subtree: String, path: PathBuf },

    /// Build output that cannot be attributed to the package under build
    #[error("Unrecognized artifact {name}: {reason}")]
    UnrecognizedArtifact { name: String, reason: String },

    /// Hashing a metadata file during the record fix-up failed
    #[error("Failed to recompute digest of {path}: {source}")]
    IntegrityRecompute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line that does not split into path, hash and size
    #[error("Malformed manifest line {line} in {path}: {content:?}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Operation not permitted in the destination's current state
    #[error("Cannot {operation} a destination in state {state}")]
    InvalidState { state: String, operation: String },

    /// Option value outside its accepted set
    #[error("Invalid value {value:?} for {option}")]
    InvalidOption { option: String, value: String },

    /// Interpreter identifier that could not be parsed
    #[error("Unknown interpreter: {name}")]
    UnknownInterpreter { name: String },

    /// Filesystem error from wheelfold-fs
    #[error(transparent)]
    Fs(wheelfold_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must abort the reconciliation run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PolicyConflict { .. })
    }

    pub fn unrecognized(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedArtifact {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<wheelfold_fs::Error> for Error {
    fn from(err: wheelfold_fs::Error) -> Self {
        match err {
            wheelfold_fs::Error::Io { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::NotFound { path }
            }
            other => Self::Fs(other),
        }
    }
}
