//! Artifact reconciliation for multi-interpreter Python builds
//!
//! A package built once per interpreter variant produces one staging bundle
//! per variant. This crate folds those bundles into a single installable
//! tree:
//!
//! * [`record`] diffs and merges `RECORD` manifests line by line;
//! * [`wheel`] merges the `Tag:` lines of `WHEEL` descriptors;
//! * [`share`] copies a bundle into the destination, deduplicating license
//!   files and taking `scripts/` and `data/` from the first variant only;
//! * [`integrity`] recomputes metadata digests once every variant is in;
//! * [`destination`] sequences the above as `EMPTY -> PARTIAL -> FIXED`.
//!
//! ```no_run
//! use std::path::Path;
//! use wheelfold_core::{Destination, FoldOptions};
//!
//! # fn main() -> wheelfold_core::Result<()> {
//! let mut dest = Destination::create(Path::new("build/combined"), FoldOptions::default())?;
//! dest.fold(Path::new("build/py311"), &"python3.11".parse()?)?;
//! dest.fold(Path::new("build/py312"), &"python3.12".parse()?)?;
//! let fixed = dest.finalize()?;
//! assert!(fixed.verify()?.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod bundle;
pub mod config;
pub mod destination;
pub mod error;
pub mod integrity;
pub mod interpreter;
pub mod license;
pub mod record;
pub mod share;
pub mod wheel;

pub use artifact::{WheelArtifact, WheelName, find_wheels};
pub use bundle::{Bundle, Subtree};
pub use config::{FoldOptions, LicensePolicy};
pub use destination::{Destination, FixedDestination, FoldState};
pub use error::{Error, Result};
pub use integrity::{FixReport, fix_merged_record, fix_merged_record_with};
pub use interpreter::{FileClass, Implementation, Interpreter};
pub use license::{LicenseConventions, LicensePlan, plan_licenses};
pub use record::{Record, RecordEntry, merge_record, missing_lines};
pub use share::{ShareReport, share_files};
pub use wheel::merge_wheel;
