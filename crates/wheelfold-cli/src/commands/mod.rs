//! Command implementations for wheelfold-cli

pub mod check_artifacts;
pub mod diff;
pub mod fix;
pub mod fold;
pub mod verify;

pub use check_artifacts::run_check_artifacts;
pub use diff::run_diff;
pub use fix::run_fix;
pub use fold::run_fold;
pub use verify::run_verify;
