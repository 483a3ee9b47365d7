//! Shared test utilities for the wheelfold workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`bundle`]: [`TestBundle`] builder writing staging bundles with valid
//!   `RECORD` manifests

pub mod bundle;

pub use bundle::{TestBundle, read, record_line};
