//! Check-artifacts command implementation

use std::path::Path;

use colored::Colorize;
use wheelfold_core::find_wheels;

use crate::error::{CliError, Result};

/// List the wheels in `dir`, failing on any the build could not name
pub fn run_check_artifacts(dir: &Path) -> Result<()> {
    let wheels = find_wheels(dir)?;
    if wheels.is_empty() {
        return Err(CliError::user(format!("no wheels found in {}", dir.display())));
    }

    for wheel in &wheels {
        println!(
            "{} {} ({})",
            "OK".green().bold(),
            wheel.name,
            wheel.name.tags().join(", ").cyan()
        );
    }
    Ok(())
}
