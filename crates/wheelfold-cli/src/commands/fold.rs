//! Fold command implementation
//!
//! Folds each `INTERP=STAGING` bundle into the destination in argument
//! order, then finalizes the combined manifest.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde_json::json;
use wheelfold_core::{Destination, FoldOptions, Interpreter, LicensePolicy, ShareReport};

use crate::cli::VariantArg;
use crate::error::Result;

/// Run the fold command
pub fn run_fold(
    dest: &Path,
    config: Option<&Path>,
    license_policy: Option<LicensePolicy>,
    variants: &[VariantArg],
    json: bool,
) -> Result<()> {
    let mut options = match config {
        Some(path) => FoldOptions::load(path)?,
        None => FoldOptions::default(),
    };
    if let Some(policy) = license_policy {
        options.license_policy = policy;
    }
    tracing::debug!(?options, "fold options");

    let existed = dest.exists();
    let mut destination = Destination::create(dest, options)?;
    let pairs: Vec<(PathBuf, Interpreter)> = variants
        .iter()
        .map(|v| (v.staging.clone(), v.interpreter))
        .collect();
    let outcome = destination
        .fold_all(&pairs)
        .and_then(|reports| Ok((reports, destination.finalize()?)));
    let (reports, fixed) = match outcome {
        Ok(done) => done,
        Err(e) => {
            discard(dest, existed)?;
            return Err(e.into());
        }
    };
    let reports: Vec<(&VariantArg, ShareReport)> = variants.iter().zip(reports).collect();
    let fix = fixed.fix_report();

    if json {
        let output = json!({
            "destination": dest.display().to_string(),
            "variants": reports.iter().map(|(variant, report)| json!({
                "interpreter": variant.interpreter.to_string(),
                "staging": variant.staging.display().to_string(),
                "copied": report.copied,
                "shared": report.shared,
                "variant_specific": report.variant_specific,
                "foreign": report.foreign,
                "dropped": report.dropped.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "promoted": report.promoted.iter()
                    .map(|(from, to)| json!({ "from": from.as_str(), "to": to.as_str() }))
                    .collect::<Vec<_>>(),
                "conflicts": report.conflicts.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                "record_lines_added": report.record_lines_added,
                "tags_added": report.tags_added,
            })).collect::<Vec<_>>(),
            "fixed": {
                "updated": fix.updated.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "added": fix.added.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "missing": fix.missing.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} variants)",
        "Folded".green().bold(),
        dest.display().to_string().yellow(),
        reports.len()
    );
    for (variant, report) in &reports {
        print_variant(variant, report);
    }
    println!(
        "  {} {} updated, {} added",
        "manifest".bold(),
        fix.updated.len(),
        fix.added.len()
    );
    for path in &fix.missing {
        println!("  {} manifest lists missing file {}", "!".yellow(), path);
    }
    Ok(())
}

/// Remove everything a failed run wrote, leaving `dest` as it was found.
fn discard(dest: &Path, existed: bool) -> Result<()> {
    tracing::warn!(dest = %dest.display(), "discarding partially folded destination");
    std::fs::remove_dir_all(dest)?;
    if existed {
        std::fs::create_dir(dest)?;
    }
    Ok(())
}

fn print_variant(variant: &VariantArg, report: &ShareReport) {
    println!(
        "  {} {}: {} files ({} shared, {} variant-specific), +{} manifest lines, +{} tags",
        "+".green(),
        variant.interpreter.to_string().cyan(),
        report.copied,
        report.shared,
        report.variant_specific,
        report.record_lines_added,
        report.tags_added
    );
    if report.foreign > 0 {
        println!(
            "    {} {} files tagged for another interpreter",
            "!".yellow(),
            report.foreign
        );
    }
    for path in &report.dropped {
        println!("    {} {}", "-".red(), path);
    }
    for (from, to) in &report.promoted {
        println!("    {} {} -> {}", "~".blue(), from, to);
    }
    for conflict in &report.conflicts {
        println!("    {} {}", "!".yellow(), conflict);
    }
}
