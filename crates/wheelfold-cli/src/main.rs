//! wheelfold CLI
//!
//! Folds the staging bundles of a multi-interpreter build into a single
//! install tree and inspects the result.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Fold {
            dest,
            config,
            license_policy,
            json,
            variants,
        } => commands::run_fold(&dest, config.as_deref(), license_policy, &variants, json),
        Commands::Diff { a, b } => commands::run_diff(&a, &b),
        Commands::Fix {
            dist_info,
            algorithm,
        } => commands::run_fix(&dist_info, algorithm.unwrap_or_default()),
        Commands::Verify { dest } => commands::run_verify(&dest),
        Commands::CheckArtifacts { dir } => commands::run_check_artifacts(&dir),
    }
}
