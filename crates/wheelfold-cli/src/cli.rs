//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wheelfold_core::{Interpreter, LicensePolicy};
use wheelfold_fs::HashAlgorithm;

/// wheelfold - Fold per-interpreter wheel bundles into one install tree
#[derive(Parser, Debug)]
#[command(name = "wheelfold")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// One `INTERP=STAGING` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArg {
    pub interpreter: Interpreter,
    pub staging: PathBuf,
}

fn parse_variant(s: &str) -> Result<VariantArg, String> {
    let (interp, staging) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INTERP=STAGING, got {s:?}"))?;
    if staging.is_empty() {
        return Err(format!("missing staging directory in {s:?}"));
    }
    let interpreter = interp.parse::<Interpreter>().map_err(|e| e.to_string())?;
    Ok(VariantArg {
        interpreter,
        staging: PathBuf::from(staging),
    })
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fold staging bundles into a destination, in the order given
    ///
    /// Examples:
    ///   wheelfold fold --dest build/combined python3.11=build/py311 python3.12=build/py312
    ///   wheelfold fold --dest out --config wheelfold.toml pypy3.10=build/pypy310
    Fold {
        /// Destination directory; must be empty or absent
        #[arg(short, long)]
        dest: PathBuf,

        /// Fold options file (.toml, .json or .yaml)
        #[arg(short, long, env = "WHEELFOLD_CONFIG")]
        config: Option<PathBuf>,

        /// Override the configured license policy
        #[arg(long)]
        license_policy: Option<LicensePolicy>,

        /// Output the fold summary as JSON
        #[arg(long)]
        json: bool,

        /// Bundles to fold
        #[arg(required = true, value_name = "INTERP=STAGING", value_parser = parse_variant)]
        variants: Vec<VariantArg>,
    },

    /// Print the manifest lines of A that B lacks
    Diff {
        a: PathBuf,
        b: PathBuf,
    },

    /// Recompute the metadata entries of a combined manifest
    Fix {
        /// The `*.dist-info` directory holding RECORD
        dist_info: PathBuf,

        /// Algorithm for new entries when the manifest has no digests
        #[arg(long)]
        algorithm: Option<HashAlgorithm>,
    },

    /// Check that every metadata entry of a folded tree matches its file
    Verify {
        dest: PathBuf,
    },

    /// List the wheels a build produced, rejecting unrecognized ones
    CheckArtifacts {
        dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fold_arguments() {
        let cli = Cli::try_parse_from([
            "wheelfold",
            "fold",
            "--dest",
            "out",
            "--license-policy",
            "strip",
            "python3.11=build/py311",
            "pypy3.10=build/pypy",
        ])
        .unwrap();

        match cli.command {
            Commands::Fold {
                dest,
                license_policy,
                variants,
                ..
            } => {
                assert_eq!(dest, PathBuf::from("out"));
                assert_eq!(license_policy, Some(LicensePolicy::Strip));
                assert_eq!(variants.len(), 2);
                assert_eq!(variants[1].interpreter.to_string(), "pypy3.10");
                assert_eq!(variants[1].staging, PathBuf::from("build/pypy"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_variant() {
        assert!(parse_variant("python3.11").is_err());
        assert!(parse_variant("python3.11=").is_err());
        assert!(parse_variant("ruby=build").is_err());
    }

    #[test]
    fn fold_requires_a_variant() {
        assert!(Cli::try_parse_from(["wheelfold", "fold", "--dest", "out"]).is_err());
    }
}
