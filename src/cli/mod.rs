// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! CLI definition and handler
//!
//! Defines the command-line interface for cellrun.

pub mod run;

use clap::Parser;
use std::path::PathBuf;

/// Cell experiment orchestrator
///
/// Generates the pipeline input for a cell, runs the pipeline on it and
/// validates the result, stopping at the first failing step.
#[derive(Parser, Debug)]
#[clap(
    name = "cellrun",
    version,
    about = "Run one cell through input generation, the pipeline and validation",
    long_about = None,
    after_help = "Examples:\n\
        cellrun 595570553                  Run cell 595570553\n\
        cellrun --dry-run 595570553        Show the commands without running them\n\
        cellrun --report run.json 42       Also write a JSON run report\n\n\
        Collaborator commands are read from .cellrun.yaml when present."
)]
pub struct Cli {
    /// Cell identifier
    #[clap(value_name = "CELL")]
    pub cell: String,

    /// Configuration file (default: .cellrun.yaml)
    #[clap(short, long, value_name = "FILE", env = "CELLRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Dry run (show what would be done)
    #[clap(long)]
    pub dry_run: bool,

    /// Write a JSON run report to FILE
    #[clap(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_positional() {
        let cli = Cli::try_parse_from(["cellrun", "595570553"]).unwrap();
        assert_eq!(cli.cell, "595570553");
        assert!(!cli.dry_run);
        assert!(cli.report.is_none());
    }

    #[test]
    fn test_cell_is_required() {
        assert!(Cli::try_parse_from(["cellrun"]).is_err());
    }

    #[test]
    fn test_extra_positional_rejected() {
        assert!(Cli::try_parse_from(["cellrun", "1", "2"]).is_err());
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "cellrun", "-v", "-C", "/tmp", "--dry-run", "--report", "r.json", "7",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(cli.dry_run);
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.report, Some(PathBuf::from("r.json")));
        assert_eq!(cli.cell, "7");
    }
}
