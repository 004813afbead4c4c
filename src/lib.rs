// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! # cellrun - Cell Experiment Orchestrator
//!
//! `cellrun` takes one experiment cell through three external
//! collaborators, strictly in order:
//!
//! 1. the **input generator** writes `pipeline_input.json`,
//! 2. the **pipeline runner** turns it into `pipeline_output.json`
//!    (always at `DEBUG` log level),
//! 3. the **experiment validator** compares the two and decides the verdict.
//!
//! Both files live in `./test_data/specimen_<cell>`, which is created first.
//! The first step that exits non-zero ends the run and its exit code
//! becomes the exit code of `cellrun`.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run a cell
//! cellrun 595570553
//!
//! # Show the commands that would run
//! cellrun --dry-run 595570553
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod executors;
pub mod experiment;
pub mod utils;

// Re-export commonly used types
pub use config::ExperimentConfig;
pub use errors::{CellrunError, CellrunResult};
pub use experiment::{CellId, CellLayout, ExperimentRunner, RunReport, RunState, Step};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
