// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Experiment definitions and the step runner
//!
//! A cell is run through three collaborators: the input generator, the
//! pipeline runner and the experiment validator. This module derives the
//! cell-scoped paths, builds each collaborator's command line and drives
//! the fail-fast sequence.

mod cell;
mod runner;
mod step;

pub use cell::{CellId, CellLayout, INPUT_FILE_NAME, OUTPUT_FILE_NAME};
pub use runner::{ExperimentRunner, RunOptions, RunReport, RunState, StepOutcome};
pub use step::{Invocation, LogLevel, Step};
