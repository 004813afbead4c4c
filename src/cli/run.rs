// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Run command - take one cell through the experiment

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::ExperimentConfig;
use crate::errors::CellrunResult;
use crate::experiment::{CellId, ExperimentRunner, RunOptions};

/// Run a cell
///
/// Returns the exit status of the first failing step, or success. A program
/// that cannot be started fails its step like any other. Errors that stop the
/// run before any step (bad identifier, config, directory creation) come back
/// as `Err`; their exit status is
/// [`CellrunError::exit_code`](crate::CellrunError::exit_code).
pub async fn run(
    cell: String,
    config_path: Option<PathBuf>,
    dry_run: bool,
    report_path: Option<PathBuf>,
) -> CellrunResult<ExitCode> {
    let cell = CellId::new(cell)?;

    let working_dir = std::env::current_dir()?;
    let config = ExperimentConfig::resolve(config_path.as_deref(), &working_dir)?;
    let runner = ExperimentRunner::new(config, working_dir);

    let report = runner.run(&cell, &RunOptions { dry_run }).await?;

    if dry_run {
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = report_path {
        report.write_json(&path)?;
        tracing::debug!("report written to {}", path.display());
    }

    match report.error() {
        None => Ok(ExitCode::SUCCESS),
        Some(err) => Err(err),
    }
}
