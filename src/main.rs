// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! cellrun - Cell Experiment Orchestrator
//!
//! Generate, run and validate one experiment cell, failing fast.

use clap::Parser;
use miette::Result;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cellrun::cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    cellrun::utils::configure_colors();

    // Initialize tracing
    let default_filter = if cli.verbose { "cellrun=debug" } else { "cellrun=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(cellrun::utils::should_use_colors())
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    match cellrun::cli::run::run(cli.cell, cli.config, cli.dry_run, cli.report).await {
        Ok(code) => Ok(code),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            Ok(ExitCode::from(code))
        }
    }
}
