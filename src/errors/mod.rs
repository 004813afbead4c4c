// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Error types
//!
//! Every error carries a diagnostic code and, where possible, a hint on how
//! to get the experiment moving again. Errors also know which process exit
//! status they should turn into.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::experiment::Step;

/// Exit status used when no more specific code is available
pub const GENERIC_FAILURE: u8 = 1;

/// Exit status for a collaborator program that could not be found
pub const COMMAND_NOT_FOUND: u8 = 127;

/// Exit status for a collaborator program that exists but cannot be executed
pub const COMMAND_NOT_EXECUTABLE: u8 = 126;

/// Result type for cellrun operations
pub type CellrunResult<T> = Result<T, CellrunError>;

/// Main error type for cellrun
#[derive(Error, Debug, Diagnostic)]
pub enum CellrunError {
    // ─────────────────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid cell identifier '{cell}': {reason}")]
    #[diagnostic(
        code(cellrun::invalid_cell),
        help("A cell identifier must be a single, non-empty directory name")
    )]
    InvalidCell { cell: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Filesystem Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to create cell directory '{path}': {error}")]
    #[diagnostic(code(cellrun::create_dir_failed))]
    CreateDir {
        path: PathBuf,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to write report '{path}': {error}")]
    #[diagnostic(code(cellrun::report_write_failed))]
    ReportWrite { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Program '{program}' for step '{step}' not found")]
    #[diagnostic(code(cellrun::tool_not_found))]
    ToolNotFound {
        step: Step,
        program: String,
        #[help]
        help: Option<String>,
    },

    #[error("Program '{program}' for step '{step}' is not executable")]
    #[diagnostic(code(cellrun::tool_not_executable))]
    ToolNotExecutable {
        step: Step,
        program: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to start '{program}' for step '{step}': {error}")]
    #[diagnostic(code(cellrun::tool_execution_failed))]
    ToolExecutionFailed {
        step: Step,
        program: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("Step '{step}' failed{}", with_exit_code(.exit_code))]
    #[diagnostic(code(cellrun::step_failed))]
    StepFailed {
        step: Step,
        exit_code: Option<i32>,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(cellrun::config_not_found),
        help("Pass an existing file to --config, or omit it to use .cellrun.yaml")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration in '{path}': {reason}")]
    #[diagnostic(code(cellrun::invalid_config))]
    InvalidConfig { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(cellrun::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(cellrun::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(cellrun::json_error))]
    Json { message: String },
}

fn with_exit_code(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

impl From<std::io::Error> for CellrunError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for CellrunError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for CellrunError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl CellrunError {
    /// Create a directory creation error with a hint for the usual causes
    pub fn create_dir(path: PathBuf, error: std::io::Error) -> Self {
        let help = match error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Some(RecoverySuggestion::fix_permissions(&path).to_string())
            }
            _ => None,
        };

        Self::CreateDir {
            path,
            error: error.to_string(),
            help,
        }
    }

    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(step: Step, program: &str) -> Self {
        Self::ToolNotFound {
            step,
            program: program.to_string(),
            help: Some(RecoverySuggestion::install_tool(program).to_string()),
        }
    }

    /// Create a step failed error
    pub fn step_failed(step: Step, exit_code: Option<i32>) -> Self {
        Self::StepFailed {
            step,
            exit_code,
            help: Some(RecoverySuggestion::failed_step(step).to_string()),
        }
    }

    /// Process exit status this error should produce
    ///
    /// A failed step propagates its own code. Codes that cannot be
    /// represented as an exit status (or are missing, as for a child killed
    /// by a signal) collapse to [`GENERIC_FAILURE`].
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StepFailed { exit_code, .. } => exit_code
                .and_then(|code| u8::try_from(code).ok())
                .filter(|&code| code != 0)
                .unwrap_or(GENERIC_FAILURE),
            Self::ToolNotFound { .. } => COMMAND_NOT_FOUND,
            Self::ToolNotExecutable { .. } => COMMAND_NOT_EXECUTABLE,
            _ => GENERIC_FAILURE,
        }
    }
}
