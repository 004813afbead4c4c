// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Collaborator executors
//!
//! The runner hands each [`Invocation`] to an [`Executor`]. The production
//! implementation spawns a child process; tests substitute a recorder.

mod process;

pub use process::ProcessExecutor;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::CellrunError;
use crate::experiment::Invocation;

/// Result of one collaborator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether the collaborator exited successfully
    pub success: bool,

    /// Exit code, absent when the child was terminated by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(duration: Duration) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            duration,
        }
    }

    /// Create a failed result
    pub fn failure(exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            success: false,
            exit_code,
            duration,
        }
    }
}

/// Trait for collaborator executors
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run an invocation to completion
    ///
    /// # Arguments
    /// * `invocation` - The resolved command line
    /// * `working_dir` - The working directory for execution
    /// * `env` - Extra environment variables
    ///
    /// A collaborator that runs and exits non-zero is an `Ok` failure
    /// result; `Err` is reserved for not being able to start it at all.
    async fn execute(
        &self,
        invocation: &Invocation,
        working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, CellrunError>;

    /// Check if the invocation's program can be found
    fn check_available(&self, invocation: &Invocation) -> bool;
}
