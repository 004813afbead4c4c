// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Process executor
//!
//! Runs collaborators as child processes with inherited stdio, so whatever
//! they print reaches the user unchanged.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::{ExecutionResult, Executor};
use crate::errors::CellrunError;
use crate::experiment::Invocation;

/// Child process executor
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Create a new process executor
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(
        &self,
        invocation: &Invocation,
        working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, CellrunError> {
        debug!(
            step = %invocation.step,
            step_args = ?invocation.step_args(),
            "exec: {}",
            invocation.command_line()
        );

        let start = Instant::now();

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.current_dir(working_dir);
        cmd.envs(env);

        let status = cmd.status().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CellrunError::tool_not_found(invocation.step, &invocation.program)
            }
            std::io::ErrorKind::PermissionDenied => CellrunError::ToolNotExecutable {
                step: invocation.step,
                program: invocation.program.clone(),
                help: Some(format!("Make it executable: chmod +x {}", invocation.program)),
            },
            _ => CellrunError::ToolExecutionFailed {
                step: invocation.step,
                program: invocation.program.clone(),
                error: e.to_string(),
                help: Some(format!(
                    "Check that '{}' is executable",
                    invocation.program
                )),
            },
        })?;

        let duration = start.elapsed();

        if status.success() {
            Ok(ExecutionResult::success(duration))
        } else {
            Ok(ExecutionResult::failure(status.code(), duration))
        }
    }

    fn check_available(&self, invocation: &Invocation) -> bool {
        which::which(&invocation.program).is_ok()
    }
}
