// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

use std::path::Path;

use crate::experiment::Step;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest installing a missing collaborator program
    pub fn install_tool(program: &str) -> Self {
        match program {
            "python" | "python3" => Self {
                action: format!("Make '{}' available", program),
                steps: vec![
                    "The collaborator scripts are run through a Python interpreter".into(),
                    "Activate the environment that provides it, or point the".into(),
                    "generator/runner/validator entries of .cellrun.yaml at it".into(),
                ],
                commands: vec![
                    "# Check which interpreter is visible:".into(),
                    format!("which {}", program),
                ],
            },
            _ => Self {
                action: format!("Install {}", program),
                steps: vec![format!("Install {} and ensure it's in your PATH", program)],
                commands: vec![],
            },
        }
    }

    /// Suggest fixing a directory that cannot be created
    pub fn fix_permissions(path: &Path) -> Self {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Self {
            action: "Fix directory permissions".into(),
            steps: vec![
                format!("No write permission below '{}'", parent.display()),
                "Run from a writable directory, or change data_root in .cellrun.yaml".into(),
            ],
            commands: vec![
                "# Inspect ownership:".into(),
                format!("ls -ld {}", parent.display()),
            ],
        }
    }

    /// Suggest what to look at after a failed step
    pub fn failed_step(step: Step) -> Self {
        let steps = match step {
            Step::Generate => vec![
                "The input generator exited with an error".into(),
                "No input file was handed to the pipeline".into(),
            ],
            Step::Run => vec![
                "The pipeline runner exited with an error".into(),
                "Its DEBUG log output above usually names the failing stage".into(),
            ],
            Step::Validate => vec![
                "The validator rejected the pipeline output".into(),
                "Compare the input and output files of this cell".into(),
            ],
        };

        Self {
            action: format!("Inspect the '{}' step output", step),
            steps,
            commands: vec![
                "# Re-run with debug logging:".into(),
                "cellrun --verbose <CELL>".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
