// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Steps of a cell run and the command line each one invokes

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;

use super::{CellId, CellLayout};
use crate::config::{ExperimentConfig, ToolCommand};

/// One step of a cell run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Produce the pipeline input file
    Generate,
    /// Turn the input file into the output file
    Run,
    /// Compare input and output
    Validate,
}

impl Step {
    /// All steps, in the order they run
    pub const ALL: [Step; 3] = [Step::Generate, Step::Run, Step::Validate];

    /// Human readable description used in progress output
    pub fn description(&self) -> &'static str {
        match self {
            Step::Generate => "Generating pipeline input",
            Step::Run => "Running pipeline",
            Step::Validate => "Validating experiment",
        }
    }

    /// The configured command prefix for this step
    pub fn tool<'a>(&self, config: &'a ExperimentConfig) -> &'a ToolCommand {
        match self {
            Step::Generate => &config.generator,
            Step::Run => &config.runner,
            Step::Validate => &config.validator,
        }
    }

    /// Arguments appended after the configured command prefix
    pub fn step_args(&self, cell: &CellId, layout: &CellLayout) -> Vec<OsString> {
        match self {
            Step::Generate => vec![cell.as_str().into()],
            Step::Run => vec![
                "--input_json".into(),
                layout.input_json.clone().into_os_string(),
                "--output_json".into(),
                layout.output_json.clone().into_os_string(),
                "--log_level".into(),
                LogLevel::Debug.to_string().into(),
            ],
            Step::Validate => vec![
                layout.input_json.clone().into_os_string(),
                layout.output_json.clone().into_os_string(),
            ],
        }
    }

    /// Build the full invocation of this step for a cell
    pub fn invocation(
        &self,
        config: &ExperimentConfig,
        cell: &CellId,
        layout: &CellLayout,
    ) -> Invocation {
        let tool = self.tool(config);

        Invocation::new(
            *self,
            tool.program.clone(),
            tool.args.iter().map(OsString::from).collect(),
            self.step_args(cell, layout),
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Generate => "generate",
            Step::Run => "run",
            Step::Validate => "validate",
        };
        f.write_str(name)
    }
}

/// Log levels understood by the pipeline runner
///
/// The runner is always driven at [`LogLevel::Debug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// A fully resolved collaborator command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Step this invocation belongs to
    pub step: Step,
    /// Program to execute
    pub program: String,
    /// Arguments, command prefix first
    pub args: Vec<OsString>,
    /// Number of leading `args` that came from the configured prefix
    prefix_len: usize,
}

impl Invocation {
    /// Join a command prefix and the step's own arguments
    pub fn new(
        step: Step,
        program: impl Into<String>,
        prefix: Vec<OsString>,
        step_args: Vec<OsString>,
    ) -> Self {
        let prefix_len = prefix.len();
        let mut args = prefix;
        args.extend(step_args);

        Self {
            step,
            program: program.into(),
            args,
            prefix_len,
        }
    }

    /// Arguments contributed by the step itself, without the configured prefix
    pub fn step_args(&self) -> &[OsString] {
        &self.args[self.prefix_len..]
    }

    /// Shell-like rendering for progress output and reports
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture() -> (ExperimentConfig, CellId, CellLayout) {
        let config = ExperimentConfig::default();
        let cell = CellId::new("595570553").unwrap();
        let layout = CellLayout::new(Path::new("./test_data"), "specimen_", &cell);
        (config, cell, layout)
    }

    #[test]
    fn test_generate_passes_cell_only() {
        let (config, cell, layout) = fixture();
        let inv = Step::Generate.invocation(&config, &cell, &layout);

        assert_eq!(inv.program, "python");
        assert_eq!(inv.step_args(), &[OsString::from("595570553")]);
        assert_eq!(
            inv.command_line(),
            "python generate_pipeline_input.py 595570553"
        );
    }

    #[test]
    fn test_run_uses_named_parameters_at_debug() {
        let (config, cell, layout) = fixture();
        let inv = Step::Run.invocation(&config, &cell, &layout);

        assert_eq!(
            inv.command_line(),
            "python run_pipeline.py \
             --input_json ./test_data/specimen_595570553/pipeline_input.json \
             --output_json ./test_data/specimen_595570553/pipeline_output.json \
             --log_level DEBUG"
        );
    }

    #[test]
    fn test_validate_passes_input_then_output() {
        let (config, cell, layout) = fixture();
        let inv = Step::Validate.invocation(&config, &cell, &layout);

        assert_eq!(
            inv.step_args(),
            &[
                layout.input_json.clone().into_os_string(),
                layout.output_json.clone().into_os_string(),
            ]
        );
    }

    #[test]
    fn test_custom_prefix_is_kept_in_front() {
        let (mut config, cell, layout) = fixture();
        config.validator = ToolCommand {
            program: "sh".into(),
            args: vec!["stub.sh".into(), "--strict".into()],
        };
        let inv = Step::Validate.invocation(&config, &cell, &layout);

        assert_eq!(inv.program, "sh");
        assert_eq!(inv.args[0], OsString::from("stub.sh"));
        assert_eq!(inv.args[1], OsString::from("--strict"));
        assert_eq!(inv.step_args().len(), 2);
    }

    #[test]
    fn test_step_args_independent_of_other_configs() {
        let (mut config, cell, layout) = fixture();
        config.generator.args = vec!["a.py".into(), "--x".into(), "--y".into()];
        let inv = Step::Generate.invocation(&config, &cell, &layout);

        // The invocation remembers its own prefix length
        assert_eq!(inv.step_args(), &[OsString::from("595570553")]);
        assert_eq!(inv.args.len(), 4);

        let bare = Invocation::new(Step::Run, "sh", vec![], vec!["x".into()]);
        assert_eq!(bare.step_args(), &[OsString::from("x")]);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert!(LogLevel::Debug < LogLevel::Info);
        assert_eq!(serde_json::to_string(&LogLevel::Warning).unwrap(), "\"WARNING\"");
    }

    #[test]
    fn test_step_order() {
        assert_eq!(Step::ALL, [Step::Generate, Step::Run, Step::Validate]);
        assert_eq!(Step::Run.to_string(), "run");
    }
}
